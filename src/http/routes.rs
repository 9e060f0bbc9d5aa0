//! Route handlers for the four transport operations.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
};

use crate::enrollment::EnrollmentFlow;
use crate::error::Result;
use crate::identity::{IdentityStore, PublicIdentity};
use crate::session::SessionToken;

use super::token::TokenExtractor;
use super::types::{
    BeginEnrollmentRequest, BeginEnrollmentResponse, CheckIdentityRequest, CheckIdentityResponse,
    CompleteAuthenticationRequest,
};

/// Build the auth router over any identity store.
///
/// Exposes the four logical operations:
/// - `POST /auth/check` - does this identity exist?
/// - `POST /auth/enroll` - begin enrollment, returning provisioning material
/// - `POST /auth/verify` - submit a code, receiving a session token
/// - `GET /auth/me` - current identity for a bearer token, secret stripped
pub fn router<S: IdentityStore + 'static>(flow: Arc<EnrollmentFlow<S>>) -> Router {
    Router::new()
        .route("/auth/check", post(check_identity::<S>))
        .route("/auth/enroll", post(begin_enrollment::<S>))
        .route("/auth/verify", post(complete_authentication::<S>))
        .route("/auth/me", get(current_identity::<S>))
        .with_state(flow)
}

async fn check_identity<S: IdentityStore>(
    State(flow): State<Arc<EnrollmentFlow<S>>>,
    Json(req): Json<CheckIdentityRequest>,
) -> Result<Json<CheckIdentityResponse>> {
    let exists = flow.check_identity(&req.email).await?;
    Ok(Json(CheckIdentityResponse { exists }))
}

async fn begin_enrollment<S: IdentityStore>(
    State(flow): State<Arc<EnrollmentFlow<S>>>,
    Json(req): Json<BeginEnrollmentRequest>,
) -> Result<Json<BeginEnrollmentResponse>> {
    let setup = flow.begin_enrollment(&req.email).await?;
    Ok(Json(setup.into()))
}

async fn complete_authentication<S: IdentityStore>(
    State(flow): State<Arc<EnrollmentFlow<S>>>,
    Json(req): Json<CompleteAuthenticationRequest>,
) -> Result<Json<SessionToken>> {
    let attempt = req.attempt();
    let session = flow
        .complete_authentication(&req.email, &req.code, attempt)
        .await?;
    Ok(Json(session))
}

async fn current_identity<S: IdentityStore>(
    State(flow): State<Arc<EnrollmentFlow<S>>>,
    headers: HeaderMap,
) -> Result<Json<PublicIdentity>> {
    let token = TokenExtractor::from_headers(&headers)?;
    let identity = flow.current_identity(&token).await?;
    Ok(Json(identity))
}
