//! HTTP transport boundary.
//!
//! A thin axum layer over [`EnrollmentFlow`](crate::EnrollmentFlow): four
//! JSON operations and a bearer-token extractor. Everything else (CORS,
//! static assets, TLS) is left to the embedding application.

mod routes;
mod token;
mod types;

pub use routes::router;
pub use token::TokenExtractor;
pub use types::{
    BeginEnrollmentRequest, BeginEnrollmentResponse, CheckIdentityRequest, CheckIdentityResponse,
    CompleteAuthenticationRequest,
};
