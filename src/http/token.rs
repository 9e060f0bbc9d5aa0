use crate::error::KeywayError;
use axum::http::HeaderMap;

/// Extracts bearer tokens from request headers
pub struct TokenExtractor;

impl TokenExtractor {
    /// Extract token from Authorization header
    pub fn from_headers(headers: &HeaderMap) -> Result<String, KeywayError> {
        let auth_header = headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| KeywayError::token_invalid("Missing authorization header"))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(KeywayError::token_invalid(
                "Invalid authorization header format. Expected: Bearer <token>",
            ));
        }

        let token = auth_header.trim_start_matches("Bearer ").to_string();

        if token.is_empty() {
            return Err(KeywayError::token_invalid("Empty bearer token"));
        }

        Ok(token)
    }
}
