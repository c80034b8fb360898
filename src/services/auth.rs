use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::errors::AppError;
use crate::types::Dependencies;

#[derive(Clone)]
pub struct AuthService {
    deps: Arc<Dependencies>,
}

impl AuthService {
    pub fn new(deps: Arc<Dependencies>) -> Self {
        Self { deps }
    }

    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let Some(raw_header) = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            warn!("request rejected: missing authorization header");
            return Err(AppError::unauthorized());
        };

        let token = raw_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .unwrap_or_default();

        if token.is_empty() {
            warn!("request rejected: missing bearer token");
            return Err(AppError::unauthorized());
        }

        if !tokens_match(token, &self.deps.api_token) {
            warn!("request rejected: invalid bearer token");
            return Err(AppError::unauthorized());
        }

        Ok(())
    }
}

fn tokens_match(presented: &str, expected: &str) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
