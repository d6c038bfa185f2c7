use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{dto::validation::MAX_IDENTITY_LENGTH, error::AppError};

/// Header carrying the identity resolved by the upstream identity service.
pub const CALLER_HEADER: &str = "x-user-id";

/// Authenticated caller of a mutating endpoint.
#[derive(Debug, Clone)]
pub struct CallerId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(CALLER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("missing caller header `X-User-Id`".into()))?;

        if identity.len() > MAX_IDENTITY_LENGTH {
            return Err(AppError::BadRequest(format!(
                "caller identity exceeds {MAX_IDENTITY_LENGTH} characters"
            )));
        }
        Ok(CallerId(identity.to_owned()))
    }
}
