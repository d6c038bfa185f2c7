//! Request extractors whose rejections render as [`AppError`] bodies.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
};
use axum_valid::{HasValidate, Valid, ValidRejection};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body; malformed payloads are rejected with `invalid_argument`.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl<T: Validate> HasValidate for AppJson<T> {
    type Validate = T;

    fn get_validate(&self) -> &T {
        &self.0
    }
}

/// Path parameters; unparsable segments are rejected with `invalid_argument`.
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// JSON body that passed its `validator` rules.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Valid(AppJson(value)) = Valid::<AppJson<T>>::from_request(req, state)
            .await
            .map_err(|rejection| match rejection {
                ValidRejection::Valid(errors) => AppError::from(errors),
                ValidRejection::Inner(err) => err,
            })?;
        Ok(Self(value))
    }
}
