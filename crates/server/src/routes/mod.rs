pub mod admin;
pub mod auth;
pub mod projects;
pub mod reports;
pub mod users;

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::AppError;

/// Success body: `{success: true, message, ...payload}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

pub fn ok<T: Serialize>(message: impl Into<String>, payload: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        message: message.into(),
        payload,
    })
}

/// JSON request body whose rejections surface as [`AppError`] envelopes.
pub struct Body<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
