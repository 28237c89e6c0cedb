use std::fmt::Display;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{config::Env, resources::InputError};

/// ApiError
///
/// The boundary error type of every handler and of the `AuthUser` extractor.
/// Internal failures are translated into one of these before leaving the handler;
/// the `Display` text is what the client sees under `"error"`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Token manquant")]
    MissingToken,

    #[error("Token invalide")]
    InvalidToken,

    // Same message for unknown email and wrong password.
    #[error("Email ou mot de passe incorrect")]
    InvalidCredentials,

    #[error("Un administrateur existe déjà")]
    AdminAlreadyExists,

    #[error("Ressource non trouvée")]
    UnknownResource,

    #[error("{0}")]
    BadRequest(String),

    #[error("Format non pris en charge. Utilisez JPG, PNG ou WEBP.")]
    UnsupportedMediaType,

    #[error("Le fichier dépasse 4 Mo. Compressez-le avant upload.")]
    PayloadTooLarge,

    /// `details` is only populated outside production.
    #[error("Erreur serveur")]
    Internal { details: Option<String> },
}

impl ApiError {
    /// internal
    ///
    /// Logs the underlying failure and wraps it as a 500. The error text is kept
    /// for the response body only when the environment allows it.
    pub fn internal(context: &str, err: impl Display, env: &Env) -> Self {
        tracing::error!("{}: {}", context, err);
        let details = env.exposes_error_details().then(|| err.to_string());
        Self::Internal { details }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken | Self::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Self::AdminAlreadyExists => StatusCode::FORBIDDEN,
            Self::UnknownResource => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("rejected request body: {}", rejection.body_text());
        Self::BadRequest(rejection.body_text())
    }
}

/// ApiJson
///
/// `Json<T>` whose rejections (bad syntax, missing field, wrong content type) are
/// answered as a 400 `ApiError` instead of axum's plain-text 4xx.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Internal {
                details: Some(details),
            } => json!({ "error": self.to_string(), "details": details }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
