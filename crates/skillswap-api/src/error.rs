//! HTTP rendering of engine errors
//!
//! Every failure leaves as `{"error": <kind>, "message": <text>}` with a
//! status derived from its kind.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use skillswap_core::{ErrorKind, SwapError};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub SwapError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.0.kind()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(SwapError::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(SwapError::InvalidInput(rejection.body_text()))
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::SelfSwap
        | ErrorKind::RecipientNotDiscoverable
        | ErrorKind::InvalidOfferedSkill
        | ErrorKind::InvalidWantedSkill
        | ErrorKind::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotAuthorized => StatusCode::FORBIDDEN,
        ErrorKind::InvalidTransition => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = status_for(kind);

        if kind.is_retryable() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected ({}): {}", kind, self.0);
        }

        let body = json!({
            "error": kind,
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillswap_core::{ProfileId, SwapAction, SwapStatus};

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(ErrorKind::SelfSwap),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(ErrorKind::InvalidWantedSkill),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_for(ErrorKind::NotAuthorized), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorKind::InvalidTransition), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(ErrorKind::Unavailable),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_response_status() {
        let err = ApiError(SwapError::InvalidTransition {
            action: SwapAction::Accept,
            status: SwapStatus::Declined,
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

        let err = ApiError(SwapError::not_authorized(&ProfileId::from("x"), "accept"));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
