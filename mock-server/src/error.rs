use axum::extract::rejection::{FormRejection, JsonRejection, QueryRejection};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Every handler failure. Rendered as `{"detail": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiFailure {
    #[error("{0}")]
    BadRequest(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Field-level validation errors, carried as a list under `detail`.
    #[error("validation failed")]
    Validation(Value),

    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Form(#[from] FormRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl ApiFailure {
    /// A single validation error in the `[{loc, msg, type}]` shape.
    pub fn invalid_field(location: &str, field: &str, msg: &str) -> Self {
        ApiFailure::Validation(json!([{
            "loc": [location, field],
            "msg": msg,
            "type": "value_error",
        }]))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiFailure::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiFailure::NotAuthenticated
            | ApiFailure::InvalidToken
            | ApiFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiFailure::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiFailure::NotFound(_) => StatusCode::NOT_FOUND,
            ApiFailure::Conflict(_) => StatusCode::CONFLICT,
            ApiFailure::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiFailure::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiFailure::Json(rejection) => rejection.status(),
            ApiFailure::Form(rejection) => rejection.status(),
            ApiFailure::Query(rejection) => rejection.status(),
            ApiFailure::Multipart(err) => err.status(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiFailure::Validation(errors) => errors,
            ApiFailure::Json(rejection) => Value::String(rejection.body_text()),
            ApiFailure::Form(rejection) => Value::String(rejection.body_text()),
            ApiFailure::Query(rejection) => Value::String(rejection.body_text()),
            ApiFailure::Multipart(err) => Value::String(err.body_text()),
            other => Value::String(other.to_string()),
        };
        if status.is_server_error() {
            tracing::error!(%status, %detail, "request failed");
        } else {
            tracing::debug!(%status, %detail, "request rejected");
        }
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
