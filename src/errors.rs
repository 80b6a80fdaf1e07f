use crate::db::StoreError;
use crate::helpers::JsonResponse;
use crate::services::PipelineError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

const UNAUTHORIZED: &str = "Invalid credentials";
const FORBIDDEN: &str = "Forbidden";
const INTERNAL: &str = "Internal Server Error";

/// The only error type handlers return. Each variant maps to exactly one status code
/// and the client never sees downstream detail.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication failed")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }

    /// Logs `detail` and answers with a generic body.
    pub fn internal<T: std::fmt::Display>(detail: T) -> Self {
        let detail = detail.to_string();
        tracing::error!("{}", detail);
        ApiError::Internal(detail)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Unauthorized => UNAUTHORIZED.to_string(),
            ApiError::Forbidden => FORBIDDEN.to_string(),
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal(_) => INTERNAL.to_string(),
        };

        HttpResponse::build(self.status_code())
            .json(JsonResponse::<()>::build().set_msg(message).to_json_response())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // owned resources that vanish look the same as resources owned by someone else
            StoreError::NotFound(_) => ApiError::Forbidden,
            err => ApiError::internal(err),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::internal(format!("database: {err}"))
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Forbidden => ApiError::Forbidden,
            PipelineError::Store(err) => err.into(),
            err => ApiError::internal(err),
        }
    }
}
