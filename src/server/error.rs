//! Request-level errors and their HTTP mapping.

use crate::deck::{BuildError, PlanError};
use crate::llm::LlmError;
use crate::pptx::PptxError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Everything `/api/generate` can fail with.
///
/// Provider trouble maps to 502 so callers can tell "your upload is bad"
/// (4xx) from "the model misbehaved" (502) from "we broke" (500).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("upload exceeds the configured size limit")]
    PayloadTooLarge,
    #[error("template error: {0}")]
    Template(#[from] PptxError),
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),
    #[error("{0}")]
    Plan(#[from] PlanError),
    #[error("failed to build PPTX: {0}")]
    Build(#[from] BuildError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingField(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Llm(_) => StatusCode::BAD_GATEWAY,
            Self::Template(_) | Self::Plan(_) | Self::Build(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "detail": self.to_string() }))
    }
}
