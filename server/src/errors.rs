// atelier_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use atelier::{RateError, StoreError, SubmissionError, UploadError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  /// A malformed request that never reached the submission pipeline.
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Invalid or missing fields: {0}")]
  InvalidFields(ValidationErrors),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Upload Error: {0}")]
  Upload(#[from] UploadError),

  #[error("Persistence Error: {0}")]
  Persistence(#[from] StoreError),

  #[error("Exchange Rate Error: {0}")]
  Rates(#[from] RateError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<SubmissionError> for AppError {
  fn from(err: SubmissionError) -> Self {
    match err {
      SubmissionError::Validation(errors) => AppError::InvalidFields(errors),
      SubmissionError::Upload(e) => AppError::Upload(e),
      SubmissionError::Persistence(e) => AppError::Persistence(e),
      other @ (SubmissionError::Pipeline(_) | SubmissionError::Halted) => AppError::Internal(other.to_string()),
    }
  }
}

impl AppError {
  /// Client-facing message. Backend details stay in the logs.
  fn public_message(&self) -> String {
    match self {
      AppError::Validation(m) => m.clone(),
      AppError::InvalidFields(_) => "Invalid or missing fields".to_string(),
      AppError::NotFound(m) => m.clone(),
      AppError::Upload(UploadError::Write { .. }) => "The uploaded image could not be saved, please retry".to_string(),
      AppError::Upload(_) => "Failed to store the uploaded image".to_string(),
      AppError::Persistence(_) => "The order could not be saved, please retry".to_string(),
      AppError::Rates(_) => "Exchange rates are unavailable".to_string(),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => "An internal error occurred".to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Persistence(_) | AppError::Upload(UploadError::Write { .. }) => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Upload(_) | AppError::Rates(_) | AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::info!(application_error = %self, "Rejecting request");
    }

    let body = match self {
      AppError::InvalidFields(errors) => json!({
        "ok": false,
        "message": self.public_message(),
        "errors": errors,
      }),
      _ => json!({ "ok": false, "message": self.public_message() }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
