// atelier/src/error.rs

use crate::validation::ValidationErrors;
use anyhow::Error as AnyhowError;
use std::io;
use thiserror::Error;

/// Misconfiguration or broken invariants inside a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Step '{step_name}' expected {what} to be set by an earlier step")]
  MissingState { step_name: String, what: &'static str },
}

/// Failure of the durable order store.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Order store unavailable: {0}")]
  Unavailable(String),

  #[error("Order store operation failed. Source: {source}")]
  Backend {
    #[source]
    source: AnyhowError,
  },
}

impl StoreError {
  pub fn backend(err: impl Into<AnyhowError>) -> Self {
    StoreError::Backend { source: err.into() }
  }
}

/// Failure while writing or removing an uploaded image.
#[derive(Debug, Error)]
pub enum UploadError {
  #[error("Failed to prepare upload directory '{path}': {source}")]
  Directory {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write image '{file_name}': {source}")]
  Write {
    file_name: String,
    #[source]
    source: io::Error,
  },

  #[error("Invalid stored image name '{0}'")]
  InvalidName(String),
}

/// Failure of the external exchange-rate lookup.
#[derive(Debug, Error)]
pub enum RateError {
  #[error("Rate source request failed: {0}")]
  Request(String),

  #[error("Rate source reported an error: {0}")]
  Rejected(String),

  #[error("Rate table is missing currency {0}")]
  MissingCurrency(&'static str),

  #[error("Rate for {currency} must be positive, got {rate}")]
  InvalidRate { currency: &'static str, rate: String },
}

/// Everything `OrderSubmissionService::submit` can fail with.
///
/// `Validation` is always raised before any durable side effect. `Upload`
/// and `Persistence` are kept apart so a caller can tell a rejected request
/// from a retryable storage failure.
#[derive(Debug, Error)]
pub enum SubmissionError {
  #[error("Validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("Image upload failed: {0}")]
  Upload(#[from] UploadError),

  #[error("Order persistence failed: {0}")]
  Persistence(#[from] StoreError),

  #[error("Submission pipeline error: {0}")]
  Pipeline(#[from] PipelineError),

  #[error("Submission pipeline was halted before the order was persisted")]
  Halted,
}

impl From<ValidationErrors> for SubmissionError {
  fn from(errors: ValidationErrors) -> Self {
    SubmissionError::Validation(errors)
  }
}

impl SubmissionError {
  /// Whether retrying the same submission could succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, SubmissionError::Persistence(_) | SubmissionError::Upload(UploadError::Write { .. }))
  }
}
