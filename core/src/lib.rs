// atelier/src/lib.rs

//! Atelier: pricing and order submission for a custom apparel configurator.
//!
//! - [`pricing`] turns a configuration into a USD reference price. It is a
//!   pure function, safe to call from anywhere at any time.
//! - [`rates`] converts reference prices into display currencies, degrading
//!   to cached or built-in rates when the live source is unreachable.
//! - [`submission`] validates a raw submission, recomputes its price, stores
//!   an optional image and persists the order, as a small step [`pipeline`].
//! - [`store`] defines the storage ports and the in-process adapters.

pub mod catalog;
pub mod error;
pub mod order;
pub mod pipeline;
pub mod pricing;
pub mod rates;
pub mod store;
pub mod submission;
pub mod validation;

// --- Re-exports for the Public API ---

pub use crate::catalog::{
  text_length, Currency, Material, Product, UnknownValue, MAX_IMAGE_BYTES, TEXT_FREE_CHARS, TEXT_MAX_CHARS,
};
pub use crate::error::{PipelineError, RateError, StoreError, SubmissionError, UploadError};
pub use crate::order::{ImageAttachment, NewOrder, Order, OrderConfiguration, OrderConfirmation};
pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult};
pub use crate::pricing::{compute_price, quote, PriceBreakdown, PriceQuote, PricingInput};
pub use crate::rates::{CachedRates, DEFAULT_RETRY_AFTER, RateOrigin, RateSnapshot, RateSource, RateTable, StaticRateSource};
pub use crate::store::{
  ImageStore, ImageStoreRef, InMemoryImageStore, InMemoryOrderStore, LocalImageStore, OrderStore, OrderStoreRef,
  StoredImage,
};
pub use crate::submission::{OrderSubmissionService, PricePolicy};
pub use crate::validation::{validate_submission, FieldError, OrderForm, ValidatedSubmission, ValidationErrors};
