// atelier/src/submission.rs

//! The order submission service.
//!
//! A submission runs as a four-step pipeline:
//!
//! 1. `validate_submission`: every field checked, nothing written yet.
//! 2. `compute_price`: the authoritative price is recomputed from the configuration.
//! 3. `store_image`: only when an image was attached.
//! 4. `persist_order`: the order record is inserted; a stored image is removed
//!    again (best effort) if this fails.

use crate::error::{PipelineError, StoreError, SubmissionError};
use crate::order::{ImageAttachment, NewOrder, Order, OrderConfirmation};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult, SkipCondition};
use crate::pricing::compute_price;
use crate::store::{generated_file_name, ImageStoreRef, OrderStoreRef, StoredImage};
use crate::validation::{validate_submission, OrderForm, ValidatedSubmission, ValidationErrors};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const STEP_VALIDATE: &str = "validate_submission";
pub const STEP_PRICE: &str = "compute_price";
pub const STEP_STORE_IMAGE: &str = "store_image";
pub const STEP_PERSIST: &str = "persist_order";

/// What to do when the client-submitted price differs from the recomputed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PricePolicy {
  /// Persist the recomputed price and log the discrepancy.
  #[default]
  Recompute,
  /// Reject the submission with a `price` validation error.
  RejectMismatch,
}

impl FromStr for PricePolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "recompute" => Ok(PricePolicy::Recompute),
      "reject_mismatch" | "reject-mismatch" => Ok(PricePolicy::RejectMismatch),
      other => Err(format!("unknown price policy '{}'", other)),
    }
  }
}

impl fmt::Display for PricePolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PricePolicy::Recompute => f.write_str("recompute"),
      PricePolicy::RejectMismatch => f.write_str("reject_mismatch"),
    }
  }
}

/// State shared by the submission steps.
#[derive(Debug, Default)]
pub struct SubmissionCtxData {
  pub form: OrderForm,
  pub attachment: Option<ImageAttachment>,
  pub validated: Option<ValidatedSubmission>,
  pub price: Option<Decimal>,
  pub stored_image: Option<StoredImage>,
  pub order: Option<Order>,
}

impl SubmissionCtxData {
  pub fn new(form: OrderForm, attachment: Option<ImageAttachment>) -> Self {
    Self {
      form,
      attachment,
      ..Default::default()
    }
  }
}

fn missing(step_name: &str, what: &'static str) -> SubmissionError {
  SubmissionError::Pipeline(PipelineError::MissingState {
    step_name: step_name.to_string(),
    what,
  })
}

/// Validates, prices, stores and acknowledges order submissions.
pub struct OrderSubmissionService {
  pipeline: Pipeline<SubmissionCtxData, SubmissionError>,
  orders: OrderStoreRef,
}

impl OrderSubmissionService {
  pub fn new(orders: OrderStoreRef, images: ImageStoreRef, price_policy: PricePolicy) -> Result<Self, PipelineError> {
    let pipeline = build_submission_pipeline(orders.clone(), images, price_policy)?;
    Ok(Self { pipeline, orders })
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.pipeline.step_names()
  }

  /// Runs one submission to completion. Either the order is persisted (with
  /// its image, if any) or an error is returned and no order exists.
  #[instrument(
    name = "OrderSubmissionService::submit",
    skip_all,
    fields(has_image = attachment.is_some()),
    err(Display)
  )]
  pub async fn submit(
    &self,
    form: OrderForm,
    attachment: Option<ImageAttachment>,
  ) -> Result<OrderConfirmation, SubmissionError> {
    let ctx_data = ContextData::new(SubmissionCtxData::new(form, attachment));

    match self.pipeline.run(ctx_data.clone()).await? {
      PipelineResult::Completed => {}
      PipelineResult::Stopped => return Err(SubmissionError::Halted),
    }

    let mut guard = ctx_data.write();
    let order = guard.order.take().ok_or_else(|| missing("submit", "order"))?;
    let quoted_price = guard
      .validated
      .as_ref()
      .map(|v| v.quoted_price)
      .ok_or_else(|| missing("submit", "validated submission"))?;

    info!(order_id = %order.id, price = %order.price, image = ?order.image_path, "Order submitted.");
    Ok(OrderConfirmation { order, quoted_price })
  }

  /// Orders straight from the store, newest first.
  pub async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
    self.orders.list().await
  }

  pub async fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    self.orders.get(id).await
  }
}

fn build_submission_pipeline(
  orders: OrderStoreRef,
  images: ImageStoreRef,
  price_policy: PricePolicy,
) -> Result<Pipeline<SubmissionCtxData, SubmissionError>, PipelineError> {
  let without_image: SkipCondition<SubmissionCtxData> = Arc::new(|ctx: &ContextData<SubmissionCtxData>| {
    ctx.with(|d| d.validated.as_ref().map_or(true, |v| v.image.is_none()))
  });
  let mut p = Pipeline::<SubmissionCtxData, SubmissionError>::new(&[
    (STEP_VALIDATE, false, None),
    (STEP_PRICE, false, None),
    (STEP_STORE_IMAGE, false, Some(without_image)),
    (STEP_PERSIST, false, None),
  ]);

  // Step 1: Validate every field before any side effect.
  p.on_root(STEP_VALIDATE, |ctx_data: ContextData<SubmissionCtxData>| async move {
    let mut guard = ctx_data.write();
    let form = std::mem::take(&mut guard.form);
    let attachment = guard.attachment.take();
    let validated = validate_submission(&form, attachment)?;
    guard.validated = Some(validated);
    Ok::<_, SubmissionError>(PipelineControl::Continue)
  })?;

  // Step 2: Recompute the authoritative price.
  p.on_root(STEP_PRICE, move |ctx_data: ContextData<SubmissionCtxData>| async move {
    let mut guard = ctx_data.write();
    let validated = guard.validated.as_ref().ok_or_else(|| missing(STEP_PRICE, "validated submission"))?;
    let price = compute_price(&validated.configuration.pricing_input(validated.image.is_some()));
    let quoted = validated.quoted_price;

    if quoted != price {
      match price_policy {
        PricePolicy::Recompute => {
          warn!(%quoted, %price, "Client price differs from computed price; using computed price.");
        }
        PricePolicy::RejectMismatch => {
          return Err(SubmissionError::Validation(ValidationErrors::single(
            "price",
            format!("submitted price {} does not match computed price {}", quoted, price),
          )));
        }
      }
    }
    guard.price = Some(price);
    Ok(PipelineControl::Continue)
  })?;

  let cleanup_images = images.clone();

  // Step 3: Store the image under a generated name. Skipped without one.
  p.on_root(STEP_STORE_IMAGE, move |ctx_data: ContextData<SubmissionCtxData>| {
    let images = images.clone();
    async move {
      let image = {
        let mut guard = ctx_data.write();
        guard.validated.as_mut().and_then(|v| v.image.take())
      }
      .ok_or_else(|| missing(STEP_STORE_IMAGE, "validated image"))?;

      let file_name = generated_file_name(&image);
      let stored = images.put(&file_name, &image).await?;
      info!(file_name = %stored.file_name, size = stored.size, "Image stored.");
      ctx_data.write().stored_image = Some(stored);
      Ok::<_, SubmissionError>(PipelineControl::Continue)
    }
  })?;

  // Step 4: Persist the order, undoing the image write if that fails.
  p.on_root(STEP_PERSIST, move |ctx_data: ContextData<SubmissionCtxData>| {
    let orders = orders.clone();
    let images = cleanup_images.clone();
    async move {
      let (new_order, stored_image) = {
        let guard = ctx_data.read();
        let validated = guard
          .validated
          .as_ref()
          .ok_or_else(|| missing(STEP_PERSIST, "validated submission"))?;
        let price = guard.price.ok_or_else(|| missing(STEP_PERSIST, "price"))?;
        let new_order = NewOrder {
          configuration: validated.configuration.clone(),
          price,
          image_path: guard.stored_image.as_ref().map(|s| s.public_path.clone()),
        };
        (new_order, guard.stored_image.clone())
      };

      match orders.insert(new_order).await {
        Ok(order) => {
          ctx_data.write().order = Some(order);
          Ok::<_, SubmissionError>(PipelineControl::Continue)
        }
        Err(e) => {
          if let Some(stored) = stored_image {
            if let Err(cleanup_err) = images.remove(&stored.file_name).await {
              warn!(file_name = %stored.file_name, error = %cleanup_err, "Failed to remove orphaned image.");
            }
          }
          Err(SubmissionError::Persistence(e))
        }
      }
    }
  })?;

  Ok(p)
}
