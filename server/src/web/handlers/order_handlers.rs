// atelier_server/src/web/handlers/order_handlers.rs

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::{web, HttpResponse};
use atelier::{ImageAttachment, OrderForm, ValidationErrors, MAX_IMAGE_BYTES};
use futures_util::TryStreamExt;
use serde_json::json;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::AppState;

/// Name of the multipart file part carrying the optional image.
pub const IMAGE_FIELD: &str = "image";

/// Upper bound for any non-file form field.
const MAX_TEXT_FIELD_BYTES: usize = 16 * 1024;

fn malformed(e: MultipartError) -> AppError {
  AppError::Validation(format!("Malformed multipart body: {}", e))
}

/// Reads a part into memory, failing as soon as more than `limit` bytes arrive.
async fn read_limited(field: &mut Field, limit: usize) -> Result<Option<Vec<u8>>> {
  let mut bytes = Vec::new();
  while let Some(chunk) = field.try_next().await.map_err(malformed)? {
    if bytes.len() + chunk.len() > limit {
      return Ok(None);
    }
    bytes.extend_from_slice(&chunk);
  }
  Ok(Some(bytes))
}

/// Splits the multipart body into the text form and the optional image.
pub async fn read_order_form(mut payload: Multipart) -> Result<(OrderForm, Option<ImageAttachment>)> {
  let mut form = OrderForm::default();
  let mut attachment: Option<ImageAttachment> = None;

  while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
    let name = field.name().unwrap_or_default().to_string();

    if name == IMAGE_FIELD {
      if attachment.is_some() {
        return Err(AppError::InvalidFields(ValidationErrors::single(
          "image",
          "only one image may be uploaded",
        )));
      }
      let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .filter(|f| !f.is_empty())
        .map(str::to_string);
      let content_type = field.content_type().map(|m| m.to_string());
      let bytes = read_limited(&mut field, MAX_IMAGE_BYTES).await?.ok_or_else(|| {
        warn!(file_name = ?file_name, "Rejecting oversized image upload.");
        AppError::InvalidFields(ValidationErrors::single(
          "image",
          format!("image must be at most {} bytes", MAX_IMAGE_BYTES),
        ))
      })?;

      // Browsers send an empty, nameless part when no file was chosen.
      if bytes.is_empty() && file_name.is_none() {
        continue;
      }
      debug!(size = bytes.len(), content_type = ?content_type, "Received image part.");
      attachment = Some(ImageAttachment::new(file_name, content_type, bytes));
      continue;
    }

    let bytes = read_limited(&mut field, MAX_TEXT_FIELD_BYTES)
      .await?
      .ok_or_else(|| AppError::Validation(format!("Field '{}' is too large", name)))?;
    let value = String::from_utf8(bytes).map_err(|_| AppError::Validation(format!("Field '{}' is not valid UTF-8", name)))?;
    if !form.set(&name, value) {
      debug!(field = %name, "Ignoring unknown form field.");
    }
  }

  Ok((form, attachment))
}

#[instrument(name = "handler::submit_order", skip(app_state, payload))]
pub async fn submit_order_handler(app_state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
  let (form, attachment) = read_order_form(payload).await?;
  let confirmation = app_state.submission_service.submit(form, attachment).await?;

  info!(
    order_id = %confirmation.order.id,
    price = %confirmation.order.price,
    "Order created."
  );
  Ok(HttpResponse::Created().json(json!({
    "ok": true,
    "order": confirmation.order,
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state))]
pub async fn list_orders_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let orders = app_state.submission_service.list_orders().await?;
  debug!("Listing {} orders.", orders.len());
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(app_state: web::Data<AppState>, path: web::Path<Uuid>) -> Result<HttpResponse> {
  let order_id = path.into_inner();
  match app_state.submission_service.get_order(order_id).await? {
    Some(order) => Ok(HttpResponse::Ok().json(order)),
    None => Err(AppError::NotFound(format!("Order {} not found.", order_id))),
  }
}
