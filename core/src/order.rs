// atelier/src/order.rs

//! Order configuration and the persisted order record.

use crate::catalog::{Currency, Material, Product};
use crate::pricing::PricingInput;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A validated apparel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfiguration {
  pub product: Product,
  pub color: String,
  /// Serialized as `rate` to match the submission form field.
  #[serde(rename = "rate")]
  pub display_currency: Currency,
  /// Stored for every product but only priced for t-shirts.
  pub material: Material,
  pub text: String,
}

impl OrderConfiguration {
  pub fn pricing_input(&self, has_image: bool) -> PricingInput<'_> {
    PricingInput {
      product: self.product,
      color: &self.color,
      material: self.material,
      text: &self.text,
      has_image,
    }
  }
}

/// A single uploaded file as received, before validation.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
  pub file_name: Option<String>,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl ImageAttachment {
  pub fn new(file_name: Option<String>, content_type: Option<String>, bytes: Vec<u8>) -> Self {
    Self {
      file_name,
      content_type,
      bytes,
    }
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

impl std::fmt::Debug for ImageAttachment {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ImageAttachment")
      .field("file_name", &self.file_name)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

/// What the submission service hands to an `OrderStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub configuration: OrderConfiguration,
  pub price: Decimal,
  pub image_path: Option<String>,
}

/// A persisted order. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  #[serde(flatten)]
  pub configuration: OrderConfiguration,
  /// USD reference price computed by the pricing engine.
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub image_path: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Order {
  /// Assigns identity and creation time to `new_order`.
  pub fn from_new(new_order: NewOrder) -> Self {
    Self {
      id: Uuid::new_v4(),
      configuration: new_order.configuration,
      price: new_order.price,
      image_path: new_order.image_path,
      created_at: Utc::now(),
    }
  }
}

/// Returned to the caller after a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
  pub order: Order,
  /// The price the client submitted, echoed back for comparison.
  #[serde(with = "rust_decimal::serde::float")]
  pub quoted_price: Decimal,
}
