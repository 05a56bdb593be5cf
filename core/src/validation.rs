// atelier/src/validation.rs

//! Checks a raw submission against the catalog before anything is stored.

use crate::catalog::{
  text_length, Currency, Material, Product, IMAGE_MIME_PREFIX, MAX_IMAGE_BYTES, REJECTED_IMAGE_TYPES, TEXT_MAX_CHARS,
};
use crate::order::{ImageAttachment, OrderConfiguration};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Submission fields exactly as received. `None` means the field was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderForm {
  pub product: Option<String>,
  pub color: Option<String>,
  pub rate: Option<String>,
  pub material: Option<String>,
  pub text: Option<String>,
  pub price: Option<String>,
}

impl OrderForm {
  /// Assigns a named form field. Returns `false` for names the form does not know.
  pub fn set(&mut self, field: &str, value: String) -> bool {
    let slot = match field {
      "product" => &mut self.product,
      "color" => &mut self.color,
      "rate" => &mut self.rate,
      "material" => &mut self.material,
      "text" => &mut self.text,
      "price" => &mut self.price,
      _ => return false,
    };
    *slot = Some(value);
    true
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: &'static str,
  pub message: String,
}

/// Every problem found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self {
    Self::default()
  }

  /// A single-field error.
  pub fn single(field: &'static str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.push(field, message);
    errors
  }

  pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.push(FieldError {
      field,
      message: message.into(),
    });
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
    self.0.iter()
  }

  pub fn has_field(&self, field: &str) -> bool {
    self.0.iter().any(|e| e.field == field)
  }

  /// Field names in the order they were reported, without duplicates.
  pub fn fields(&self) -> Vec<&'static str> {
    let mut fields: Vec<&'static str> = Vec::new();
    for e in &self.0 {
      if !fields.contains(&e.field) {
        fields.push(e.field);
      }
    }
    fields
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let parts: Vec<String> = self.0.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
    f.write_str(&parts.join("; "))
  }
}

impl std::error::Error for ValidationErrors {}

/// An attachment that passed the type and size checks.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedImage {
  /// Lowercased media type without parameters, e.g. `image/png`.
  pub content_type: String,
  pub original_name: Option<String>,
  pub bytes: Vec<u8>,
}

impl fmt::Debug for ValidatedImage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ValidatedImage")
      .field("content_type", &self.content_type)
      .field("original_name", &self.original_name)
      .field("len", &self.bytes.len())
      .finish()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
  pub configuration: OrderConfiguration,
  /// The client-submitted price. Never persisted as the order price.
  pub quoted_price: Decimal,
  pub image: Option<ValidatedImage>,
}

fn required<'a>(errors: &mut ValidationErrors, field: &'static str, value: &'a Option<String>) -> Option<&'a str> {
  match value {
    Some(v) => Some(v.as_str()),
    None => {
      errors.push(field, "is required");
      None
    }
  }
}

fn parse_enum<T: FromStr>(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>, allowed: &str) -> Option<T> {
  let raw = value?;
  match raw.parse::<T>() {
    Ok(parsed) => Some(parsed),
    Err(_) => {
      errors.push(field, format!("'{}' is not one of {}", raw, allowed));
      None
    }
  }
}

/// Parses a submitted price. Accepts plain and scientific decimal notation.
pub fn parse_price(raw: &str) -> Option<Decimal> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  Decimal::from_str(trimmed)
    .or_else(|_| Decimal::from_scientific(trimmed))
    .ok()
}

/// Normalizes a content type to its lowercased essence (`image/png; q=1` -> `image/png`).
pub fn media_type_essence(content_type: &str) -> String {
  content_type
    .split(';')
    .next()
    .unwrap_or_default()
    .trim()
    .to_ascii_lowercase()
}

fn validate_image(errors: &mut ValidationErrors, attachment: ImageAttachment) -> Option<ValidatedImage> {
  let before = errors.len();
  let content_type = attachment.content_type.as_deref().map(media_type_essence);

  match content_type.as_deref() {
    Some(ct) if REJECTED_IMAGE_TYPES.contains(&ct) => {
      errors.push("image", format!("content type '{}' is not accepted", ct))
    }
    Some(ct) if ct.starts_with(IMAGE_MIME_PREFIX) && ct.len() > IMAGE_MIME_PREFIX.len() => {}
    Some(ct) => errors.push("image", format!("content type '{}' is not an image", ct)),
    None => errors.push("image", "content type is missing"),
  }
  if attachment.is_empty() {
    errors.push("image", "file is empty");
  }
  if attachment.len() > MAX_IMAGE_BYTES {
    errors.push(
      "image",
      format!("file is {} bytes, the limit is {} bytes", attachment.len(), MAX_IMAGE_BYTES),
    );
  }

  if errors.len() > before {
    return None;
  }
  Some(ValidatedImage {
    content_type: content_type.unwrap_or_default(),
    original_name: attachment.file_name,
    bytes: attachment.bytes,
  })
}

/// Validates every field of a submission and reports all failures together.
pub fn validate_submission(
  form: &OrderForm,
  attachment: Option<ImageAttachment>,
) -> Result<ValidatedSubmission, ValidationErrors> {
  let mut errors = ValidationErrors::new();

  let product_raw = required(&mut errors, "product", &form.product);
  let color_raw = required(&mut errors, "color", &form.color);
  let rate_raw = required(&mut errors, "rate", &form.rate);
  let material_raw = required(&mut errors, "material", &form.material);
  let text_raw = required(&mut errors, "text", &form.text);
  let price_raw = required(&mut errors, "price", &form.price);

  let product: Option<Product> = parse_enum(&mut errors, "product", product_raw, "tshirt, sweater");
  let display_currency: Option<Currency> = parse_enum(&mut errors, "rate", rate_raw, "CAD, USD, EUR");
  let material: Option<Material> = parse_enum(&mut errors, "material", material_raw, "light, heavy");

  if let (Some(product), Some(color)) = (product, color_raw) {
    if !product.allows_color(color) {
      errors.push(
        "color",
        format!(
          "'{}' is not available for {}; choose one of {}",
          color,
          product,
          product.allowed_colors().join(", ")
        ),
      );
    }
  }

  if let Some(text) = text_raw {
    let length = text_length(text);
    if length > TEXT_MAX_CHARS {
      errors.push("text", format!("is {} characters, the limit is {}", length, TEXT_MAX_CHARS));
    }
  }

  let quoted_price = match price_raw.map(|raw| (raw, parse_price(raw))) {
    Some((_, Some(price))) if price.is_sign_negative() && !price.is_zero() => {
      errors.push("price", "must not be negative");
      None
    }
    Some((_, Some(price))) => Some(price),
    Some((raw, None)) => {
      errors.push("price", format!("'{}' is not a number", raw));
      None
    }
    None => None,
  };

  let image = attachment.and_then(|a| validate_image(&mut errors, a));

  match (product, display_currency, material, color_raw, text_raw, quoted_price) {
    (Some(product), Some(display_currency), Some(material), Some(color), Some(text), Some(quoted_price))
      if errors.is_empty() =>
    {
      Ok(ValidatedSubmission {
        configuration: OrderConfiguration {
          product,
          color: color.to_string(),
          display_currency,
          material,
          text: text.to_string(),
        },
        quoted_price,
        image,
      })
    }
    _ => Err(errors),
  }
}
