// tests/validation_tests.rs
mod common;

use atelier::{validate_submission, Currency, Material, OrderForm, Product, MAX_IMAGE_BYTES};
use common::*;
use rust_decimal_macros::dec;

#[test]
fn test_valid_form_produces_configuration() {
  let validated = validate_submission(&valid_form(), None).unwrap();
  assert_eq!(validated.configuration.product, Product::Tshirt);
  assert_eq!(validated.configuration.color, "black");
  assert_eq!(validated.configuration.display_currency, Currency::Usd);
  assert_eq!(validated.configuration.material, Material::Light);
  assert_eq!(validated.configuration.text, "");
  assert_eq!(validated.quoted_price, dec!(16.95));
  assert!(validated.image.is_none());
}

#[test]
fn test_unknown_product_is_rejected() {
  let errors = validate_submission(&form_with("product", "hoodie"), None).unwrap_err();
  assert!(errors.has_field("product"));
  // Color cannot be checked without a product, so it is not reported.
  assert!(!errors.has_field("color"));
}

#[test]
fn test_non_numeric_price_is_rejected() {
  let errors = validate_submission(&form_with("price", "abc"), None).unwrap_err();
  assert_eq!(errors.fields(), vec!["price"]);
}

#[test]
fn test_price_accepts_integer_and_scientific_notation() {
  let integer = validate_submission(&form_with("price", "17"), None).unwrap();
  assert_eq!(integer.quoted_price, dec!(17));
  let scientific = validate_submission(&form_with("price", "1.695e1"), None).unwrap();
  assert_eq!(scientific.quoted_price, dec!(16.95));
}

#[test]
fn test_negative_and_empty_price_are_rejected() {
  assert!(validate_submission(&form_with("price", "-1"), None).unwrap_err().has_field("price"));
  assert!(validate_submission(&form_with("price", "  "), None).unwrap_err().has_field("price"));
}

#[test]
fn test_each_missing_field_is_reported() {
  for field in ["product", "color", "rate", "material", "text", "price"] {
    let errors = validate_submission(&form_without(field), None).unwrap_err();
    assert_eq!(errors.fields(), vec![field], "missing {}", field);
  }
}

#[test]
fn test_all_problems_are_reported_together() {
  let form = OrderForm {
    product: Some("sweater".to_string()),
    color: Some("green".to_string()),
    rate: Some("GBP".to_string()),
    material: Some("silk".to_string()),
    text: Some("this text is far too long".to_string()),
    price: Some("free".to_string()),
  };
  let errors = validate_submission(&form, None).unwrap_err();
  assert_eq!(errors.fields(), vec!["rate", "material", "color", "text", "price"]);
}

#[test]
fn test_color_must_be_offered_for_product() {
  assert!(validate_submission(&form_with("color", "pink"), None).unwrap_err().has_field("color"));

  let mut sweater = form_with("product", "sweater");
  sweater.color = Some("pink".to_string());
  assert!(validate_submission(&sweater, None).is_ok());
}

#[test]
fn test_material_is_kept_for_sweaters() {
  let mut form = form_with("product", "sweater");
  form.material = Some("heavy".to_string());
  let validated = validate_submission(&form, None).unwrap();
  assert_eq!(validated.configuration.material, Material::Heavy);
}

#[test]
fn test_text_limit_is_sixteen_characters() {
  assert!(validate_submission(&form_with("text", "1234567890abcdef"), None).is_ok());
  assert!(validate_submission(&form_with("text", "1234567890abcdefg"), None)
    .unwrap_err()
    .has_field("text"));
  // Sixteen multi-byte characters are still sixteen characters.
  assert!(validate_submission(&form_with("text", "ßßßßßßßßßßßßßßßß"), None).is_ok());
}

#[test]
fn test_text_limit_counts_surrogate_pairs_twice() {
  assert!(validate_submission(&form_with("text", "😀😀😀😀😀😀😀😀"), None).is_ok());
  let errors = validate_submission(&form_with("text", "😀😀😀😀😀😀😀😀😀"), None).unwrap_err();
  assert_eq!(errors.fields(), vec!["text"]);
}

#[test]
fn test_image_attachment_is_accepted() {
  let validated = validate_submission(&valid_form(), Some(png_attachment())).unwrap();
  let image = validated.image.unwrap();
  assert_eq!(image.content_type, "image/png");
  assert_eq!(image.original_name.as_deref(), Some("logo.png"));
  assert_eq!(&image.bytes[..8], &PNG_MAGIC);
}

#[test]
fn test_image_content_type_parameters_are_stripped() {
  let validated = validate_submission(&valid_form(), Some(attachment_of("Image/JPEG; charset=binary", 10))).unwrap();
  assert_eq!(validated.image.unwrap().content_type, "image/jpeg");
}

#[test]
fn test_non_image_upload_is_rejected() {
  let errors = validate_submission(&valid_form(), Some(attachment_of("application/pdf", 10))).unwrap_err();
  assert_eq!(errors.fields(), vec!["image"]);

  let mut untyped = attachment_of("image/png", 10);
  untyped.content_type = None;
  assert!(validate_submission(&valid_form(), Some(untyped)).unwrap_err().has_field("image"));
}

#[test]
fn test_svg_upload_is_rejected() {
  let errors = validate_submission(&valid_form(), Some(attachment_of("image/svg+xml", 64))).unwrap_err();
  assert_eq!(errors.fields(), vec!["image"]);
  assert!(validate_submission(&valid_form(), Some(attachment_of("Image/SVG+XML; charset=utf-8", 64)))
    .unwrap_err()
    .has_field("image"));
}

#[test]
fn test_image_size_limit() {
  assert!(validate_submission(&valid_form(), Some(attachment_of("image/png", MAX_IMAGE_BYTES))).is_ok());
  let errors = validate_submission(&valid_form(), Some(attachment_of("image/png", MAX_IMAGE_BYTES + 1))).unwrap_err();
  assert!(errors.has_field("image"));
  assert!(validate_submission(&valid_form(), Some(attachment_of("image/png", 0)))
    .unwrap_err()
    .has_field("image"));
}

#[test]
fn test_errors_display_lists_fields() {
  let errors = validate_submission(&form_with("product", "hoodie"), None).unwrap_err();
  let message = errors.to_string();
  assert!(message.starts_with("product: "));
  assert!(message.contains("hoodie"));
}
