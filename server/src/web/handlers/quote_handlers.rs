// atelier_server/src/web/handlers/quote_handlers.rs

use actix_web::{web, HttpResponse};
use atelier::{quote, text_length, Currency, Material, PricingInput, Product, RateOrigin, ValidationErrors, TEXT_MAX_CHARS};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::errors::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
  pub product: String,
  pub color: String,
  #[serde(default)]
  pub material: Option<String>,
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub has_image: bool,
  /// Display currency code; USD when absent.
  #[serde(default)]
  pub rate: Option<String>,
}

fn origin_label(origin: RateOrigin) -> &'static str {
  match origin {
    RateOrigin::Fresh => "fresh",
    RateOrigin::Cached => "cached",
    RateOrigin::LastKnown => "last_known",
    RateOrigin::Fallback => "fallback",
  }
}

struct QuoteSelection {
  product: Product,
  material: Material,
  display_currency: Currency,
}

fn parse_request(req: &QuoteRequest) -> std::result::Result<QuoteSelection, ValidationErrors> {
  let mut errors = ValidationErrors::new();
  let product = req.product.parse::<Product>().map_err(|e| errors.push("product", e.to_string())).ok();
  let material = match req.material.as_deref() {
    Some(raw) => raw.parse::<Material>().map_err(|e| errors.push("material", e.to_string())).ok(),
    None => Some(Material::Light),
  };
  let display_currency = match req.rate.as_deref() {
    Some(raw) => raw.parse::<Currency>().map_err(|e| errors.push("rate", e.to_string())).ok(),
    None => Some(Currency::REFERENCE),
  };
  if text_length(&req.text) > TEXT_MAX_CHARS {
    errors.push("text", format!("text must be at most {} characters", TEXT_MAX_CHARS));
  }

  match (product, material, display_currency) {
    (Some(product), Some(material), Some(display_currency)) if errors.is_empty() => Ok(QuoteSelection {
      product,
      material,
      display_currency,
    }),
    _ => Err(errors),
  }
}

#[instrument(name = "handler::quote", skip(app_state, body), fields(product = %body.product))]
pub async fn quote_handler(app_state: web::Data<AppState>, body: web::Json<QuoteRequest>) -> Result<HttpResponse> {
  let req = body.into_inner();
  let selection = parse_request(&req).map_err(AppError::InvalidFields)?;

  let snapshot = app_state.rates.current().await;
  let input = PricingInput {
    product: selection.product,
    color: &req.color,
    material: selection.material,
    text: &req.text,
    has_image: req.has_image,
  };
  let price_quote = quote(&input, selection.display_currency, &snapshot.table);
  debug!(reference_price = %price_quote.reference_price, "Quoted configuration.");

  Ok(HttpResponse::Ok().json(json!({
    "ok": true,
    "quote": price_quote,
    "ratesOrigin": origin_label(snapshot.origin),
  })))
}

#[instrument(name = "handler::rates", skip(app_state))]
pub async fn rates_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let snapshot = app_state.rates.current().await;
  let rates: BTreeMap<Currency, f64> = snapshot
    .table
    .iter()
    .map(|(currency, rate)| (currency, rate.to_f64().unwrap_or_default()))
    .collect();

  Ok(HttpResponse::Ok().json(json!({
    "base": snapshot.table.base(),
    "rates": rates,
    "referenceCurrency": Currency::REFERENCE,
    "origin": origin_label(snapshot.origin),
  })))
}
