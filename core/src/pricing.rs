// atelier/src/pricing.rs

//! The pricing engine: a pure function from a configuration to a USD
//! reference price, plus non-authoritative display conversions.

use crate::catalog::{text_length, Currency, Material, Product, TEXT_FREE_CHARS};
use crate::rates::RateTable;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::collections::BTreeMap;

/// Colors sold at the lower base price for every product.
pub const BASIC_COLORS: [&str; 2] = ["black", "white"];

const TSHIRT_BASIC: Decimal = dec!(16.95);
const TSHIRT_OTHER: Decimal = dec!(18.95);
const SWEATER_BASIC: Decimal = dec!(28.95);
const SWEATER_OTHER: Decimal = dec!(32.95);

pub const HEAVY_MATERIAL_SURCHARGE: Decimal = dec!(3.00);
pub const TEXT_SURCHARGE: Decimal = dec!(5.00);
pub const IMAGE_SURCHARGE: Decimal = dec!(10.00);

/// What the engine needs to know about a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingInput<'a> {
  pub product: Product,
  pub color: &'a str,
  pub material: Material,
  pub text: &'a str,
  pub has_image: bool,
}

/// Itemised reference price. Every component is in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
  #[serde(with = "rust_decimal::serde::float")]
  pub base: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub material: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub text: Decimal,
  #[serde(with = "rust_decimal::serde::float")]
  pub image: Decimal,
}

impl PriceBreakdown {
  pub fn total(&self) -> Decimal {
    self.base + self.material + self.text + self.image
  }
}

/// Base price by product and color tier. Colors outside the basic tier,
/// including ones the product does not offer, get the higher price.
pub fn base_price(product: Product, color: &str) -> Decimal {
  let basic = BASIC_COLORS.contains(&color);
  match (product, basic) {
    (Product::Tshirt, true) => TSHIRT_BASIC,
    (Product::Tshirt, false) => TSHIRT_OTHER,
    (Product::Sweater, true) => SWEATER_BASIC,
    (Product::Sweater, false) => SWEATER_OTHER,
  }
}

pub fn breakdown(input: &PricingInput<'_>) -> PriceBreakdown {
  let material = if input.product.uses_material() && input.material == Material::Heavy {
    HEAVY_MATERIAL_SURCHARGE
  } else {
    Decimal::ZERO
  };
  let text = if text_length(input.text) > TEXT_FREE_CHARS {
    TEXT_SURCHARGE
  } else {
    Decimal::ZERO
  };
  let image = if input.has_image { IMAGE_SURCHARGE } else { Decimal::ZERO };

  PriceBreakdown {
    base: base_price(input.product, input.color),
    material,
    text,
    image,
  }
}

/// The USD reference price for a configuration.
pub fn compute_price(input: &PricingInput<'_>) -> Decimal {
  breakdown(input).total()
}

/// A reference price with its display conversions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
  #[serde(with = "rust_decimal::serde::float")]
  pub reference_price: Decimal,
  pub reference_currency: Currency,
  pub breakdown: PriceBreakdown,
  pub display_currency: Currency,
  #[serde(with = "rust_decimal::serde::float")]
  pub display_price: Decimal,
  pub conversions: BTreeMap<Currency, f64>,
}

/// Prices `input` and converts the result into every supported currency.
pub fn quote(input: &PricingInput<'_>, display_currency: Currency, rates: &RateTable) -> PriceQuote {
  let breakdown = breakdown(input);
  let reference_price = breakdown.total();
  let conversions = Currency::ALL
    .into_iter()
    .map(|currency| {
      let converted = rates.convert(reference_price, currency);
      (currency, converted.to_f64().unwrap_or_default())
    })
    .collect();

  PriceQuote {
    reference_price,
    reference_currency: Currency::REFERENCE,
    breakdown,
    display_currency,
    display_price: rates.convert(reference_price, display_currency),
    conversions,
  }
}
