// atelier/src/catalog.rs

//! Allowed values and limits shared by pricing, validation and quoting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest personalisation text accepted, as measured by [`text_length`].
pub const TEXT_MAX_CHARS: usize = 16;

/// Length of personalisation text included in the base price.
pub const TEXT_FREE_CHARS: usize = 8;

/// Largest accepted image attachment (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Every accepted attachment has a content type under this prefix.
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// Image types that can carry script when opened directly in a browser.
pub const REJECTED_IMAGE_TYPES: [&str; 1] = ["image/svg+xml"];

/// Length of personalisation text in UTF-16 code units, the unit browser
/// form fields count in. Characters outside the BMP count twice.
pub fn text_length(text: &str) -> usize {
  text.encode_utf16().count()
}

/// A wire string that does not name a catalog value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
  pub kind: &'static str,
  pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
  Tshirt,
  Sweater,
}

impl Product {
  pub const ALL: [Product; 2] = [Product::Tshirt, Product::Sweater];

  pub fn as_str(&self) -> &'static str {
    match self {
      Product::Tshirt => "tshirt",
      Product::Sweater => "sweater",
    }
  }

  /// Colors offered for this product, in display order.
  pub fn allowed_colors(&self) -> &'static [&'static str] {
    match self {
      Product::Tshirt => &["black", "white", "green", "red"],
      Product::Sweater => &["black", "white", "pink", "yellow"],
    }
  }

  pub fn allows_color(&self, color: &str) -> bool {
    self.allowed_colors().contains(&color)
  }

  /// Material only changes anything for t-shirts.
  pub fn uses_material(&self) -> bool {
    matches!(self, Product::Tshirt)
  }
}

impl fmt::Display for Product {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Product {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "tshirt" => Ok(Product::Tshirt),
      "sweater" => Ok(Product::Sweater),
      other => Err(UnknownValue {
        kind: "product",
        value: other.to_string(),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
  Light,
  Heavy,
}

impl Material {
  pub fn as_str(&self) -> &'static str {
    match self {
      Material::Light => "light",
      Material::Heavy => "heavy",
    }
  }
}

impl fmt::Display for Material {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Material {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "light" => Ok(Material::Light),
      "heavy" => Ok(Material::Heavy),
      other => Err(UnknownValue {
        kind: "material",
        value: other.to_string(),
      }),
    }
  }
}

/// Currencies a price can be displayed in. Prices are always computed in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
  Cad,
  Usd,
  Eur,
}

impl Currency {
  pub const ALL: [Currency; 3] = [Currency::Cad, Currency::Usd, Currency::Eur];

  /// The currency of every computed reference price.
  pub const REFERENCE: Currency = Currency::Usd;

  pub fn code(&self) -> &'static str {
    match self {
      Currency::Cad => "CAD",
      Currency::Usd => "USD",
      Currency::Eur => "EUR",
    }
  }
}

impl fmt::Display for Currency {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for Currency {
  type Err = UnknownValue;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Currency::ALL
      .into_iter()
      .find(|c| c.code() == s)
      .ok_or_else(|| UnknownValue {
        kind: "currency",
        value: s.to_string(),
      })
  }
}
