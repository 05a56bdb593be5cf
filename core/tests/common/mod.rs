// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use atelier::{
  ImageAttachment, ImageStore, NewOrder, Order, OrderForm, OrderStore, RateError, RateSource, RateTable, StoreError,
  StoredImage, UploadError,
};
use atelier::validation::ValidatedImage;
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Helper for Tracing Setup ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Form builders ---

/// A complete, valid submission: black light t-shirt, no text, priced 16.95.
pub fn valid_form() -> OrderForm {
  OrderForm {
    product: Some("tshirt".to_string()),
    color: Some("black".to_string()),
    rate: Some("USD".to_string()),
    material: Some("light".to_string()),
    text: Some(String::new()),
    price: Some("16.95".to_string()),
  }
}

pub fn form_with(field: &str, value: &str) -> OrderForm {
  let mut form = valid_form();
  assert!(form.set(field, value.to_string()), "unknown form field {}", field);
  form
}

pub fn form_without(field: &str) -> OrderForm {
  let mut form = valid_form();
  match field {
    "product" => form.product = None,
    "color" => form.color = None,
    "rate" => form.rate = None,
    "material" => form.material = None,
    "text" => form.text = None,
    "price" => form.price = None,
    other => panic!("unknown form field {}", other),
  }
  form
}

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn png_attachment() -> ImageAttachment {
  let mut bytes = PNG_MAGIC.to_vec();
  bytes.extend_from_slice(&[0u8; 64]);
  ImageAttachment::new(Some("logo.png".to_string()), Some("image/png".to_string()), bytes)
}

pub fn attachment_of(content_type: &str, len: usize) -> ImageAttachment {
  ImageAttachment::new(Some("upload.bin".to_string()), Some(content_type.to_string()), vec![7u8; len])
}

// --- Test doubles ---

/// An order store whose inserts fail while `failing` is set.
#[derive(Default)]
pub struct FailingOrderStore {
  pub failing: AtomicBool,
  pub insert_attempts: AtomicUsize,
}

impl FailingOrderStore {
  pub fn always_failing() -> Self {
    Self {
      failing: AtomicBool::new(true),
      insert_attempts: AtomicUsize::new(0),
    }
  }
}

#[async_trait]
impl OrderStore for FailingOrderStore {
  async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
    self.insert_attempts.fetch_add(1, Ordering::SeqCst);
    if self.failing.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("database is down".to_string()));
    }
    Ok(Order::from_new(order))
  }

  async fn get(&self, _id: Uuid) -> Result<Option<Order>, StoreError> {
    Err(StoreError::Unavailable("database is down".to_string()))
  }

  async fn list(&self) -> Result<Vec<Order>, StoreError> {
    Err(StoreError::Unavailable("database is down".to_string()))
  }
}

/// An image store that refuses every write.
#[derive(Default)]
pub struct FailingImageStore {
  pub put_attempts: AtomicUsize,
}

#[async_trait]
impl ImageStore for FailingImageStore {
  async fn put(&self, file_name: &str, _image: &ValidatedImage) -> Result<StoredImage, UploadError> {
    self.put_attempts.fetch_add(1, Ordering::SeqCst);
    Err(UploadError::Write {
      file_name: file_name.to_string(),
      source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
    })
  }

  async fn remove(&self, _file_name: &str) -> Result<(), UploadError> {
    Ok(())
  }
}

/// Succeeds for the first `successes` calls, then fails.
pub struct FlakyRateSource {
  pub table: RateTable,
  pub successes: usize,
  pub calls: Arc<AtomicUsize>,
}

impl FlakyRateSource {
  pub fn new(table: RateTable, successes: usize) -> Self {
    Self {
      table,
      successes,
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }
}

#[async_trait]
impl RateSource for FlakyRateSource {
  async fn fetch_latest(&self) -> Result<RateTable, RateError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if call < self.successes {
      Ok(self.table.clone())
    } else {
      Err(RateError::Request("connection refused".to_string()))
    }
  }

  fn name(&self) -> &'static str {
    "flaky"
  }
}
