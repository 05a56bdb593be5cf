// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use actix_web::{test, web};
use atelier::{CachedRates, InMemoryOrderStore, LocalImageStore, OrderSubmissionService, PricePolicy, StaticRateSource};
use atelier_server::startup::UPLOADS_PATH;
use atelier_server::web::{configure_app_routes, configure_uploads};
use atelier_server::AppState;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::Level;

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

pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Application state over in-memory orders, built-in rates and a temporary upload directory.
pub struct TestContext {
  pub state: AppState,
  pub orders: InMemoryOrderStore,
  pub upload_dir: TempDir,
}

impl TestContext {
  pub async fn new(price_policy: PricePolicy) -> Self {
    setup_tracing();
    let upload_dir = tempfile::tempdir().unwrap();
    let orders = InMemoryOrderStore::default();
    let images = LocalImageStore::open(upload_dir.path(), UPLOADS_PATH).await.unwrap();
    let service = OrderSubmissionService::new(Arc::new(orders.clone()), Arc::new(images), price_policy).unwrap();
    let rates = CachedRates::new(Arc::new(StaticRateSource::default()), Duration::from_secs(60));

    Self {
      state: AppState {
        submission_service: Arc::new(service),
        rates: Arc::new(rates),
      },
      orders,
      upload_dir,
    }
  }

  /// Mounts the state, the API routes and the uploads directory, as `main` does.
  pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
    let state = self.state.clone();
    let upload_dir = self.upload_dir.path().to_path_buf();
    move |cfg: &mut web::ServiceConfig| {
      cfg.app_data(web::Data::new(state));
      configure_app_routes(cfg);
      configure_uploads(upload_dir)(cfg);
    }
  }
}

/// Hand-assembled `multipart/form-data` body.
pub struct MultipartBody {
  boundary: String,
  body: Vec<u8>,
}

impl MultipartBody {
  pub fn new() -> Self {
    Self {
      boundary: "----atelier-test-boundary-7MA4YWxkTrZu0gW".to_string(),
      body: Vec::new(),
    }
  }

  pub fn text(mut self, name: &str, value: &str) -> Self {
    self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    self
      .body
      .extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
    self.body.extend_from_slice(value.as_bytes());
    self.body.extend_from_slice(b"\r\n");
    self
  }

  pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
    self.body.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
    self.body.extend_from_slice(
      format!(
        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
        name, file_name, content_type
      )
      .as_bytes(),
    );
    self.body.extend_from_slice(bytes);
    self.body.extend_from_slice(b"\r\n");
    self
  }

  /// Returns the `Content-Type` header value and the encoded body.
  pub fn finish(mut self) -> (String, Vec<u8>) {
    self.body.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
    (format!("multipart/form-data; boundary={}", self.boundary), self.body)
  }
}

/// Multipart body for a valid black light t-shirt priced at `price`.
pub fn order_fields(product: &str, color: &str, price: &str) -> MultipartBody {
  MultipartBody::new()
    .text("product", product)
    .text("color", color)
    .text("rate", "USD")
    .text("material", "light")
    .text("text", "")
    .text("price", price)
}

pub fn order_request(body: MultipartBody) -> test::TestRequest {
  let (content_type, payload) = body.finish();
  test::TestRequest::post()
    .uri("/api/order")
    .insert_header((actix_web::http::header::CONTENT_TYPE, content_type))
    .set_payload(payload)
}

pub fn assert_close(actual: f64, expected: f64) {
  assert!((actual - expected).abs() < 1e-9, "expected {}, got {}", expected, actual);
}
