// atelier/src/store/mod.rs

//! Storage ports for orders and uploaded images, plus the adapters that need
//! nothing beyond the process and the local filesystem.

pub mod in_memory;
pub mod local_images;

use crate::error::{StoreError, UploadError};
use crate::order::{NewOrder, Order};
use crate::validation::ValidatedImage;
use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub use in_memory::{InMemoryImageStore, InMemoryOrderStore};
pub use local_images::LocalImageStore;

/// The single source of truth for persisted orders.
///
/// Implementations assign `id` and `created_at` and must accept concurrent
/// inserts without affecting unrelated records.
#[async_trait]
pub trait OrderStore: Send + Sync {
  async fn insert(&self, order: NewOrder) -> Result<Order, StoreError>;

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

  /// All orders, newest first.
  async fn list(&self) -> Result<Vec<Order>, StoreError>;
}

pub type OrderStoreRef = Arc<dyn OrderStore>;

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
  pub file_name: String,
  /// Path the static file route serves the image under, e.g. `/uploads/<file_name>`.
  pub public_path: String,
  pub size: usize,
}

/// Durable storage for uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
  /// Stores `image` under `file_name`. Once this returns, the image is retrievable.
  async fn put(&self, file_name: &str, image: &ValidatedImage) -> Result<StoredImage, UploadError>;

  async fn remove(&self, file_name: &str) -> Result<(), UploadError>;
}

pub type ImageStoreRef = Arc<dyn ImageStore>;

const KNOWN_EXTENSIONS: [(&str, &str); 7] = [
  ("image/png", "png"),
  ("image/jpeg", "jpg"),
  ("image/gif", "gif"),
  ("image/webp", "webp"),
  ("image/bmp", "bmp"),
  ("image/avif", "avif"),
  ("image/x-icon", "ico"),
];

/// Extensions taken from an original file name. Anything else could be served as active content.
const RASTER_EXTENSIONS: [&str; 12] = [
  "png", "jpg", "jpeg", "gif", "webp", "bmp", "avif", "ico", "tif", "tiff", "heic", "heif",
];

/// File extension for a stored image, from its media type or else its original name.
pub fn extension_for(content_type: &str, original_name: Option<&str>) -> Option<String> {
  if let Some((_, ext)) = KNOWN_EXTENSIONS.iter().find(|(ct, _)| *ct == content_type) {
    return Some((*ext).to_string());
  }
  original_name
    .and_then(|name| Path::new(name).extension())
    .and_then(|ext| ext.to_str())
    .map(|ext| ext.to_ascii_lowercase())
    .filter(|ext| RASTER_EXTENSIONS.contains(&ext.as_str()))
}

/// A fresh, collision-free name for an uploaded image.
pub fn generated_file_name(image: &ValidatedImage) -> String {
  let id = Uuid::new_v4().simple();
  match extension_for(&image.content_type, image.original_name.as_deref()) {
    Some(ext) => format!("{}.{}", id, ext),
    None => id.to_string(),
  }
}

/// Accepts only plain file names: no separators, no parent references.
pub(crate) fn is_safe_file_name(file_name: &str) -> bool {
  !file_name.is_empty()
    && !file_name.starts_with('.')
    && !file_name.contains(|c: char| c == '/' || c == '\\')
    && !file_name.contains("..")
}
