// atelier/src/store/in_memory.rs

use super::{is_safe_file_name, ImageStore, OrderStore, StoredImage};
use crate::error::{StoreError, UploadError};
use crate::order::{NewOrder, Order};
use crate::validation::ValidatedImage;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A thread-safe, process-lifetime order store.
///
/// Used by tests and by the server when no database is configured.
#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
  orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
  async fn insert(&self, order: NewOrder) -> Result<Order, StoreError> {
    let order = Order::from_new(order);
    self.orders.write().push(order.clone());
    Ok(order)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    Ok(self.orders.read().iter().find(|o| o.id == id).cloned())
  }

  async fn list(&self) -> Result<Vec<Order>, StoreError> {
    let mut orders = self.orders.read().clone();
    // Stable sort keeps insertion order among equal timestamps, so reverse first.
    orders.reverse();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }
}

/// Keeps uploaded images in memory, keyed by file name.
#[derive(Clone)]
pub struct InMemoryImageStore {
  public_prefix: String,
  images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryImageStore {
  pub fn new(public_prefix: impl Into<String>) -> Self {
    Self {
      public_prefix: public_prefix.into(),
      images: Arc::default(),
    }
  }

  pub fn contains(&self, file_name: &str) -> bool {
    self.images.read().contains_key(file_name)
  }

  pub fn len(&self) -> usize {
    self.images.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.images.read().is_empty()
  }
}

impl Default for InMemoryImageStore {
  fn default() -> Self {
    Self::new("/uploads")
  }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
  async fn put(&self, file_name: &str, image: &ValidatedImage) -> Result<StoredImage, UploadError> {
    if !is_safe_file_name(file_name) {
      return Err(UploadError::InvalidName(file_name.to_string()));
    }
    self.images.write().insert(file_name.to_string(), image.bytes.clone());
    Ok(StoredImage {
      file_name: file_name.to_string(),
      public_path: format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name),
      size: image.bytes.len(),
    })
  }

  async fn remove(&self, file_name: &str) -> Result<(), UploadError> {
    self.images.write().remove(file_name);
    Ok(())
  }
}
