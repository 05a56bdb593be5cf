// atelier/src/store/local_images.rs

use super::{is_safe_file_name, ImageStore, StoredImage};
use crate::error::UploadError;
use crate::validation::ValidatedImage;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

/// Writes uploaded images into a directory served statically under `public_prefix`.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
  root: PathBuf,
  public_prefix: String,
}

impl LocalImageStore {
  /// Opens the store, creating `root` if it does not exist.
  pub async fn open(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Result<Self, UploadError> {
    let root = root.into();
    tokio::fs::create_dir_all(&root)
      .await
      .map_err(|source| UploadError::Directory {
        path: root.display().to_string(),
        source,
      })?;
    Ok(Self {
      root,
      public_prefix: public_prefix.into(),
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Filesystem location of a stored image.
  pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
    is_safe_file_name(file_name).then(|| self.root.join(file_name))
  }

  /// Maps a public path (`/uploads/<name>`) back to the file on disk.
  pub fn resolve_public_path(&self, public_path: &str) -> Option<PathBuf> {
    let prefix = self.public_prefix.trim_end_matches('/');
    public_path
      .strip_prefix(prefix)
      .and_then(|rest| rest.strip_prefix('/'))
      .and_then(|name| self.resolve(name))
  }
}

async fn discard_partial(partial: &Path) {
  match tokio::fs::remove_file(partial).await {
    Ok(()) => {}
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => warn!(path = %partial.display(), error = %e, "Failed to remove partial upload."),
  }
}

#[async_trait]
impl ImageStore for LocalImageStore {
  #[instrument(name = "images::put", skip(self, image), fields(size = image.bytes.len()))]
  async fn put(&self, file_name: &str, image: &ValidatedImage) -> Result<StoredImage, UploadError> {
    let target = self
      .resolve(file_name)
      .ok_or_else(|| UploadError::InvalidName(file_name.to_string()))?;
    let partial = self.root.join(format!(".{}.part", file_name));
    let write_err = |source: io::Error| UploadError::Write {
      file_name: file_name.to_string(),
      source,
    };

    // Write beside the target and rename so a served path never sees a partial file.
    let written = match tokio::fs::write(&partial, &image.bytes).await {
      Ok(()) => tokio::fs::rename(&partial, &target).await,
      Err(e) => Err(e),
    };
    if let Err(e) = written {
      discard_partial(&partial).await;
      return Err(write_err(e));
    }
    debug!(path = %target.display(), "Stored uploaded image.");

    Ok(StoredImage {
      file_name: file_name.to_string(),
      public_path: format!("{}/{}", self.public_prefix.trim_end_matches('/'), file_name),
      size: image.bytes.len(),
    })
  }

  async fn remove(&self, file_name: &str) -> Result<(), UploadError> {
    let target = self
      .resolve(file_name)
      .ok_or_else(|| UploadError::InvalidName(file_name.to_string()))?;
    match tokio::fs::remove_file(&target).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(UploadError::Write {
        file_name: file_name.to_string(),
        source,
      }),
    }
  }
}
