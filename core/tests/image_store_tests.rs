// tests/image_store_tests.rs
mod common;

use atelier::store::{extension_for, generated_file_name};
use atelier::validation::ValidatedImage;
use atelier::{ImageStore, LocalImageStore, UploadError};
use common::*;
use serial_test::serial;

fn png_image() -> ValidatedImage {
  ValidatedImage {
    content_type: "image/png".to_string(),
    original_name: Some("logo.PNG".to_string()),
    bytes: PNG_MAGIC.to_vec(),
  }
}

#[test]
fn test_extension_from_media_type_then_file_name() {
  assert_eq!(extension_for("image/jpeg", Some("photo.jpeg")).as_deref(), Some("jpg"));
  assert_eq!(extension_for("image/x-custom", Some("art.TIFF")).as_deref(), Some("tiff"));
  assert_eq!(extension_for("image/x-custom", Some("no_extension")), None);
  assert_eq!(extension_for("image/x-custom", Some("evil.p/ng")), None);
  assert_eq!(extension_for("image/x-custom", None), None);
}

#[test]
fn test_extension_from_file_name_must_be_a_raster_format() {
  assert_eq!(extension_for("image/x-custom", Some("drawing.svg")), None);
  assert_eq!(extension_for("image/x-custom", Some("page.html")), None);
  assert_eq!(extension_for("image/x-custom", Some("scan.heic")).as_deref(), Some("heic"));
  assert_eq!(extension_for("image/svg+xml", Some("drawing.svg")), None);
}

#[test]
fn test_generated_names_are_unique() {
  let image = png_image();
  let a = generated_file_name(&image);
  let b = generated_file_name(&image);
  assert_ne!(a, b);
  assert!(a.ends_with(".png"));
}

#[tokio::test]
#[serial]
async fn test_open_creates_missing_directory() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().join("nested").join("uploads");
  let store = LocalImageStore::open(root.clone(), "/uploads").await.unwrap();
  assert!(root.is_dir());
  assert_eq!(store.root(), root.as_path());
}

#[tokio::test]
#[serial]
async fn test_put_then_remove() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = LocalImageStore::open(dir.path(), "/uploads/").await.unwrap();

  let stored = store.put("abc.png", &png_image()).await.unwrap();
  assert_eq!(stored.public_path, "/uploads/abc.png");
  assert_eq!(stored.size, PNG_MAGIC.len());
  let path = store.resolve("abc.png").unwrap();
  assert_eq!(std::fs::read(&path).unwrap(), PNG_MAGIC.to_vec());
  // No partial files are left behind.
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);

  store.remove("abc.png").await.unwrap();
  assert!(!path.exists());
  // Removing twice is fine.
  store.remove("abc.png").await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_path_traversal_names_are_refused() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = LocalImageStore::open(dir.path(), "/uploads").await.unwrap();

  for name in ["../escape.png", "a/b.png", "..", ".hidden", ""] {
    let result = store.put(name, &png_image()).await;
    assert!(matches!(result, Err(UploadError::InvalidName(_))), "{:?} accepted", name);
  }
  assert!(store.resolve_public_path("/uploads/../etc/passwd").is_none());
  assert!(store.resolve_public_path("/elsewhere/x.png").is_none());
}

#[tokio::test]
#[serial]
async fn test_failed_put_leaves_no_partial_file() {
  setup_tracing();
  let dir = tempfile::tempdir().unwrap();
  let store = LocalImageStore::open(dir.path(), "/uploads").await.unwrap();
  // A directory in the way makes the final rename fail.
  let blocker = dir.path().join("taken.png");
  std::fs::create_dir(&blocker).unwrap();
  std::fs::write(blocker.join("keep"), b"x").unwrap();

  let result = store.put("taken.png", &png_image()).await;
  assert!(matches!(result, Err(UploadError::Write { .. })));
  assert!(!dir.path().join(".taken.png.part").exists());
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
