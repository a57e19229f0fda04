//! Product image storage.

use async_trait::async_trait;
use axum::body::Bytes;
use core_config::{ConfigError, FromEnv, env_or_default};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{CatalogError, CatalogResult};

/// URL path under which stored images are served
pub const UPLOADS_ROUTE: &str = "/uploads/products";

/// Persists uploaded images and returns their public URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, original_name: &str, bytes: Bytes) -> CatalogResult<String>;
}

/// Where images are written and how they are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Origin prepended to [`UPLOADS_ROUTE`], without a trailing slash
    pub public_url: String,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>, public_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url_for(&self, stored_name: &str) -> String {
        format!("{}{}/{}", self.public_url, UPLOADS_ROUTE, stored_name)
    }
}

impl FromEnv for UploadConfig {
    /// - UPLOAD_DIR: defaults to public/uploads/products
    /// - PUBLIC_URL: defaults to http://localhost:8080
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            env_or_default("UPLOAD_DIR", "public/uploads/products"),
            env_or_default("PUBLIC_URL", "http://localhost:8080"),
        ))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self::new("public/uploads/products", "http://localhost:8080")
    }
}

/// `<unix_secs>_<file name>`, keeping only the last path component of the
/// client-supplied name.
pub fn stored_file_name(original_name: &str, unix_secs: u64) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or("image");
    format!("{}_{}", unix_secs, base)
}

/// Writes images into a local directory.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    config: UploadConfig,
}

impl LocalImageStore {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, original_name: &str, bytes: Bytes) -> CatalogResult<String> {
        let unix_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CatalogError::Storage(e.to_string()))?
            .as_secs();
        let name = stored_file_name(original_name, unix_secs);

        tokio::fs::create_dir_all(&self.config.dir).await?;
        tokio::fs::write(self.config.dir.join(&name), &bytes).await?;

        tracing::info!(file = %name, size = bytes.len(), "Stored product image");
        Ok(self.config.url_for(&name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_file_name_strips_directories() {
        assert_eq!(stored_file_name("lamp.png", 10), "10_lamp.png");
        assert_eq!(stored_file_name("../../etc/passwd", 10), "10_passwd");
        assert_eq!(stored_file_name("C:\\Users\\me\\cat.gif", 10), "10_cat.gif");
        assert_eq!(stored_file_name("dir/", 10), "10_image");
        assert_eq!(stored_file_name("..", 10), "10_image");
    }

    #[test]
    fn test_url_joins_public_origin() {
        let config = UploadConfig::new("/tmp/x", "https://shop.example.com/");
        assert_eq!(
            config.url_for("1_a.png"),
            "https://shop.example.com/uploads/products/1_a.png"
        );
    }

    #[test]
    fn test_upload_config_from_env() {
        temp_env::with_vars(
            [("UPLOAD_DIR", None::<&str>), ("PUBLIC_URL", None::<&str>)],
            || assert_eq!(UploadConfig::from_env().unwrap(), UploadConfig::default()),
        );

        temp_env::with_vars(
            [
                ("UPLOAD_DIR", Some("/srv/images")),
                ("PUBLIC_URL", Some("https://cdn.example.com")),
            ],
            || {
                let config = UploadConfig::from_env().unwrap();
                assert_eq!(config.dir, PathBuf::from("/srv/images"));
                assert_eq!(config.public_url, "https://cdn.example.com");
            },
        );
    }

    #[tokio::test]
    async fn test_local_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(UploadConfig::new(
            dir.path().join("nested"),
            "http://localhost:8080",
        ));

        let url = store
            .store("lamp.png", Bytes::from_static(b"PNGDATA"))
            .await
            .unwrap();

        let name = url.rsplit('/').next().unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/products/"));
        assert!(name.ends_with("_lamp.png"));
        let written = std::fs::read(store.dir().join(name)).unwrap();
        assert_eq!(written, b"PNGDATA");
    }
}
