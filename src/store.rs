use crate::sync_error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

/// Options attached to an object upload.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Declared content type of the bytes (e.g. `image/jpeg`).
    pub content_type: Option<String>,
    /// Free-form metadata stored alongside the object (owner, album id).
    pub metadata: HashMap<String, String>,
}

impl PutOptions {
    pub fn content_type(mime: impl Into<String>) -> Self {
        PutOptions { content_type: Some(mime.into()), metadata: HashMap::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Client for the external object store holding raw photo bytes.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, returning the key on success.
    async fn put(&self, bucket: &str, key: &str, bytes: Bytes, opts: PutOptions) -> Result<String>;

    /// Resolve a stored object to a URL a browser can display.
    async fn resolve(&self, bucket: &str, key: &str) -> Result<String>;
}
