//! ObjectStore trait definition
//!
//! This trait defines the storage operations the uploader needs.
//! It allows the CLI to be decoupled from the specific S3 SDK implementation.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expiration::EXPIRATION_KEY;

/// Attributes of a stored object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object name
    pub name: String,

    /// Bucket holding the object
    pub bucket: String,

    /// Size in bytes
    pub size: u64,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Creation time, when the service reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<Timestamp>,

    /// Last update time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<Timestamp>,

    /// Object generation (version id)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,

    /// ETag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Custom metadata
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Raw expiration marker, if the object carries one
    pub fn expiration(&self) -> Option<&str> {
        self.metadata.get(EXPIRATION_KEY).map(String::as_str)
    }

    /// Human-readable size
    pub fn size_human(&self) -> String {
        humansize::format_size(self.size, humansize::BINARY)
    }
}

/// One page of a listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Object names on this page
    pub names: Vec<String>,

    /// Token for the next page; `None` on the last page
    pub continuation_token: Option<String>,
}

/// Trait for object storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stream a local file into `name`
    async fn put_file(&self, name: &str, path: &Path, content_type: &str) -> Result<()>;

    /// Fetch one page of object names under `prefix`
    async fn list_page(
        &self,
        prefix: Option<String>,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Get object attributes, including custom metadata
    async fn head_object(&self, name: &str) -> Result<ObjectMetadata>;

    /// Delete an object
    async fn delete_object(&self, name: &str) -> Result<()>;

    /// Set custom metadata entries, keeping existing entries not in `entries`
    async fn merge_metadata(&self, name: &str, entries: BTreeMap<String, String>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_lookup() {
        let mut meta = ObjectMetadata {
            name: "a.txt".into(),
            ..Default::default()
        };
        assert!(meta.expiration().is_none());

        meta.metadata
            .insert(EXPIRATION_KEY.into(), "2030-01-01T00:00:00Z".into());
        assert_eq!(meta.expiration(), Some("2030-01-01T00:00:00Z"));
    }

    #[test]
    fn test_size_human() {
        let meta = ObjectMetadata {
            size: 2048,
            ..Default::default()
        };
        assert_eq!(meta.size_human(), "2 KiB");
    }
}
