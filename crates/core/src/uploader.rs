//! Uploader
//!
//! The six storage operations of the tool, built on any `ObjectStore`:
//! single-file upload, directory upload, list, delete, metadata lookup and
//! expiration tagging. Everything runs one request at a time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::Serialize;
use url::Url;

use crate::config::ConnectionSettings;
use crate::error::{Error, PartialFailure, Result};
use crate::expiration::{EXPIRATION_KEY, expiration_after, format_expiration, validate_days};
use crate::naming::{normalize_object_name, public_url};
use crate::traits::{ObjectMetadata, ObjectStore};
use crate::walk::DirectoryWalk;

/// Content type used when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Outcome of one successful file upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResult {
    /// Local file that was uploaded
    pub local_path: PathBuf,

    /// Remote object name
    pub object_name: String,

    /// Public URL of the object (not checked for accessibility)
    pub url: String,

    /// Size in bytes
    pub size: u64,

    /// Detected content type
    pub mime_type: String,

    /// Expiration marker written to the object, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<Timestamp>,
}

/// Failure of a single-file upload; `partial` is set when the object was
/// uploaded but its expiration could not be written
pub type UploadFailure = PartialFailure<Option<UploadResult>>;

/// Failure of a directory upload; `partial` holds the files already uploaded
pub type DirectoryFailure = PartialFailure<Vec<UploadResult>>;

/// Failure of a listing; `partial` holds the names fetched before the error
pub type ListFailure = PartialFailure<Vec<String>>;

/// Storage operations over an `ObjectStore`
pub struct Uploader<S> {
    store: S,
    bucket: String,
    public_base: Url,
}

impl<S: ObjectStore> Uploader<S> {
    pub fn new(store: S, bucket: impl Into<String>, public_base: Url) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            public_base,
        }
    }

    /// Build from resolved connection settings
    pub fn from_settings(store: S, settings: &ConnectionSettings) -> Self {
        Self::new(store, settings.bucket.clone(), settings.public_base.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Upload one file
    ///
    /// An empty `object_name` falls back to the file name. With
    /// `expiration_days > 0` the expiration marker is written after the upload.
    pub async fn upload_file(
        &self,
        path: &Path,
        object_name: &str,
        expiration_days: u32,
    ) -> std::result::Result<UploadResult, UploadFailure> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            Error::InvalidPath(format!("Cannot access file {}: {e}", path.display()))
        })?;
        if metadata.is_dir() {
            return Err(Error::InvalidPath(format!(
                "{} is a directory, use the 'dir' command to upload a directory",
                path.display()
            ))
            .into());
        }

        let object_name = if object_name.is_empty() {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            normalize_object_name(object_name).to_string()
        };
        if object_name.is_empty() {
            return Err(Error::InvalidPath(format!(
                "Cannot derive an object name from {}",
                path.display()
            ))
            .into());
        }

        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let url = public_url(&self.public_base, &self.bucket, &object_name)?;
        if expiration_days > 0 {
            // Out-of-range day counts fail before anything is sent
            expiration_after(Timestamp::now(), expiration_days)?;
        }

        tracing::debug!(file = %path.display(), object = %object_name, %mime_type, "uploading");
        self.store.put_file(&object_name, path, &mime_type).await?;

        let mut result = UploadResult {
            local_path: path.to_path_buf(),
            object_name,
            url,
            size: metadata.len(),
            mime_type,
            expiration: None,
        };

        if expiration_days > 0 {
            // Counted from the end of the transfer
            let at = match expiration_after(Timestamp::now(), expiration_days) {
                Ok(at) => at,
                Err(e) => return Err(PartialFailure::new(Some(result), e)),
            };
            result.expiration = Some(at);
            let entries = BTreeMap::from([(EXPIRATION_KEY.to_string(), format_expiration(at))]);
            if let Err(e) = self.store.merge_metadata(&result.object_name, entries).await {
                tracing::warn!(object = %result.object_name, error = %e, "uploaded but expiration not set");
                return Err(PartialFailure::new(Some(result), e));
            }
        }

        tracing::info!(object = %result.object_name, size = result.size, "uploaded");
        Ok(result)
    }

    /// Upload every file under `dir`, one at a time, in walk order
    ///
    /// Objects are named `prefix/<dir name>/<relative path>`. The first walk
    /// or upload error stops the upload; files uploaded before it stay.
    /// `on_uploaded` is called after each file.
    pub async fn upload_directory<F>(
        &self,
        dir: &Path,
        prefix: Option<&str>,
        expiration_days: u32,
        mut on_uploaded: F,
    ) -> std::result::Result<Vec<UploadResult>, DirectoryFailure>
    where
        F: FnMut(&UploadResult),
    {
        let walk = DirectoryWalk::new(dir, prefix)?;
        let mut results = Vec::new();

        for entry in walk {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Err(PartialFailure::new(results, e)),
            };

            match self
                .upload_file(&entry.path, &entry.object_name, expiration_days)
                .await
            {
                Ok(result) => {
                    on_uploaded(&result);
                    results.push(result);
                }
                Err(failure) => {
                    if let Some(result) = failure.partial {
                        on_uploaded(&result);
                        results.push(result);
                    }
                    return Err(PartialFailure::new(results, failure.error));
                }
            }
        }

        Ok(results)
    }

    /// List object names, following continuation tokens to the end
    pub async fn list_objects(
        &self,
        prefix: Option<&str>,
    ) -> std::result::Result<Vec<String>, ListFailure> {
        let prefix = prefix.filter(|p| !p.is_empty()).map(str::to_string);
        let mut names = Vec::new();
        let mut continuation_token = None;

        loop {
            let page = match self
                .store
                .list_page(prefix.clone(), continuation_token.take())
                .await
            {
                Ok(page) => page,
                Err(e) => return Err(PartialFailure::new(names, e)),
            };

            names.extend(page.names);
            match page.continuation_token {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }

        Ok(names)
    }

    /// Delete one object; missing objects surface as `Error::NotFound`
    pub async fn delete_object(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidInput("Object name cannot be empty".into()));
        }
        self.store.delete_object(name).await?;
        tracing::info!(object = name, "deleted");
        Ok(())
    }

    /// Fetch all attributes of one object
    pub async fn object_metadata(&self, name: &str) -> Result<ObjectMetadata> {
        if name.is_empty() {
            return Err(Error::InvalidInput("Object name cannot be empty".into()));
        }
        self.store.head_object(name).await
    }

    /// Tag an existing object to expire `days` days from now
    ///
    /// Non-positive day counts are rejected before the store is contacted.
    pub async fn set_expiration(&self, name: &str, days: i64) -> Result<Timestamp> {
        let days = validate_days(days)?;
        if name.is_empty() {
            return Err(Error::InvalidInput("Object name cannot be empty".into()));
        }

        let at = expiration_after(Timestamp::now(), days)?;
        let entries = BTreeMap::from([(EXPIRATION_KEY.to_string(), format_expiration(at))]);
        self.store.merge_metadata(name, entries).await?;
        tracing::info!(object = name, expiration = %at, "expiration set");
        Ok(at)
    }
}
