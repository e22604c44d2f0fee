//! gsu-core: Core library for the gsupload object-storage uploader
//!
//! This crate provides the SDK-independent parts of gsupload:
//! - Storage configuration and credentials files
//! - The object naming convention and directory walker
//! - Expiration metadata
//! - The ObjectStore trait and the Uploader operations built on it
//!
//! Only the gsu-s3 crate talks to the storage service.

pub mod config;
pub mod error;
pub mod expiration;
pub mod naming;
pub mod traits;
pub mod uploader;
pub mod walk;

pub use config::{ConnectionSettings, Credentials, StorageConfig};
pub use error::{Error, PartialFailure, Result};
pub use expiration::EXPIRATION_KEY;
pub use traits::{ListPage, ObjectMetadata, ObjectStore};
pub use uploader::{DirectoryFailure, ListFailure, UploadFailure, UploadResult, Uploader};
pub use walk::{DirectoryWalk, WalkEntry};
