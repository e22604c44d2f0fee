//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from gsu-core.
//! Google Cloud Storage is reached through its XML interoperability API,
//! which speaks the S3 protocol with HMAC keys.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::{RequestChecksumCalculation, ResponseChecksumValidation};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::MetadataDirective;

use gsu_core::naming::encoded_object_path;
use gsu_core::{ConnectionSettings, Error, ListPage, ObjectMetadata, ObjectStore, Result};

/// Error codes the service uses for missing keys or buckets
const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NotFound", "NoSuchBucket"];

/// Error codes for rejected credentials or missing permissions
const AUTH_CODES: &[&str] = &[
    "AccessDenied",
    "InvalidAccessKeyId",
    "SignatureDoesNotMatch",
    "ExpiredToken",
    "InvalidToken",
    "Forbidden",
];

/// Object generation header sent by the GCS XML API; not part of the S3 model
const GENERATION_HEADER: &str = "x-goog-generation";

/// S3 client wrapper bound to one bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client from resolved connection settings
    ///
    /// Without explicit credentials the SDK's default chain is used
    /// (environment variables, shared profile files, instance metadata).
    /// Retries are disabled: a failed request fails the operation.
    pub async fn new(settings: &ConnectionSettings) -> Result<Self> {
        let endpoint = settings.endpoint.as_str().trim_end_matches('/');

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(settings.region.clone()))
            .endpoint_url(endpoint)
            .retry_config(aws_config::retry::RetryConfig::disabled());

        match &settings.credentials {
            Some(creds) => {
                tracing::debug!(access_key = %creds.access_key, "using credentials file");
                let credentials = aws_credential_types::Credentials::new(
                    creds.access_key.clone(),
                    creds.secret_key.clone(),
                    creds.session_token.clone(),
                    None, // expiry
                    "gsupload-credentials-file",
                );
                loader = loader.credentials_provider(credentials);
            }
            None => tracing::debug!("using ambient credentials"),
        }

        let config = loader.load().await;

        // The interoperability API rejects the SDK's default streaming
        // checksums, so only send them when an operation requires one.
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .build();

        tracing::debug!(%endpoint, bucket = %settings.bucket, region = %settings.region, "client ready");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
        })
    }

    /// Bucket all requests are sent to
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn target(&self, name: &str) -> String {
        format!("{}/{}", self.bucket, name)
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_file(&self, name: &str, path: &Path, content_type: &str) -> Result<()> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))?;

        self.inner
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(name)))?;

        Ok(())
    }

    async fn list_page(
        &self,
        prefix: Option<String>,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(prefix)
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.bucket))?;

        let names = response
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();

        let continuation_token = if response.is_truncated().unwrap_or(false) {
            response.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage {
            names,
            continuation_token,
        })
    }

    async fn head_object(&self, name: &str) -> Result<ObjectMetadata> {
        let goog_generation: Arc<Mutex<Option<String>>> = Arc::default();
        let sink = Arc::clone(&goog_generation);
        let response = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .customize()
            .mutate_response(move |raw: &mut HttpResponse| {
                if let Ok(mut slot) = sink.lock() {
                    *slot = raw.headers().get(GENERATION_HEADER).map(str::to_string);
                }
            })
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(name)))?;

        let generation = goog_generation
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
            .or_else(|| response.version_id().map(str::to_string));

        let metadata: BTreeMap<String, String> = response
            .metadata()
            .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        Ok(ObjectMetadata {
            name: name.to_string(),
            bucket: self.bucket.clone(),
            size: response.content_length().unwrap_or(0).max(0) as u64,
            content_type: response.content_type().map(str::to_string),
            created: generation.as_deref().and_then(generation_timestamp),
            updated: response.last_modified().and_then(to_timestamp),
            generation,
            etag: response.e_tag().map(|e| e.trim_matches('"').to_string()),
            storage_class: response.storage_class().map(|sc| sc.as_str().to_string()),
            metadata,
        })
    }

    async fn delete_object(&self, name: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(name)))?;

        Ok(())
    }

    async fn merge_metadata(&self, name: &str, entries: BTreeMap<String, String>) -> Result<()> {
        // Metadata is immutable in S3; rewrite the object onto itself
        let current = self
            .inner
            .head_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(name)))?;

        let mut metadata: HashMap<String, String> = current.metadata().cloned().unwrap_or_default();
        metadata.extend(entries);

        self.inner
            .copy_object()
            .bucket(&self.bucket)
            .key(name)
            .copy_source(encoded_object_path(&self.bucket, name))
            .metadata_directive(MetadataDirective::Replace)
            .set_metadata(Some(metadata))
            .set_content_type(current.content_type().map(str::to_string))
            .set_cache_control(current.cache_control().map(str::to_string))
            .set_content_disposition(current.content_disposition().map(str::to_string))
            .set_content_encoding(current.content_encoding().map(str::to_string))
            .set_content_language(current.content_language().map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &self.target(name)))?;

        tracing::debug!(object = name, "metadata replaced");
        Ok(())
    }
}

fn to_timestamp(dt: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(dt.secs(), dt.subsec_nanos() as i32).ok()
}

/// Creation time of a GCS object generation
///
/// GCS generations are microseconds since the epoch at the time the
/// generation was written. S3 version ids are opaque and yield `None`.
fn generation_timestamp(generation: &str) -> Option<jiff::Timestamp> {
    let micros: i64 = generation.trim().parse().ok()?;
    if micros <= 0 {
        return None;
    }
    jiff::Timestamp::from_microsecond(micros).ok()
}

/// Map an SDK failure onto the gsu-core error taxonomy
fn map_sdk_error<E>(err: SdkError<E, HttpResponse>, target: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();
    tracing::debug!(?status, ?code, %target, "request failed");

    let code = code.as_deref();
    if code.is_some_and(|c| NOT_FOUND_CODES.contains(&c)) || status == Some(404) {
        Error::NotFound(target.to_string())
    } else if code.is_some_and(|c| AUTH_CODES.contains(&c)) || matches!(status, Some(401 | 403)) {
        Error::Auth(format!("{target}: {message}"))
    } else {
        Error::Network(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsu_core::StorageConfig;

    #[test]
    fn test_to_timestamp() {
        let dt = aws_smithy_types::DateTime::from_secs(1_700_000_000);
        let ts = to_timestamp(&dt).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
    }

    #[test]
    fn test_generation_timestamp() {
        let ts = generation_timestamp("1700000000123456").unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_microsecond(), 123_456);

        assert!(generation_timestamp("3HL4kqtJlcpXroDTDmJ.rmSpXd3dIbrHY").is_none());
        assert!(generation_timestamp("0").is_none());
        assert!(generation_timestamp("").is_none());
    }

    #[tokio::test]
    async fn test_new_with_credentials_file_settings() {
        let mut settings = StorageConfig::new("my-bucket")
            .endpoint("http://localhost:9000")
            .region("us-east-1")
            .resolve()
            .unwrap();
        settings.credentials = Some(gsu_core::Credentials {
            access_key: "AK".into(),
            secret_key: "SK".into(),
            session_token: None,
            endpoint: None,
            region: None,
        });

        let client = S3Client::new(&settings).await.unwrap();
        assert_eq!(client.bucket(), "my-bucket");
        assert_eq!(client.target("a/b.txt"), "my-bucket/a/b.txt");
    }
}
