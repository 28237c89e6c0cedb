use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Largest accepted image upload, in bytes (4 MiB).
pub const MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// StorageError
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object upload failed: {0}")]
    Upload(String),
}

// 1. StorageService Contract
/// StorageService
///
/// Defines the abstract contract for the object store holding uploaded images.
/// This trait lets us swap the real S3 client (S3StorageClient) for the in-memory
/// mock (MockStorageService) in tests without affecting the upload handler.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Ensures the configured bucket exists. Used in the `Env::Local` setup
    /// to provision the bucket in MinIO.
    async fn ensure_bucket_exists(&self);

    /// Stores `body` under `key` and returns the object's public URL.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;

/// Joins the public base URL and an object key.
fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}

// 2. The Real Implementation (S3/MinIO)
/// S3StorageClient
///
/// Implementation on the AWS SDK for S3. Works against MinIO locally and any
/// S3-compatible store in production. `force_path_style(true)` is required by MinIO.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_base_url: String,
}

impl S3StorageClient {
    /// new
    ///
    /// Builds a path-style client. No request is sent until the first upload.
    pub fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
        public_base_url: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
            public_base_url: public_base_url.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    /// ensure_bucket_exists
    ///
    /// CreateBucket on an existing bucket fails harmlessly; the failure is only logged.
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!("create_bucket {}: {:?}", self.bucket_name, e);
        }
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::Upload(e.to_string()))?;

        Ok(public_url(&self.public_base_url, key))
    }
}

// 3. The Mock Implementation (For Tests)
/// StoredObject
///
/// An object captured by `MockStorageService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub size: usize,
}

/// MockStorageService
///
/// Records every stored object in memory so tests can assert what was (or was not)
/// written. Clones share the same record.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// Makes every `put_object` fail, for error-path tests.
    pub should_fail: bool,
    objects: Arc<Mutex<Vec<StoredObject>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Snapshot of the objects stored so far.
    pub fn stored_objects(&self) -> Vec<StoredObject> {
        self.objects
            .lock()
            .map(|objects| objects.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {
        // No-op in mock environment.
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Upload(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let object = StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: body.len(),
        };
        self.objects
            .lock()
            .map_err(|_| StorageError::Upload("mock store poisoned".to_string()))?
            .push(object);

        Ok(public_url("http://localhost:9000/mock-bucket", key))
    }
}

// --- Upload naming & format checks ---

/// ImageFormat
///
/// The image types accepted by the upload endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Maps a declared MIME type to a supported format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Whether `bytes` starts with this format's file signature.
    pub fn matches_signature(self, bytes: &[u8]) -> bool {
        match self {
            Self::Jpeg => bytes.starts_with(&[0xFF, 0xD8, 0xFF]),
            Self::Png => bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]),
            Self::Webp => {
                bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice())
            }
        }
    }
}

/// sanitize_file_stem
///
/// Turns a user-supplied file name (without extension) into a safe key segment:
/// lower-case, whitespace runs become `-`, anything outside `[a-z0-9.-]` is dropped,
/// dash runs collapse and leading/trailing dashes go. Falls back to `image`.
/// Path separators never survive, so the result cannot traverse directories.
pub fn sanitize_file_stem(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        let mapped = if c.is_whitespace() { '-' } else { c };
        if !(mapped.is_ascii_lowercase() || mapped.is_ascii_digit() || mapped == '.' || mapped == '-') {
            continue;
        }
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }
    let trimmed = out.trim_matches('-').trim_start_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

/// object_key_for
///
/// Builds `images/<millis>-<stem>.<ext>` for an uploaded file. The extension always
/// follows the detected format, never the client's file name.
pub fn object_key_for(original_name: &str, format: ImageFormat, timestamp_millis: i64) -> String {
    let stem = match original_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => original_name,
    };
    format!(
        "images/{}-{}.{}",
        timestamp_millis,
        sanitize_file_stem(stem),
        format.extension()
    )
}
