//! Where compressed menu photos end up.
//!
//! A stored photo is addressed by a URI of the form `<scheme>://<name>`.
//! The backend maps that URI to a location it controls and to the URL the
//! public menu viewer loads the photo from.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

/// Backend that stores uploaded photos.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Store `data` under `uri`, replacing any previous photo there.
    async fn put(&self, uri: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// URL a browser loads the photo at `uri` from.
    fn public_url(&self, uri: &str) -> String;

    /// URI scheme handled by this backend, e.g. `local` or `s3`.
    fn scheme(&self) -> &'static str;

    /// A fresh URI for a photo with `extension`.
    fn generate_uri(&self, extension: &str) -> String {
        format!(
            "{}://{}.{}",
            self.scheme(),
            Uuid::now_v7().simple(),
            extension.trim_start_matches('.')
        )
    }
}

/// Photos kept in a directory that the server also serves statically.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    /// URL prefix the directory is mounted at, e.g. `/files`.
    mount: String,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>, mount: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            mount: mount.into(),
        }
    }

    /// Filesystem path for a `local://` URI.
    ///
    /// Only plain relative names are accepted, so a URI can never point
    /// outside the upload directory.
    fn path_for(&self, uri: &str) -> Result<PathBuf> {
        let name = uri
            .strip_prefix("local://")
            .with_context(|| format!("not a local storage URI: {uri}"))?;
        let escapes = Path::new(name)
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if name.is_empty() || escapes {
            anyhow::bail!("storage URI leaves the upload directory: {uri}");
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn put(&self, uri: &str, data: &[u8], _content_type: &str) -> Result<()> {
        let path = self.path_for(uri)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        // Written beside the target and renamed into place, so the static
        // file server never hands out a half-written photo.
        let partial = path.with_extension("part");
        fs::write(&partial, data)
            .await
            .with_context(|| format!("failed to write {}", partial.display()))?;
        fs::rename(&partial, &path)
            .await
            .with_context(|| format!("failed to move photo into {}", path.display()))?;

        debug!(uri = %uri, size = data.len(), "photo stored locally");
        Ok(())
    }

    fn public_url(&self, uri: &str) -> String {
        let name = uri.strip_prefix("local://").unwrap_or(uri);
        format!("{}/{name}", self.mount.trim_end_matches('/'))
    }

    fn scheme(&self) -> &'static str {
        "local"
    }
}

/// Photos kept in an S3-compatible bucket.
#[cfg(feature = "s3")]
pub struct S3FileStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: Option<String>,
    /// Origin the bucket is publicly reachable at (bucket URL or CDN).
    public_base: String,
}

#[cfg(feature = "s3")]
impl S3FileStorage {
    /// Connect with the default AWS credential chain.
    ///
    /// `endpoint` overrides the S3 endpoint for MinIO and similar services.
    pub async fn connect(
        bucket: impl Into<String>,
        prefix: Option<String>,
        public_base: impl Into<String>,
        endpoint: Option<&str>,
    ) -> Self {
        let mut loader = aws_config::from_env();
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let config = loader.load().await;

        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
            prefix: prefix.map(|p| p.trim_matches('/').to_string()),
            public_base: public_base.into(),
        }
    }

    /// Object key for a photo name, under the configured prefix.
    fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}/{name}"),
            _ => name.to_string(),
        }
    }
}

#[cfg(feature = "s3")]
#[async_trait]
impl FileStorage for S3FileStorage {
    async fn put(&self, uri: &str, data: &[u8], content_type: &str) -> Result<()> {
        let name = uri
            .strip_prefix("s3://")
            .with_context(|| format!("not an S3 storage URI: {uri}"))?;
        let key = self.key(name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(aws_sdk_s3::primitives::ByteStream::from(data.to_vec()))
            .send()
            .await
            .with_context(|| format!("failed to upload {key} to bucket {}", self.bucket))?;

        debug!(uri = %uri, key = %key, size = data.len(), "photo stored in S3");
        Ok(())
    }

    fn public_url(&self, uri: &str) -> String {
        let name = uri.strip_prefix("s3://").unwrap_or(uri);
        format!("{}/{}", self.public_base.trim_end_matches('/'), self.key(name))
    }

    fn scheme(&self) -> &'static str {
        "s3"
    }
}

#[cfg(feature = "s3")]
impl std::fmt::Debug for S3FileStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3FileStorage")
            .field("bucket", &self.bucket)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
