//! Content Loader
//!
//! Path-traversal guard plus a pass-through file read. Backs both the
//! `/api/content` endpoint and the navigator's in-process loads.
//!
//! No caching, no streaming: every call reads the whole file again.

use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Content loading failures
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// `path` absent, empty, or containing a parent-directory segment
    #[error("Invalid path")]
    InvalidPath,

    /// Resolved file could not be read (missing, directory, permissions)
    #[error("File not found")]
    NotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Anything the navigator can fetch section text from
pub trait ContentSource: Send + Sync + 'static {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ContentError>> + Send;
}

/// Reads text files below a fixed root directory
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
}

impl ContentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate a request path and join it onto the root
    ///
    /// Any occurrence of `..` is rejected, not only whole segments, so
    /// `notes..md` fails too. Leading separators are stripped so `/a.md`
    /// stays under the root; a bare `/` resolves to the root itself, which
    /// then fails to read as a directory. Drive or UNC prefixes that would
    /// still replace the root on join are rejected.
    pub fn resolve(&self, path: &str) -> Result<PathBuf, ContentError> {
        if path.is_empty() || path.contains("..") {
            return Err(ContentError::InvalidPath);
        }

        let relative = Path::new(path.trim_start_matches(&['/', '\\'][..]));
        let escapes_root = relative
            .components()
            .any(|c| matches!(c, Component::Prefix(_) | Component::RootDir));
        if escapes_root {
            return Err(ContentError::InvalidPath);
        }

        Ok(self.root.join(relative))
    }

    /// Read the file at `path` and return its text unmodified
    pub async fn load(&self, path: &str) -> Result<String, ContentError> {
        let resolved = match self.resolve(path) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Rejected content path {:?}", path);
                return Err(e);
            }
        };

        let bytes = tokio::fs::read(&resolved).await.map_err(|source| {
            tracing::warn!("Failed to read {}: {}", resolved.display(), source);
            ContentError::NotFound {
                path: path.to_string(),
                source,
            }
        })?;

        tracing::debug!("Loaded {} ({} bytes)", resolved.display(), bytes.len());

        // Lossy decode keeps odd bytes visible instead of failing the slide
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

impl ContentSource for ContentLoader {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ContentError>> + Send {
        self.load(path)
    }
}

impl<T: ContentSource> ContentSource for Arc<T> {
    fn fetch(&self, path: &str) -> impl Future<Output = Result<String, ContentError>> + Send {
        T::fetch(self, path)
    }
}
