//! Fetching of externally referenced resources (images).
//!
//! Fetching is best-effort: the embedder logs failures and treats them as a
//! missing image.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Source of bytes for a resource reference such as an `img` `src`.
pub trait Fetcher: Send + Sync {
    /// Fetch the bytes behind `reference`.
    fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Fetcher that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetch;

impl Fetcher for NoFetch {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        Err(Error::Fetch(format!("fetching disabled: {}", reference)))
    }
}

/// Fetcher that reads local files, relative to a base directory.
///
/// Accepts plain paths and `file://` URLs. Other URL schemes are rejected.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher resolving relative references against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Resolve a reference to a filesystem path.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        let path = match reference.strip_prefix("file://") {
            Some(rest) => rest,
            None if has_scheme(reference) => return None,
            None => reference,
        };
        let decoded = urlencoding::decode(path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| path.to_string());
        let path = Path::new(&decoded);
        Some(if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        })
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self
            .resolve(reference)
            .ok_or_else(|| Error::Fetch(format!("not a local reference: {}", reference)))?;
        Ok(std::fs::read(path)?)
    }
}

/// Fetcher for `http://` and `https://` references.
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpFetcher {
    /// Create a fetcher with a 30 second request timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(std::time::Duration::from_secs(30))
    }

    /// Create a fetcher with a custom request timeout.
    pub fn with_timeout(timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("html2rtf/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl Fetcher for HttpFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        if !is_http(reference) {
            return Err(Error::Fetch(format!("not an http reference: {}", reference)));
        }
        let response = self.client.get(reference).send()?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    }
}

/// Fetcher dispatching on the reference: HTTP URLs go over the network (with
/// the `http` feature), everything else is read from disk when a base
/// directory is configured.
///
/// The HTTP client is created on first use.
#[derive(Debug, Clone, Default)]
pub struct DefaultFetcher {
    files: Option<FileFetcher>,
    #[cfg(feature = "http")]
    http: once_cell::sync::OnceCell<Option<HttpFetcher>>,
}

impl DefaultFetcher {
    /// Create a fetcher for remote references only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also resolve local references relative to `base_dir`.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.files = Some(FileFetcher::new(base_dir));
        self
    }
}

impl Fetcher for DefaultFetcher {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        if is_http(reference) {
            #[cfg(feature = "http")]
            {
                let http = self.http.get_or_init(|| {
                    HttpFetcher::new()
                        .map_err(|e| log::warn!("HTTP fetching unavailable: {}", e))
                        .ok()
                });
                if let Some(http) = http {
                    return http.fetch(reference);
                }
            }
            return Err(Error::Fetch(format!("no HTTP support for {}", reference)));
        }
        match &self.files {
            Some(files) => files.fetch(reference),
            None => Err(Error::Fetch(format!("no base directory for {}", reference))),
        }
    }
}

fn is_http(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn has_scheme(reference: &str) -> bool {
    match reference.split_once(':') {
        // A single letter before the colon is a Windows drive, not a scheme.
        Some((scheme, _)) => {
            scheme.len() > 1
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
