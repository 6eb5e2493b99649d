//! Resolving and retrieving referenced resources.

use bytes::Bytes;
use url::Url;

use crate::error::{Result, TtmlError};

/// Retrieves the bytes behind an absolute resource location.
///
/// Calls are blocking; the track build waits for each one in turn.
pub trait ResourceFetcher {
    fn fetch(&self, location: &Url) -> Result<Bytes>;
}

impl<F> ResourceFetcher for F
where
    F: Fn(&Url) -> Result<Bytes>,
{
    fn fetch(&self, location: &Url) -> Result<Bytes> {
        self(location)
    }
}

/// Resolve `reference` against a document's base URI.
pub fn resolve_reference(base_uri: Option<&Url>, reference: &str) -> Result<Url> {
    let base = base_uri.ok_or_else(|| TtmlError::ResourceResolution {
        reference: reference.to_string(),
        reason: "document has no base URI".to_string(),
    })?;
    base.join(reference)
        .map_err(|e| TtmlError::ResourceResolution {
            reference: reference.to_string(),
            reason: e.to_string(),
        })
}

/// Reads `file:` URLs from disk, and `http`/`https` URLs when built with the
/// `http` feature.
#[derive(Debug, Default, Clone)]
pub struct DefaultFetcher;

impl DefaultFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl ResourceFetcher for DefaultFetcher {
    fn fetch(&self, location: &Url) -> Result<Bytes> {
        match location.scheme() {
            "file" => fetch_file(location),
            #[cfg(feature = "http")]
            "http" | "https" => fetch_http(location),
            scheme => Err(fetch_error(
                location,
                format!("unsupported scheme '{}'", scheme),
            )),
        }
    }
}

fn fetch_file(location: &Url) -> Result<Bytes> {
    let path = location
        .to_file_path()
        .map_err(|_| fetch_error(location, "not a local file path"))?;
    let data = std::fs::read(&path).map_err(|e| fetch_error(location, e))?;
    tracing::debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(Bytes::from(data))
}

#[cfg(feature = "http")]
fn fetch_http(location: &Url) -> Result<Bytes> {
    let response = reqwest::blocking::get(location.clone())
        .and_then(|r| r.error_for_status())
        .map_err(|e| fetch_error(location, e))?;
    let data = response.bytes().map_err(|e| fetch_error(location, e))?;
    tracing::debug!("Downloaded {} bytes from {}", data.len(), location);
    Ok(data)
}

fn fetch_error(location: &Url, reason: impl ToString) -> TtmlError {
    TtmlError::ResourceFetch {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}
