use std::io::Read as _;
use std::time::Duration;

use crate::assets::decode::{RasterSource, decode_raster};
use crate::foundation::core::Raster;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Default bound on a whole foreground download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest response body accepted for a foreground image.
pub const MAX_FETCH_BYTES: u64 = 64 * 1024 * 1024;

/// Encoded image fetched over HTTP(S).
#[derive(Clone, Debug)]
pub struct ImageUrl {
    pub url: String,
    pub timeout: Duration,
}

impl ImageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl RasterSource for ImageUrl {
    fn describe(&self) -> String {
        format!("image url '{}'", self.url)
    }

    fn load(&self) -> BackdropResult<Raster> {
        let bytes = fetch_bytes(&self.url, self.timeout)?;
        tracing::debug!(url = %self.url, len = bytes.len(), "fetched foreground");
        decode_raster(&bytes).map_err(|e| match e {
            BackdropError::SourceUnavailable(msg) => {
                BackdropError::source_unavailable(format!("'{}': {msg}", self.url))
            }
            other => other,
        })
    }
}

/// GET `url` and return the body; connection, status and size failures are all
/// [`BackdropError::SourceUnavailable`].
pub fn fetch_bytes(url: &str, timeout: Duration) -> BackdropResult<Vec<u8>> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let response = agent
        .get(url)
        .call()
        .map_err(|e| BackdropError::source_unavailable(format!("fetch '{url}': {e}")))?;

    let mut bytes = Vec::new();
    response
        .into_reader()
        .take(MAX_FETCH_BYTES + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| BackdropError::source_unavailable(format!("read body of '{url}': {e}")))?;
    if bytes.len() as u64 > MAX_FETCH_BYTES {
        return Err(BackdropError::source_unavailable(format!(
            "'{url}' is larger than {MAX_FETCH_BYTES} bytes"
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
