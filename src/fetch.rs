//! Source-image acquisition.
//!
//! The pipeline never performs network I/O itself; it asks an
//! [`ImageFetcher`] for the original image. Any transport or decode
//! failure surfaces as [`SegsieveError::Fetch`] and aborts the run before
//! anything is persisted or a run id is consumed.

use std::fs;
use std::path::Path;
use std::time::Duration;

use image::RgbaImage;

use crate::error::SegsieveError;

/// A fetched source image: the raw encoded bytes plus the decoded pixels.
#[derive(Clone, Debug)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    pub image: RgbaImage,
}

/// Supplies the original raw image and its decoded form for a source.
pub trait ImageFetcher {
    fn fetch(&self, source: &str) -> Result<FetchedImage, SegsieveError>;
}

/// Decodes fetched bytes, attributing failures to the source.
fn decode_fetched(bytes: Vec<u8>, source: &str) -> Result<FetchedImage, SegsieveError> {
    let image = image::load_from_memory(&bytes)
        .map_err(|err| SegsieveError::Fetch {
            source_name: source.to_string(),
            message: format!("decode failed: {err}"),
        })?
        .into_rgba8();
    Ok(FetchedImage { bytes, image })
}

/// Fetches images over HTTP(S) with a bounded-timeout agent.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Creates a fetcher with the given global timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, source: &str) -> Result<FetchedImage, SegsieveError> {
        let mut response =
            self.agent
                .get(source)
                .call()
                .map_err(|err| SegsieveError::Fetch {
                    source_name: source.to_string(),
                    message: err.to_string(),
                })?;

        let bytes = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| SegsieveError::Fetch {
                source_name: source.to_string(),
                message: err.to_string(),
            })?;

        decode_fetched(bytes, source)
    }
}

/// Fetches images from the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileFetcher;

impl ImageFetcher for FileFetcher {
    fn fetch(&self, source: &str) -> Result<FetchedImage, SegsieveError> {
        let bytes = fs::read(Path::new(source)).map_err(|err| SegsieveError::Fetch {
            source_name: source.to_string(),
            message: err.to_string(),
        })?;
        decode_fetched(bytes, source)
    }
}

/// Returns true if `source` should be fetched over HTTP.
pub fn is_remote_source(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}
