use std::path::{Path, PathBuf};

use crate::foundation::core::Raster;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Decode any format the `image` crate understands into a straight RGBA8 raster.
pub fn decode_raster(bytes: &[u8]) -> BackdropResult<Raster> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| BackdropError::source_unavailable(format!("decode image from memory: {e}")))?;
    Raster::from_rgba_image(dyn_img.to_rgba8())
}

/// Read and decode an image file.
pub fn load_raster(path: &Path) -> BackdropResult<Raster> {
    let bytes = std::fs::read(path).map_err(|e| {
        BackdropError::source_unavailable(format!("read image '{}': {e}", path.display()))
    })?;
    decode_raster(&bytes).map_err(|e| match e {
        BackdropError::SourceUnavailable(msg) => {
            BackdropError::source_unavailable(format!("'{}': {msg}", path.display()))
        }
        other => other,
    })
}

/// Anything that can hand the pipeline a decoded foreground.
///
/// Every failure to produce pixels must come back as [`BackdropError::SourceUnavailable`].
pub trait RasterSource {
    /// Short human-readable description used in logs.
    fn describe(&self) -> String;

    fn load(&self) -> BackdropResult<Raster>;
}

/// Image file on disk.
#[derive(Clone, Debug)]
pub struct ImageFile(pub PathBuf);

impl RasterSource for ImageFile {
    fn describe(&self) -> String {
        format!("image file '{}'", self.0.display())
    }

    fn load(&self) -> BackdropResult<Raster> {
        load_raster(&self.0)
    }
}

/// Encoded image bytes already in memory (e.g. an uploaded blob).
#[derive(Clone, Debug)]
pub struct ImageBytes(pub Vec<u8>);

impl RasterSource for ImageBytes {
    fn describe(&self) -> String {
        format!("{} encoded bytes", self.0.len())
    }

    fn load(&self) -> BackdropResult<Raster> {
        decode_raster(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
