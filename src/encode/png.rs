use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Raster;
use crate::foundation::error::BackdropResult;

/// Content type callers attach to encoded output.
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Transport-ready encoded image.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Encode a raster as PNG in memory.
pub fn encode_png(raster: &Raster) -> BackdropResult<EncodedImage> {
    let mut bytes = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut bytes),
        raster.data(),
        raster.width(),
        raster.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(EncodedImage {
        bytes,
        content_type: PNG_CONTENT_TYPE,
    })
}

/// Write a raster to `path` as PNG, creating missing parent directories.
pub fn write_png(raster: &Raster, path: &Path) -> BackdropResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        raster.data(),
        raster.width(),
        raster.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> BackdropResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
