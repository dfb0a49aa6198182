use crate::foundation::error::{BackdropError, BackdropResult};

/// Alpha a pixel must exceed to count as visible content.
pub const VISIBILITY_THRESHOLD: u8 = 10;

/// Channel value each of r, g and b must exceed for a pixel to be keyed out as near-white.
pub const CHROMA_KEY_THRESHOLD: u8 = 240;

/// Minimum pre-existing alpha required by the strict chroma-key variant.
pub const STRICT_KEY_MIN_ALPHA: u8 = 200;

/// Straight (non-premultiplied) RGBA8 pixel.
pub type Rgba8 = [u8; 4];

/// Decoded RGBA8 bitmap, tightly packed, row-major, top-to-bottom.
///
/// Construction guarantees a non-zero area and `data.len() == width * height * 4`, so every
/// stage downstream can index rows without re-checking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Wrap an existing RGBA8 buffer.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> BackdropResult<Self> {
        let expected = expected_len(width, height)?;
        if data.len() != expected {
            return Err(BackdropError::invalid_dimensions(format!(
                "{width}x{height} raster expects {expected} bytes, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Allocate a fully transparent raster.
    pub fn transparent(width: u32, height: u32) -> BackdropResult<Self> {
        let len = expected_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Allocate a raster filled with a single pixel value.
    pub fn filled(width: u32, height: u32, px: Rgba8) -> BackdropResult<Self> {
        let len = expected_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: px.repeat(len / 4),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * 4
    }

    /// Borrow row `y`. Panics when `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &self.data[start..start + stride]
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    pub fn from_rgba_image(img: image::RgbaImage) -> BackdropResult<Self> {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    pub fn into_rgba_image(self) -> BackdropResult<image::RgbaImage> {
        let (width, height) = self.dimensions();
        image::RgbaImage::from_raw(width, height, self.data).ok_or_else(|| {
            BackdropError::invalid_dimensions(format!("{width}x{height} buffer rejected by image"))
        })
    }
}

/// Byte length of a `width x height` RGBA8 buffer, rejecting zero area and overflow.
pub fn expected_len(width: u32, height: u32) -> BackdropResult<usize> {
    if width == 0 || height == 0 {
        return Err(BackdropError::invalid_dimensions(format!(
            "zero-area raster {width}x{height}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| BackdropError::invalid_dimensions("raster buffer size overflow"))
}

/// Vertical extent of visible content, as inclusive row indices.
///
/// When nothing is visible the detector reports `top = height, bottom = 0`, an inverted range;
/// [`ContentBounds::is_empty`] is the only supported way to test for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ContentBounds {
    pub top: u32,
    pub bottom: u32,
}

impl ContentBounds {
    /// Sentinel for a raster of `height` rows with no visible pixel.
    pub fn empty(height: u32) -> Self {
        Self {
            top: height,
            bottom: 0,
        }
    }

    pub fn is_empty(self) -> bool {
        self.top > self.bottom
    }

    /// Fail with [`BackdropError::NoVisibleContent`] on the sentinel.
    pub fn require(self) -> BackdropResult<Self> {
        if self.is_empty() {
            return Err(BackdropError::NoVisibleContent);
        }
        Ok(self)
    }

    /// Number of rows spanned, zero when empty.
    pub fn content_height(self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.bottom - self.top + 1
        }
    }

    /// Transparent rows above the content.
    pub fn padding_top(self) -> u32 {
        self.top
    }

    /// Transparent rows below the content in a canvas of `height` rows.
    pub fn padding_bottom(self, height: u32) -> u32 {
        height.saturating_sub(self.bottom).saturating_sub(1)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
