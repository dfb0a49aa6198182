use crate::foundation::core::{ContentBounds, Raster};
use crate::foundation::error::BackdropResult;

/// Downward shift (in rows) re-anchoring would apply, or `None` when the raster stays as is.
///
/// A shift happens only when there is strictly more transparent slack below the content than
/// above it. Empty bounds never shift.
pub fn anchor_shift(bounds: ContentBounds, height: u32) -> Option<u32> {
    if bounds.is_empty() || bounds.bottom >= height {
        return None;
    }
    let padding_top = bounds.padding_top();
    let padding_bottom = bounds.padding_bottom(height);
    (padding_bottom > padding_top).then(|| padding_bottom - padding_top)
}

/// Settle content toward the bottom of its canvas.
///
/// When [`anchor_shift`] yields a shift, rows `top..=bottom` are moved down by it onto a fresh
/// transparent canvas of the same size, which swaps the top and bottom paddings. Otherwise the
/// input raster is returned untouched. Applying this twice never shifts twice.
pub fn reanchor(raster: Raster, bounds: ContentBounds) -> BackdropResult<Raster> {
    let (width, height) = raster.dimensions();
    let Some(shift) = anchor_shift(bounds, height) else {
        tracing::debug!(?bounds, "re-anchor skipped");
        return Ok(raster);
    };

    let mut canvas = Raster::transparent(width, height)?;
    let stride = raster.stride();
    let src_start = bounds.top as usize * stride;
    let src_end = (bounds.bottom as usize + 1) * stride;
    let dst_start = (bounds.top + shift) as usize * stride;
    let len = src_end - src_start;
    canvas.data_mut()[dst_start..dst_start + len]
        .copy_from_slice(&raster.data()[src_start..src_end]);

    tracing::debug!(?bounds, shift, "content re-anchored");
    Ok(canvas)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/anchor.rs"]
mod tests;
