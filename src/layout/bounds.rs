use rayon::prelude::*;

use crate::foundation::core::{ContentBounds, Raster};

/// Find the first and last rows holding at least one pixel with alpha above `threshold`.
///
/// Read-only. Each row stops scanning at its first visible pixel. With `parallel` the rows are
/// split across the rayon pool; the result is identical either way.
pub fn detect_content_bounds(raster: &Raster, threshold: u8, parallel: bool) -> ContentBounds {
    let stride = raster.stride();
    let visible = |row: &[u8]| row.chunks_exact(4).any(|px| px[3] > threshold);

    let (top, bottom) = if parallel {
        let data = raster.data();
        let top = data.par_chunks_exact(stride).position_first(visible);
        let bottom = data.par_chunks_exact(stride).position_last(visible);
        (top, bottom)
    } else {
        let mut rows = raster.data().chunks_exact(stride);
        let top = rows.position(visible);
        // Remaining rows sit after `top`; rposition counts from the iterator start.
        let bottom = top.map(|t| {
            rows.rposition(visible)
                .map(|rel| t + 1 + rel)
                .unwrap_or(t)
        });
        (top, bottom)
    };

    match (top, bottom) {
        (Some(top), Some(bottom)) => ContentBounds {
            top: top as u32,
            bottom: bottom as u32,
        },
        _ => ContentBounds::empty(raster.height()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/bounds.rs"]
mod tests;
