use rayon::prelude::*;

use crate::foundation::core::{Raster, Rgba8};
use crate::foundation::error::{BackdropError, BackdropResult};

/// Straight-alpha source-over for one pixel, both opacities fixed at 1.
///
/// `out_a = sa + da(1 - sa)` and `out_rgb = (src*sa + dst*da(1 - sa)) / out_a`, evaluated in
/// integer fixed point scaled by 255^2 and rounded to nearest.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    let dst_w = da * (255 - sa);
    let out_a2 = sa * 255 + dst_w;
    if out_a2 == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let num = u32::from(src[i]) * sa * 255 + u32::from(dst[i]) * dst_w;
        out[i] = div_round(num, out_a2).min(255) as u8;
    }
    out[3] = div_round(out_a2, 255).min(255) as u8;
    out
}

/// Blend `src` over `dst` pixel by pixel; buffers must have equal length.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> BackdropResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(BackdropError::invalid_dimensions(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Composite `foreground` over `background` at offset `(0, 0)`.
///
/// Consumes the background so the caller cannot observe it half-blended; the foreground is
/// only read. Both rasters must share dimensions.
#[tracing::instrument(skip(background, foreground), fields(size = ?background.dimensions()))]
pub fn composite_over(
    background: Raster,
    foreground: &Raster,
    parallel: bool,
) -> BackdropResult<Raster> {
    if background.dimensions() != foreground.dimensions() {
        return Err(BackdropError::invalid_dimensions(format!(
            "composite expects equal sizes, background {:?} vs foreground {:?}",
            background.dimensions(),
            foreground.dimensions()
        )));
    }

    let mut out = background;
    let stride = out.stride();
    if parallel {
        out.data_mut()
            .par_chunks_exact_mut(stride)
            .zip(foreground.data().par_chunks_exact(stride))
            .try_for_each(|(d, s)| over_in_place(d, s))?;
    } else {
        over_in_place(out.data_mut(), foreground.data())?;
    }
    Ok(out)
}

fn div_round(num: u32, den: u32) -> u32 {
    (num + den / 2) / den
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
