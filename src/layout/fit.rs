use image::imageops::{self, FilterType};

use crate::foundation::core::Raster;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Horizontal crop window placement when the resized background is wider than the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAlignX {
    Left,
    Center,
    /// Keep the right edge; matches the behavior of the hosted background service.
    #[default]
    Right,
}

/// Vertical crop window placement when the resized background is taller than the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Crop placement policy for both axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FitAlign {
    pub x: CropAlignX,
    pub y: CropAlignY,
}

/// Uniform resize followed by a crop window that yields exactly the target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitPlan {
    pub resize_width: u32,
    pub resize_height: u32,
    pub crop_x: u32,
    pub crop_y: u32,
    pub width: u32,
    pub height: u32,
}

impl FitPlan {
    fn is_identity(&self, src_w: u32, src_h: u32) -> bool {
        self.resize_width == src_w
            && self.resize_height == src_h
            && self.crop_x == 0
            && self.crop_y == 0
            && self.width == src_w
            && self.height == src_h
    }
}

/// Plan a "cover" fit of a `src_w x src_h` image into `target_w x target_h`.
///
/// A relatively wider source is scaled to the target height and cropped horizontally, anything
/// else is scaled to the target width and cropped vertically. Aspect ratios are compared with
/// exact integer cross-multiplication; the free axis is rounded to the nearest pixel.
pub fn plan_cover_fit(
    src_w: u32,
    src_h: u32,
    target_w: u32,
    target_h: u32,
    align: FitAlign,
) -> BackdropResult<FitPlan> {
    if src_w == 0 || src_h == 0 {
        return Err(BackdropError::invalid_dimensions(format!(
            "background {src_w}x{src_h} has zero area"
        )));
    }
    if target_w == 0 || target_h == 0 {
        return Err(BackdropError::invalid_dimensions(format!(
            "fit target {target_w}x{target_h} has zero area"
        )));
    }

    let (sw, sh, tw, th) = (
        u64::from(src_w),
        u64::from(src_h),
        u64::from(target_w),
        u64::from(target_h),
    );

    if sw * th > tw * sh {
        let resize_width = to_u32((sw * th + sh / 2) / sh)?.max(target_w);
        let slack = resize_width - target_w;
        let crop_x = match align.x {
            CropAlignX::Left => 0,
            CropAlignX::Center => slack / 2,
            CropAlignX::Right => slack,
        };
        Ok(FitPlan {
            resize_width,
            resize_height: target_h,
            crop_x,
            crop_y: 0,
            width: target_w,
            height: target_h,
        })
    } else {
        let resize_height = to_u32((sh * tw + sw / 2) / sw)?.max(target_h);
        let slack = resize_height - target_h;
        let crop_y = match align.y {
            CropAlignY::Top => 0,
            CropAlignY::Center => slack / 2,
            CropAlignY::Bottom => slack,
        };
        Ok(FitPlan {
            resize_width: target_w,
            resize_height,
            crop_x: 0,
            crop_y,
            width: target_w,
            height: target_h,
        })
    }
}

/// Resize and crop `background` so it covers exactly `target_w x target_h`.
#[tracing::instrument(skip(background), fields(src = ?background.dimensions()))]
pub fn fit_background(
    background: Raster,
    target_w: u32,
    target_h: u32,
    align: FitAlign,
) -> BackdropResult<Raster> {
    let (src_w, src_h) = background.dimensions();
    let plan = plan_cover_fit(src_w, src_h, target_w, target_h, align)?;
    tracing::debug!(?plan, "cover fit planned");

    if plan.is_identity(src_w, src_h) {
        return Ok(background);
    }

    let img = background.into_rgba_image()?;
    if (plan.resize_width, plan.resize_height) == (src_w, src_h) {
        let cropped =
            imageops::crop_imm(&img, plan.crop_x, plan.crop_y, plan.width, plan.height).to_image();
        return Raster::from_rgba_image(cropped);
    }

    // Crop in source space first so no buffer ever exceeds the target size.
    let (x, w) = source_span(plan.crop_x, plan.width, plan.resize_width, src_w);
    let (y, h) = source_span(plan.crop_y, plan.height, plan.resize_height, src_h);
    let window = imageops::crop_imm(&img, x, y, w, h).to_image();
    let fitted = if (w, h) == (plan.width, plan.height) {
        window
    } else {
        imageops::resize(&window, plan.width, plan.height, FilterType::Triangle)
    };
    Raster::from_rgba_image(fitted)
}

/// Map a `len`-wide window at `offset` on a `resized`-long axis back onto a `src`-long axis.
fn source_span(offset: u32, len: u32, resized: u32, src: u32) -> (u32, u32) {
    let (offset, len, resized, src) = (
        u64::from(offset),
        u64::from(len),
        u64::from(resized),
        u64::from(src),
    );
    let span = ((len * src + resized / 2) / resized).clamp(1, src);
    let start = (offset * src / resized).min(src - span);
    // Both values are bounded by `src`, which came from a u32.
    (start as u32, span as u32)
}

fn to_u32(v: u64) -> BackdropResult<u32> {
    u32::try_from(v)
        .map_err(|_| BackdropError::invalid_dimensions(format!("fit size {v} overflows u32")))
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fit.rs"]
mod tests;
