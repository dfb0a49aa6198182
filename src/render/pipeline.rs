use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::assets::catalog::{BackgroundCatalog, pick_background};
use crate::assets::decode::RasterSource;
use crate::effects::chroma_key::ChromaKey;
use crate::effects::composite::composite_over;
use crate::encode::png::{EncodedImage, encode_png};
use crate::foundation::core::{ContentBounds, Raster, VISIBILITY_THRESHOLD};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::layout::anchor::{anchor_shift, reanchor};
use crate::layout::bounds::detect_content_bounds;
use crate::layout::fit::{FitAlign, FitPlan, fit_background, plan_cover_fit};

/// Pipeline options, loadable from JSON. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeOpts {
    /// Alpha a pixel must exceed to count as content.
    pub visibility_threshold: u8,
    /// Optional near-white keying of the foreground before anything else runs.
    pub chroma_key: Option<ChromaKey>,
    /// Crop placement for the background cover fit.
    pub align: FitAlign,
    /// Split per-pixel passes across the rayon pool.
    pub parallel: bool,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            visibility_threshold: VISIBILITY_THRESHOLD,
            chroma_key: None,
            align: FitAlign::default(),
            parallel: true,
        }
    }
}

impl ComposeOpts {
    pub fn from_reader<R: std::io::Read>(r: R) -> BackdropResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BackdropError::validation(format!("parse compose options JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BackdropError::validation(format!("open compose options '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

/// What the pipeline decided along the way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComposeReport {
    pub bounds: ContentBounds,
    /// Rows the content moved down, if re-anchoring happened.
    pub shift: Option<u32>,
    pub fit: FitPlan,
}

/// Composite `foreground` over `background`; the output has the foreground's size.
pub fn compose(
    foreground: Raster,
    background: Raster,
    opts: &ComposeOpts,
) -> BackdropResult<Raster> {
    compose_with_report(foreground, background, opts).map(|(raster, _)| raster)
}

/// Run chroma key (optional), bounds detection, re-anchor, cover fit and source-over.
#[tracing::instrument(skip(foreground, background), fields(
    fg = ?foreground.dimensions(),
    bg = ?background.dimensions(),
))]
pub fn compose_with_report(
    mut foreground: Raster,
    background: Raster,
    opts: &ComposeOpts,
) -> BackdropResult<(Raster, ComposeReport)> {
    let (target_w, target_h) = foreground.dimensions();
    let (bg_w, bg_h) = background.dimensions();
    let fit = plan_cover_fit(bg_w, bg_h, target_w, target_h, opts.align)?;

    if let Some(key) = &opts.chroma_key {
        key.apply(&mut foreground, opts.parallel);
    }

    let bounds = detect_content_bounds(&foreground, opts.visibility_threshold, opts.parallel);
    if bounds.is_empty() {
        tracing::debug!("{}; keeping foreground as is", BackdropError::NoVisibleContent);
    }
    let shift = anchor_shift(bounds, target_h);
    let foreground = reanchor(foreground, bounds)?;

    let background = fit_background(background, target_w, target_h, opts.align)?;
    let out = composite_over(background, &foreground, opts.parallel)?;

    let report = ComposeReport { bounds, shift, fit };
    tracing::debug!(?report, "composed");
    Ok((out, report))
}

/// [`compose`] followed by PNG encoding.
pub fn compose_png(
    foreground: Raster,
    background: Raster,
    opts: &ComposeOpts,
) -> BackdropResult<EncodedImage> {
    let out = compose(foreground, background, opts)?;
    encode_png(&out)
}

/// Resolve both inputs through their collaborators, then compose and encode.
///
/// `selector` chooses the background (see [`pick_background`]). The foreground is resolved
/// first.
#[tracing::instrument(skip(source, catalog, opts), fields(src = %source.describe()))]
pub fn compose_from_sources(
    source: &dyn RasterSource,
    catalog: &dyn BackgroundCatalog,
    selector: usize,
    opts: &ComposeOpts,
) -> BackdropResult<EncodedImage> {
    let foreground = source.load()?;
    let background = pick_background(catalog, selector)?;
    compose_png(foreground, background, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
