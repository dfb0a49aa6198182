//! Backdrop composites a foreground image over a background and hands back a PNG.
//!
//! The foreground's canvas size is authoritative. The pipeline, in order:
//!
//! 1. **Chroma key** (optional): near-white foreground pixels become transparent.
//! 2. **Detect**: find the first and last rows with visible content ([`ContentBounds`]).
//! 3. **Re-anchor**: when there is more slack below the content than above it, move the
//!    content down so the paddings swap.
//! 4. **Fit**: scale the background uniformly to cover the foreground canvas, then crop
//!    ([`FitAlign`] decides where the crop window sits).
//! 5. **Composite**: straight-alpha source-over at `(0, 0)`.
//!
//! Inputs arrive through collaborators ([`RasterSource`], [`BackgroundCatalog`]); every stage
//! works on an owned [`Raster`] and passes ownership on to the next.
#![forbid(unsafe_code)]

mod assets;
mod effects;
mod encode;
mod foundation;
mod layout;
mod render;

pub use assets::catalog::{
    BACKGROUND_EXTENSIONS, BackgroundCatalog, DirCatalog, MemoryCatalog, pick_background,
};
pub use assets::decode::{ImageBytes, ImageFile, RasterSource, decode_raster, load_raster};
pub use assets::fetch::{DEFAULT_FETCH_TIMEOUT, ImageUrl, MAX_FETCH_BYTES, fetch_bytes};
pub use assets::media::{
    DEFAULT_MEDIA_TIMEOUT, VideoFrame, VideoSourceInfo, decode_video_frame, frame_time_sec,
    probe_video,
};
pub use effects::chroma_key::ChromaKey;
pub use effects::composite::{composite_over, over, over_in_place};
pub use encode::png::{EncodedImage, PNG_CONTENT_TYPE, encode_png, ensure_parent_dir, write_png};
pub use foundation::core::{
    CHROMA_KEY_THRESHOLD, ContentBounds, Raster, Rgba8, STRICT_KEY_MIN_ALPHA,
    VISIBILITY_THRESHOLD, expected_len,
};
pub use foundation::error::{BackdropError, BackdropResult};
pub use layout::anchor::{anchor_shift, reanchor};
pub use layout::bounds::detect_content_bounds;
pub use layout::fit::{CropAlignX, CropAlignY, FitAlign, FitPlan, fit_background, plan_cover_fit};
pub use render::pipeline::{
    ComposeOpts, ComposeReport, compose, compose_from_sources, compose_png, compose_with_report,
};
