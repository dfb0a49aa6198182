use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Log pipeline decisions (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a foreground over a background and write a PNG.
    Compose(ComposeArgs),
    /// Print the vertical content bounds of an image as JSON.
    Bounds(BoundsArgs),
    /// Make near-white pixels transparent and write a PNG.
    Key(KeyArgs),
}

#[derive(Args, Debug)]
#[group(id = "foreground", required = true, multiple = false)]
struct ForegroundArgs {
    /// Foreground image.
    #[arg(long)]
    fg: Option<PathBuf>,

    /// Foreground image fetched over HTTP(S).
    #[arg(long)]
    fg_url: Option<String>,

    /// Foreground video; a still frame is extracted (requires `ffmpeg` on PATH).
    #[arg(long)]
    video: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(id = "background", required = true, multiple = false)]
struct BackgroundArgs {
    /// Background image.
    #[arg(long)]
    bg: Option<PathBuf>,

    /// Directory of .jpg/.jpeg/.png backgrounds.
    #[arg(long)]
    bg_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    foreground: ForegroundArgs,

    #[command(flatten)]
    background: BackgroundArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Background selector for --bg-dir (taken modulo the number of backgrounds).
    #[arg(long, default_value_t = 0)]
    pick: usize,

    /// Point in the video to grab, as a fraction of its duration.
    #[arg(long, default_value_t = 0.5, requires = "video")]
    at: f64,

    /// Give up on fetching or video decoding after this many seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// JSON file with compose options; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key out near-white foreground pixels before compositing.
    #[arg(long)]
    chroma_key: bool,

    /// Only key pixels that are already mostly opaque (implies --chroma-key).
    #[arg(long)]
    strict_key: bool,

    /// Alpha a pixel must exceed to count as content.
    #[arg(long)]
    threshold: Option<u8>,

    #[arg(long, value_enum)]
    crop_x: Option<CropX>,

    #[arg(long, value_enum)]
    crop_y: Option<CropY>,

    /// Run per-pixel passes on a single thread.
    #[arg(long)]
    serial: bool,
}

#[derive(Parser, Debug)]
struct BoundsArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = backdrop::VISIBILITY_THRESHOLD)]
    threshold: u8,
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Only key pixels that are already mostly opaque.
    #[arg(long)]
    strict: bool,

    #[arg(long, default_value_t = backdrop::CHROMA_KEY_THRESHOLD)]
    threshold: u8,
}

#[derive(serde::Serialize, Debug)]
struct BoundsReport {
    width: u32,
    height: u32,
    #[serde(flatten)]
    bounds: backdrop::ContentBounds,
    padding_top: u32,
    padding_bottom: u32,
    shift: Option<u32>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CropX {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CropY {
    Top,
    Center,
    Bottom,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Bounds(args) => cmd_bounds(args),
        Command::Key(args) => cmd_key(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn compose_opts(args: &ComposeArgs) -> anyhow::Result<backdrop::ComposeOpts> {
    let mut opts = match &args.config {
        Some(path) => backdrop::ComposeOpts::from_path(path)?,
        None => backdrop::ComposeOpts::default(),
    };
    apply_overrides(&mut opts, args);
    Ok(opts)
}

/// Layer command-line flags over options loaded from `--config`.
fn apply_overrides(opts: &mut backdrop::ComposeOpts, args: &ComposeArgs) {
    if args.strict_key {
        match &mut opts.chroma_key {
            Some(key) => key.min_alpha = Some(backdrop::STRICT_KEY_MIN_ALPHA),
            None => opts.chroma_key = Some(backdrop::ChromaKey::strict()),
        }
    } else if args.chroma_key && opts.chroma_key.is_none() {
        opts.chroma_key = Some(backdrop::ChromaKey::default());
    }
    if let Some(threshold) = args.threshold {
        opts.visibility_threshold = threshold;
    }
    if let Some(x) = args.crop_x {
        opts.align.x = match x {
            CropX::Left => backdrop::CropAlignX::Left,
            CropX::Center => backdrop::CropAlignX::Center,
            CropX::Right => backdrop::CropAlignX::Right,
        };
    }
    if let Some(y) = args.crop_y {
        opts.align.y = match y {
            CropY::Top => backdrop::CropAlignY::Top,
            CropY::Center => backdrop::CropAlignY::Center,
            CropY::Bottom => backdrop::CropAlignY::Bottom,
        };
    }
    if args.serial {
        opts.parallel = false;
    }
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let opts = compose_opts(&args)?;

    let timeout = Duration::from_secs(args.timeout_secs);
    let fg = &args.foreground;
    let source: Box<dyn backdrop::RasterSource> = match (&fg.fg, &fg.fg_url, &fg.video) {
        (Some(path), _, _) => Box::new(backdrop::ImageFile(path.clone())),
        (None, Some(url), _) => Box::new(backdrop::ImageUrl::new(url).with_timeout(timeout)),
        (None, None, Some(path)) => {
            Box::new(backdrop::VideoFrame::new(path, args.at).with_timeout(timeout))
        }
        (None, None, None) => anyhow::bail!("one of --fg, --fg-url or --video is required"),
    };

    let catalog: Box<dyn backdrop::BackgroundCatalog> =
        match (&args.background.bg, &args.background.bg_dir) {
            (Some(path), _) => {
                let bg = backdrop::load_raster(path)?;
                Box::new(backdrop::MemoryCatalog::new(vec![bg])?)
            }
            (None, Some(dir)) => Box::new(backdrop::DirCatalog::scan(dir)?),
            (None, None) => anyhow::bail!("one of --bg or --bg-dir is required"),
        };

    let encoded =
        backdrop::compose_from_sources(source.as_ref(), catalog.as_ref(), args.pick, &opts)?;

    backdrop::ensure_parent_dir(&args.out)?;
    std::fs::write(&args.out, &encoded.bytes)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_bounds(args: BoundsArgs) -> anyhow::Result<()> {
    let raster = backdrop::load_raster(&args.in_path)?;
    let bounds = backdrop::detect_content_bounds(&raster, args.threshold, true).require()?;
    let height = raster.height();

    let report = BoundsReport {
        width: raster.width(),
        height,
        bounds,
        padding_top: bounds.padding_top(),
        padding_bottom: bounds.padding_bottom(height),
        shift: backdrop::anchor_shift(bounds, height),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let mut raster = backdrop::load_raster(&args.in_path)?;
    let mut key = if args.strict {
        backdrop::ChromaKey::strict()
    } else {
        backdrop::ChromaKey::default()
    };
    key.threshold = args.threshold;
    key.apply(&mut raster, true);
    backdrop::write_png(&raster, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/bin/backdrop.rs"]
mod tests;
