use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "voyagemap", version, about = "Render animated maps of historical ship routes")]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one frame per grouping value and export the animation.
    Render(RenderArgs),
    /// Render the frame of a single grouping value as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Track-point CSV (long, lat, group, group.regroup, year, nation).
    #[arg(long)]
    tracks: PathBuf,

    /// GeoJSON file with landmass polygons.
    #[arg(long)]
    boundary: Option<PathBuf>,

    /// Image overlay as PATH@min_lon,max_lon,min_lat,max_lat (repeatable).
    #[arg(long = "overlay", value_name = "PATH@BOUNDS")]
    overlays: Vec<String>,

    /// TTF/OTF font used to draw frame titles.
    #[arg(long)]
    font: Option<PathBuf>,

    /// JSON map config; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas size as WIDTHxHEIGHT.
    #[arg(long, value_name = "WxH")]
    size: Option<String>,

    /// Viewport as min_lon,max_lon,min_lat,max_lat.
    #[arg(long, allow_hyphen_values = true)]
    viewport: Option<String>,

    /// Attribute that partitions the table into frames.
    #[arg(long, value_enum)]
    group_by: Option<GroupByArg>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    map: MapArgs,

    /// Output path: a directory (html), a .gif or a .mp4 file.
    #[arg(long)]
    out: PathBuf,

    /// Output format; inferred from `--out` when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Visit grouping values in order of first appearance instead of sorted.
    #[arg(long, default_value_t = false)]
    first_appearance: bool,

    /// Render only these grouping values (comma separated).
    #[arg(long, value_delimiter = ',')]
    keys: Option<Vec<String>>,

    /// Skip frames that fail instead of aborting the run.
    #[arg(long, default_value_t = false)]
    skip_bad_frames: bool,

    /// Refuse to replace an existing output.
    #[arg(long, default_value_t = false)]
    no_overwrite: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    map: MapArgs,

    /// Grouping value to render (e.g. a year).
    #[arg(long)]
    key: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Html,
    Gif,
    Mp4,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum GroupByArg {
    Year,
    Nation,
}

impl From<GroupByArg> for voyagemap::GroupBy {
    fn from(v: GroupByArg) -> Self {
        match v {
            GroupByArg::Year => Self::Year,
            GroupByArg::Nation => Self::Nation,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => tracing::Level::ERROR,
        (false, 0) => tracing::Level::WARN,
        (false, 1) => tracing::Level::INFO,
        (false, 2) => tracing::Level::DEBUG,
        (false, _) => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(map: &MapArgs) -> anyhow::Result<(voyagemap::MapConfig, voyagemap::MapInputs)> {
    let mut cfg = match &map.config {
        Some(p) => voyagemap::MapConfig::from_path(p)?,
        None => voyagemap::MapConfig::default(),
    };

    if let Some(size) = &map.size {
        cfg.canvas = parse_size(size)?;
    }
    if let Some(v) = &map.viewport {
        cfg.viewport = Some(voyagemap::GeoBounds::parse_csv(v)?);
    }
    if let Some(g) = map.group_by {
        cfg.group_by = g.into();
    }
    for spec in &map.overlays {
        cfg.overlays.push(parse_overlay(spec)?);
    }

    let inputs = voyagemap::MapInputs {
        tracks: map.tracks.clone(),
        boundary: map.boundary.clone(),
        font: map.font.clone(),
    };
    Ok((cfg, inputs))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut cfg, inputs) = load_config(&args.map)?;
    if let Some(fps) = args.fps {
        cfg.fps = voyagemap::Fps::new(fps, 1)?;
    }
    if args.first_appearance {
        cfg.order = voyagemap::KeyOrder::FirstAppearance;
    }
    if args.keys.is_some() {
        cfg.keys = args.keys.clone();
    }
    if args.skip_bad_frames {
        cfg.failure_policy = voyagemap::FailurePolicy::SkipFrame;
    }
    let page_title = cfg.page_title.clone();
    let bg = cfg.style.clear.to_array();

    let mut session = voyagemap::MapSession::open(cfg, &inputs)
        .with_context(|| format!("open map from '{}'", inputs.tracks.display()))?;
    let seq = session.render_all()?;
    for s in seq.skipped() {
        eprintln!("skipped {} ({} error): {}", s.key, s.stage, s.reason);
    }

    let overwrite = !args.no_overwrite;
    let format = args.format.unwrap_or_else(|| infer_format(&args.out));
    match format {
        FormatArg::Html => {
            let mut opts = voyagemap::HtmlSinkOpts::new(&args.out);
            opts.overwrite = overwrite;
            opts.title = page_title;
            session.export(&seq, &mut voyagemap::HtmlSink::new(opts))?;
        }
        FormatArg::Gif => {
            if !overwrite && args.out.exists() {
                anyhow::bail!("output file '{}' already exists", args.out.display());
            }
            session.export(&seq, &mut voyagemap::GifSink::new(&args.out))?;
        }
        FormatArg::Mp4 => {
            let mut opts = voyagemap::FfmpegSinkOpts::new(&args.out);
            opts.overwrite = overwrite;
            opts.bg_rgba = bg;
            session.export(&seq, &mut voyagemap::FfmpegSink::new(opts))?;
        }
    }

    eprintln!("wrote {} frames to {}", seq.len(), args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (cfg, inputs) = load_config(&args.map)?;
    let key = voyagemap::GroupKey::parse(cfg.group_by, &args.key)?;

    let mut session = voyagemap::MapSession::open(cfg, &inputs)
        .with_context(|| format!("open map from '{}'", inputs.tracks.display()))?;
    let captured = session.render_key(&key)?;
    voyagemap::write_png(&args.out, &captured.frame)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} segments, {} points)",
        args.out.display(),
        captured.stats.segments,
        captured.stats.points
    );
    Ok(())
}

fn infer_format(out: &Path) -> FormatArg {
    match out
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("gif") => FormatArg::Gif,
        Some("mp4") => FormatArg::Mp4,
        _ => FormatArg::Html,
    }
}

fn parse_size(s: &str) -> anyhow::Result<voyagemap::Canvas> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .with_context(|| format!("size '{s}' must look like 1200x800"))?;
    let canvas = voyagemap::Canvas {
        width: w.trim().parse().with_context(|| format!("invalid width in '{s}'"))?,
        height: h.trim().parse().with_context(|| format!("invalid height in '{s}'"))?,
    };
    canvas.validate()?;
    Ok(canvas)
}

fn parse_overlay(s: &str) -> anyhow::Result<voyagemap::OverlaySpec> {
    let (path, bounds) = s
        .rsplit_once('@')
        .with_context(|| format!("overlay '{s}' must look like PATH@min_lon,max_lon,min_lat,max_lat"))?;
    Ok(voyagemap::OverlaySpec {
        path: PathBuf::from(path),
        bounds: voyagemap::GeoBounds::parse_csv(bounds)?,
        opacity: 1.0,
    })
}
