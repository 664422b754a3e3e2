use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use photostrip::{
    BoothConfig, CaptureSession, ExclusiveCamera, ExportSink, FileExport, Filter, FsTemplateLoader,
    StillCamera, StripLayout, TemplateCache, TracingProgress, assets::decode::read_image,
    run_session,
};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one full capture session and write the PNG strip.
    Run(RunArgs),
    /// Print the slot rectangles for a background size as JSON.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Background catalog name or image path relative to `--assets`.
    #[arg(long)]
    background: String,

    /// Directory background paths are resolved against.
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Filter applied to every capture (normal, grayscale, sepia).
    #[arg(long)]
    filter: Option<Filter>,

    /// Booth configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Images the camera replays, in order. Defaults to a generated test pattern.
    #[arg(long, num_args = 1..)]
    frames: Vec<PathBuf>,

    /// Output directory for the strip.
    #[arg(long, default_value = "out")]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Background width in pixels.
    #[arg(long)]
    width: u32,

    /// Background height in pixels.
    #[arg(long)]
    height: u32,

    /// Number of slots.
    #[arg(long, default_value_t = 4)]
    count: u32,
}

#[derive(serde::Serialize)]
struct SlotJson {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => BoothConfig::from_path(path)?,
        None => BoothConfig::default(),
    };
    let background = cfg.resolve_background(&args.background)?;

    let mut session = CaptureSession::new(cfg.session_opts())?;
    session.set_filter(args.filter.unwrap_or(cfg.filter))?;

    let mut templates = TemplateCache::new(
        FsTemplateLoader::new(&args.assets),
        cfg.layout,
        cfg.target_count,
    )?;
    match templates.get(&background) {
        Ok(template) => session.set_template(template)?,
        Err(e) => session.template_failed(&e),
    }

    let still = if args.frames.is_empty() {
        StillCamera::test_pattern(1280, 720, cfg.target_count as usize)?
    } else {
        let frames = args
            .frames
            .iter()
            .map(|p| read_image(p))
            .collect::<Result<Vec<_>, _>>()?;
        StillCamera::new(frames)?
    };
    let mut camera = ExclusiveCamera::new(still);

    run_session(&mut session, &mut camera, &mut TracingProgress)
        .context("capture session did not produce a strip")?;

    let strip = session.export_strip()?;
    let mut sink = FileExport::new(&args.out);
    sink.export(&strip)?;

    let path = args.out.join(strip.file_name());
    println!("{}", path.display());
    println!("sha256 {}", strip.digest_hex());
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let slots = StripLayout::default().slots(args.width, args.height, args.count)?;
    let out: Vec<SlotJson> = slots
        .iter()
        .map(|r| SlotJson {
            x: r.x0,
            y: r.y0,
            width: r.width(),
            height: r.height(),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize slots")?
    );
    Ok(())
}
