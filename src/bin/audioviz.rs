use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "audioviz", version, about = "Render audio-reactive videos")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render an MP4 video with the audio muxed in (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// List the registered layer types.
    Layers,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Pipeline configuration JSON.
    #[arg(long, short = 'c')]
    config: PathBuf,

    /// Audio file (anything ffmpeg can decode).
    #[arg(long, short = 'a')]
    audio: PathBuf,

    /// Override the configured video width.
    #[arg(long)]
    width: Option<u32>,

    /// Override the configured video height.
    #[arg(long)]
    height: Option<u32>,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output MP4 path.
    #[arg(long, short = 'o')]
    out: PathBuf,

    /// Stop after this many seconds of audio.
    #[arg(long)]
    max_secs: Option<f64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Presentation time in seconds.
    #[arg(long, short = 't')]
    time: f64,

    /// Output PNG path.
    #[arg(long, short = 'o')]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Layers => cmd_layers(),
    }
}

fn load_inputs(args: &InputArgs) -> anyhow::Result<(audioviz::Config, audioviz::PcmAudio)> {
    let mut cfg = audioviz::Config::from_path(&args.config)
        .with_context(|| format!("load config '{}'", args.config.display()))?;
    cfg.apply_overrides(audioviz::Overrides {
        width: args.width,
        height: args.height,
        fps: args.fps,
    })?;
    let audio = audioviz::load_track(&args.audio, &cfg.audio)
        .with_context(|| format!("load audio '{}'", args.audio.display()))?;
    Ok((cfg, audio))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (cfg, audio) = load_inputs(&args.input)?;
    let registry = audioviz::LayerRegistry::with_builtin();
    let opts = audioviz::RenderSessionOpts {
        audio_path: Some(args.input.audio.clone()),
        ..audioviz::RenderSessionOpts::default()
    };
    let mut session = audioviz::RenderSession::from_config(&cfg, &registry, opts)?;

    use audioviz::AudioSource as _;
    let secs = match args.max_secs {
        Some(m) => audio.duration().min(m.max(0.0)),
        None => audio.duration(),
    };
    let range = session.full_range(secs)?;
    if range.is_empty() {
        anyhow::bail!("audio is shorter than one frame at {} fps", cfg.video.fps);
    }

    let mut sink = audioviz::FfmpegSink::new(&args.out);
    let started = std::time::Instant::now();
    let stats = session.render_range(range, &audio, &mut sink)?;
    let elapsed = started.elapsed().as_secs_f64();
    tracing::info!(
        frames = stats.frames_rendered,
        elapsed_s = elapsed,
        fps = stats.frames_rendered as f64 / elapsed.max(1e-9),
        "render finished"
    );

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (cfg, audio) = load_inputs(&args.input)?;
    let registry = audioviz::LayerRegistry::with_builtin();
    let mut pipeline = audioviz::Pipeline::assemble(&cfg, &registry)?;
    let frame = pipeline.render_frame(args.time, &audio)?;

    audioviz::ensure_parent_dir(&args.out)?;
    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_layers() -> anyhow::Result<()> {
    for name in audioviz::LayerRegistry::with_builtin().available() {
        println!("{name}");
    }
    Ok(())
}
