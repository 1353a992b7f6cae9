use std::path::PathBuf;

use clap::{Parser, Subcommand};

use motioncanvas::{
    CommandAnimator, CommandAnnotationExtractor, DancePreset, JobKey, Pipeline, PipelineConfig,
    RunOptions,
};

#[derive(Parser, Debug)]
#[command(name = "motioncanvas", version)]
struct Cli {
    /// Pipeline config JSON; environment/default roots are used when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory for default source/result/preset roots.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one (user, dance) job end to end (requires `ffmpeg` on PATH).
    Animate(AnimateArgs),
    /// Verify the environment: ffmpeg present, preset documents resolvable.
    Check,
}

#[derive(Parser, Debug)]
struct AnimateArgs {
    /// User id (UUID). Source images must already be at
    /// `<source_root>/background/<uuid>.png` and `<source_root>/character/<uuid>.png`.
    #[arg(long)]
    user: String,

    /// Dance preset to render.
    #[arg(long, value_enum)]
    dance: DancePreset,

    /// External annotation extractor, invoked as `<prog> <character_image> <out_dir>`.
    #[arg(long)]
    annotator: PathBuf,

    /// External animator, invoked as
    /// `<prog> <annotation_dir> <motion_cfg> <retarget_cfg> <out_dir>`.
    #[arg(long)]
    animator: PathBuf,

    /// Remove the GIF/MP4 deliverables too once the run completes.
    #[arg(long)]
    discard_results: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::from_env(&cli.root),
    };

    match cli.cmd {
        Command::Animate(args) => cmd_animate(config, args),
        Command::Check => cmd_check(config),
    }
}

fn cmd_animate(config: PipelineConfig, args: AnimateArgs) -> anyhow::Result<()> {
    let key = JobKey::parse(&args.user, args.dance)
        .map_err(|e| anyhow::anyhow!("invalid user id '{}': {e}", args.user))?;

    let pipeline = Pipeline::new(
        config,
        CommandAnnotationExtractor::new(args.annotator),
        CommandAnimator::new(args.animator),
    )?;

    let artifacts = pipeline.run(
        &key,
        RunOptions {
            retain_results: !args.discard_results,
        },
    )?;

    eprintln!("wrote {}", artifacts.gif.display());
    eprintln!("wrote {}", artifacts.mp4.display());
    Ok(())
}

fn cmd_check(config: PipelineConfig) -> anyhow::Result<()> {
    let mut ok = true;

    if motioncanvas::transcode::is_ffmpeg_on_path() {
        eprintln!("ffmpeg: found on PATH");
    } else {
        eprintln!("ffmpeg: NOT FOUND (required for MP4 encoding)");
        ok = false;
    }

    for preset in DancePreset::ALL {
        match preset.resolve(&config.preset_root) {
            Ok(resolved) => {
                eprintln!("preset '{preset}': ok");
                eprintln!("  motion:   {}", resolved.motion_cfg.display());
                eprintln!("  retarget: {}", resolved.retarget_cfg.display());
            }
            Err(err) => {
                eprintln!("preset '{preset}': {err}");
                ok = false;
            }
        }
    }

    if !ok {
        anyhow::bail!("environment check failed");
    }
    Ok(())
}
