use std::path::PathBuf;

use anyhow::Context as _;
use animator::{InterruptFlag, KeyframeParser, RunConfig, RunOutcome, StubBackend, Timeline};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "animator", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the dense per-frame timeline and write it as JSON.
    Timeline(TimelineArgs),
    /// Render every frame with the built-in deterministic backend.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct TimelineArgs {
    /// Run configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Keyframe script; replaces the script embedded in the config.
    #[arg(long)]
    keyframes: Option<PathBuf>,

    /// Output JSON path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Run configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Keyframe script; replaces the script embedded in the config.
    #[arg(long)]
    keyframes: Option<PathBuf>,

    /// Output directory; replaces `output_dir` from the config.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Checkpoint names the backend accepts for `model` keyframes.
    #[arg(long = "checkpoint")]
    checkpoints: Vec<String>,
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
        Command::Timeline(args) => cmd_timeline(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn load_config(path: &PathBuf, keyframes: Option<&PathBuf>) -> anyhow::Result<RunConfig> {
    let mut config = RunConfig::from_path(path)?;
    if let Some(kf) = keyframes {
        config.keyframes = std::fs::read_to_string(kf)
            .with_context(|| format!("read keyframes {}", kf.display()))?;
    }
    Ok(config)
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config, args.keyframes.as_ref())?;
    let parsed = KeyframeParser::new(config.fps()?, config.total_time).parse(&config.keyframes);
    for skipped in &parsed.skipped {
        eprintln!("line {}: skipped ({})", skipped.line, skipped.reason);
    }
    let timeline = Timeline::build(&parsed, &config, &mut rand::thread_rng())?;
    let json = timeline.to_json()?;
    match args.out {
        Some(out) => {
            std::fs::write(&out, json).with_context(|| format!("write {}", out.display()))?;
            eprintln!("wrote {} rows to {}", timeline.rows.len(), out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.config, args.keyframes.as_ref())?;
    if let Some(out) = args.out {
        config.output_dir = out;
    }
    let mut backend = StubBackend::new(args.checkpoints);
    let report = animator::pipeline::run(&config, &mut backend, &InterruptFlag::new())?;

    match report.outcome {
        RunOutcome::Completed => eprintln!(
            "rendered {} frames ({} files) into {}",
            report.frames_rendered,
            report.files_written.len(),
            report.output_dir.display()
        ),
        RunOutcome::Interrupted { at_frame } => eprintln!(
            "interrupted at frame {at_frame}; {} frames kept in {}",
            report.frames_rendered,
            report.output_dir.display()
        ),
    }
    for video in &report.videos {
        eprintln!("video: {}", video.display());
    }
    Ok(())
}
