use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{cursor, execute, tty::IsTty};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vumeter::app::App;
use vumeter::settings::{LogTarget, Overrides, Settings};
use vumeter::ui::Theme;
use vumeter::{LineSource, MeterRegistry, StreamSource, TerminalRenderer};

#[derive(Parser, Debug)]
#[command(name = "vumeter", version)]
#[command(about = "Live terminal level meters driven by lines on standard input")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read from a file or FIFO instead of standard input
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Redraws per second
    #[arg(short, long)]
    refresh_rate: Option<u32>,

    /// Panel title when channels do not share a device
    #[arg(short, long)]
    title: Option<String>,

    /// Write diagnostics to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        refresh_per_second: args.refresh_rate,
        fallback_title: args.title.clone(),
        log_file: args.log_file.clone(),
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;
    init_logging(&settings)?;

    let rt = Runtime::new()?;
    let result = run(&rt, &args, &settings);

    // Stdin is read on a blocking thread that may never return; don't wait for it.
    rt.shutdown_background();

    result
}

/// Read the input stream and drive the meter panel until it ends.
fn run(rt: &Runtime, args: &Args, settings: &Settings) -> Result<()> {
    let _guard = rt.enter();

    let source: Box<dyn LineSource> = match &args.input {
        Some(path) => {
            let file = rt
                .block_on(tokio::fs::File::open(path))
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(StreamSource::spawn(file, &path.display().to_string()))
        }
        None => Box::new(StreamSource::spawn(tokio::io::stdin(), "stdin")),
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    rt.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::Relaxed);
        }
    });

    // Setup panic hook to restore the cursor
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = execute!(io::stdout(), cursor::Show);
        original_hook(panic);
    }));

    let theme = Theme::auto_detect().with_border(settings.border_color()?);
    let mut renderer = TerminalRenderer::new(theme, settings.peak_level);
    let mut app = App::new(source, MeterRegistry::new(&settings.fallback_title));

    let summary = app.run(&mut renderer, settings.refresh_interval(), &shutdown)?;
    info!(
        "{} lines from {}: {} frames applied, {} skipped{}",
        summary.lines,
        app.source_description(),
        summary.frames_applied,
        summary.frames_skipped,
        if summary.interrupted { " (interrupted)" } else { "" }
    );

    Ok(())
}

fn init_logging(settings: &Settings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("Invalid log_level")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);

    match settings.log_target(io::stdout().is_tty(), io::stderr().is_tty()) {
        LogTarget::File(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).init();
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).init(),
        LogTarget::Off => {}
    }

    Ok(())
}
