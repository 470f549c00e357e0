use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixelart::{LayoutKind, Registry};
use pixelsheet::assets::{self, DEFAULT_CONFIG_NAME};
use pixelsheet::models::AppConfig;
use pixelsheet::services::{ExportReport, FileWatcher, SheetPipeline, WatchFilter};

#[derive(Parser)]
#[command(name = "pixelsheet")]
#[command(about = "Turn rendered frames into pixel-art sprite sheets")]
struct Cli {
    /// Log processing details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the sprite sheet once
    Build {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_NAME)]
        config: PathBuf,

        /// Output path, overriding export.output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Rebuild whenever a frame or the configuration changes
    Watch {
        /// Configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_NAME)]
        config: PathBuf,
    },
    /// List available palettes
    Palettes {
        /// Include custom palettes from this configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default pixelsheet.yaml
    Init {
        /// Target path
        #[arg(default_value = DEFAULT_CONFIG_NAME)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Build { config, output }) => run_build_command(&config, output),
        Some(Commands::Watch { config }) => run_watch_command(config).await,
        Some(Commands::Palettes { config }) => run_palettes_command(config.as_deref()),
        Some(Commands::Init { path, force }) => run_init_command(&path, force),
        None => {
            run_status_command();
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "pixelsheet=debug,pixelart=debug"
    } else {
        "pixelsheet=info,pixelart=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn run_build_command(config: &Path, output: Option<PathBuf>) -> anyhow::Result<()> {
    let mut pipeline = SheetPipeline::from_file(config)
        .with_context(|| format!("Failed to set up pipeline from {}", config.display()))?;
    if let Some(output) = output {
        // CLI paths are relative to the working directory, not the config
        let output = if output.is_relative() {
            std::env::current_dir()?.join(output)
        } else {
            output
        };
        pipeline.set_output(output);
    }

    let report = pipeline.run()?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &ExportReport) {
    println!(
        "Built {}x{} sheet with {} frame(s)",
        report.sheet_size.width, report.sheet_size.height, report.frames
    );
    for path in &report.written {
        println!("  wrote: {}", path.display());
    }
    if !report.skipped.is_empty() {
        println!("  skipped (did not fit): {}", report.skipped.join(", "));
    }
}

/// Build once, then rebuild on every debounced change until Ctrl-C
async fn run_watch_command(config: PathBuf) -> anyhow::Result<()> {
    let config = std::fs::canonicalize(&config)
        .with_context(|| format!("Config not found: {}", config.display()))?;
    let watch_dir = config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    // Our own output must not retrigger a build
    let outputs = SheetPipeline::from_file(&config)
        .map(|p| p.output_paths())
        .unwrap_or_default();

    // A broken initial config is reported but keeps the watcher alive
    if let Err(e) = rebuild(config.clone()).await {
        tracing::error!("{e:#}");
    }

    let filter = WatchFilter::frames_and_config().ignore(outputs);
    let watcher = FileWatcher::new(&watch_dir, filter);
    if !watcher.is_active() {
        anyhow::bail!("Could not watch {}", watch_dir.display());
    }
    let mut events = watcher.subscribe();
    tracing::info!(dir = %watch_dir.display(), "Watching for changes (Ctrl-C to stop)");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    tracing::info!(changed = event.paths.len(), "Change detected, rebuilding");
                    if let Err(e) = rebuild(config.clone()).await {
                        tracing::error!("{e:#}");
                    }
                }
                Err(RecvError::Lagged(n)) => {
                    tracing::debug!(missed = n, "Watcher lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watch mode");
                break;
            }
        }
    }

    Ok(())
}

/// Reload the config and run the pipeline off the async runtime
async fn rebuild(config: PathBuf) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let pipeline = SheetPipeline::from_file(&config)?;
        let report = pipeline.run()?;
        print_report(&report);
        Ok(())
    })
    .await
    .context("Build task panicked")?
}

fn run_palettes_command(config: Option<&Path>) -> anyhow::Result<()> {
    let registry = match config {
        Some(path) => AppConfig::load(path)?.build_registry()?,
        None => Registry::with_presets(),
    };

    println!("Palettes:\n");
    for palette in registry.palettes() {
        let colors: Vec<String> = palette.colors().iter().map(|c| c.to_hex()).collect();
        println!(
            "  {:<12} {:<20} {:>3} colors  {}",
            palette.id(),
            palette.name(),
            palette.len(),
            colors.join(" ")
        );
    }
    Ok(())
}

fn run_init_command(path: &Path, force: bool) -> anyhow::Result<()> {
    let report = assets::init(path, force)?;

    for f in &report.written {
        println!("  wrote: {f}");
    }
    for f in &report.skipped {
        println!("  skipped (exists): {f}");
    }
    if !report.skipped.is_empty() {
        println!("\nUse --force to overwrite existing files.");
    }

    Ok(())
}

fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Pixelsheet v{VERSION}");
    println!("Pixel-art sprite sheets from rendered frames\n");

    let config = Path::new(DEFAULT_CONFIG_NAME);
    println!("Configuration:");
    if config.exists() {
        match AppConfig::load(config).and_then(|c| c.validate().map(|_| c)) {
            Ok(c) => println!(
                "  {DEFAULT_CONFIG_NAME} (ok, {} frame(s))",
                c.frame_sources().len()
            ),
            Err(e) => println!("  {DEFAULT_CONFIG_NAME} (invalid: {e})"),
        }
    } else {
        println!("  {DEFAULT_CONFIG_NAME} not found, run 'pixelsheet init'");
    }

    let registry = Registry::with_presets();
    let algorithms: Vec<&str> = registry.algorithms().iter().map(|a| a.name()).collect();
    let layouts: Vec<&str> = LayoutKind::ALL.iter().map(|k| k.name()).collect();
    let palettes: Vec<&str> = registry.palettes().iter().map(|p| p.id()).collect();

    println!("\nAlgorithms: {}", algorithms.join(", "));
    println!("Layouts:    {}", layouts.join(", "));
    println!("Palettes:   {}", palettes.join(", "));

    println!("\nCommands:");
    println!("  pixelsheet build     Build the sheet");
    println!("  pixelsheet watch     Rebuild on changes");
    println!("  pixelsheet palettes  List palettes");
    println!("  pixelsheet init      Write a starter {DEFAULT_CONFIG_NAME}");
}
