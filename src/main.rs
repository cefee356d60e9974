mod backend;
mod camera;
mod canvas;
mod config;
mod error;
mod graphics;
mod math;
mod renderer;
mod scene;
mod shapes;
mod state;
mod terminal;
mod vertex;

use anyhow::Context;
use clap::Parser;
use config::Cli;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    } else if cli.snapshot {
        // Stderr is free only when nothing is drawn on the terminal
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// Main function
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let scene = cli.load_scene().context("failed to load the scene")?;
    if cli.snapshot {
        terminal::snapshot(&cli, scene)
    } else {
        terminal::run(&cli, scene)
    }
}
