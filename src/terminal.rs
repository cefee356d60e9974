use crate::camera::Camera;
use crate::canvas::Canvas;
use crate::config::Cli;
use crate::renderer::ShapesRenderer;
use crate::scene::Scene;
use crate::state::AppState;
use anyhow::Context;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io::{self, Write};

/// Raw mode, alternate screen and mouse capture for as long as it lives
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(err) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture, Hide) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Current terminal size in columns and rows
pub fn terminal_size() -> (u16, u16) {
    if let Some(size) = termsize::get() {
        return (size.cols, size.rows);
    }
    terminal::size().unwrap_or((80, 24))
}

fn canvas_for(cli: &Cli, scene: Scene, columns: u16, rows: u16) -> (Canvas, AppState) {
    let light = scene.light;
    let camera = Camera::new(scene.camera);
    let renderer = ShapesRenderer::new(scene, cli.render_state());
    let canvas = Canvas::new(renderer, light, columns.max(1), rows.max(1));
    (canvas, AppState::new(camera, cli.debug))
}

/// Runs the interactive viewer until the user quits
pub fn run(cli: &Cli, scene: Scene) -> anyhow::Result<()> {
    let (columns, rows) = terminal_size();
    let (mut canvas, mut data) = canvas_for(cli, scene, columns, rows);

    let guard = TerminalGuard::enter().context("failed to set up the terminal")?;
    let mut stdout = io::stdout().lock();
    let result = canvas.drive(&mut data, &mut stdout, cli.frame_interval(), |timeout| {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    });

    drop(stdout);
    drop(guard);
    result.context("terminal event loop failed")?;
    tracing::info!("viewer closed");
    Ok(())
}

/// Renders a single frame of the scene to stdout
pub fn snapshot(cli: &Cli, scene: Scene) -> anyhow::Result<()> {
    let (mut canvas, data) = canvas_for(cli, scene, cli.columns, cli.rows);
    let mut stdout = io::stdout().lock();
    canvas
        .snapshot(&mut stdout, &data)
        .context("failed to write the snapshot")?;
    stdout.flush()?;
    canvas.dispose();
    Ok(())
}
