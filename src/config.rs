use crate::backend::{CullFace, PolygonMode, RenderState};
use crate::error::SceneError;
use crate::scene::Scene;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Renders boxes, spheres, cylinders and frustums in the terminal
#[derive(Debug, Parser)]
#[command(name = "shapes3d", version, about)]
pub struct Cli {
    /// Scene file to render instead of the built-in forest
    #[arg(short, long, value_name = "PATH")]
    pub scene: Option<PathBuf>,

    /// Start with polygons drawn as outlines
    #[arg(short, long)]
    pub wireframe: bool,

    /// Start with lighting disabled
    #[arg(long)]
    pub no_lighting: bool,

    /// Start with back-face culling enabled
    #[arg(long)]
    pub cull: bool,

    /// Frames per second
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=240))]
    pub fps: u32,

    /// Show the debug overlay
    #[arg(short, long)]
    pub debug: bool,

    /// Write logs to this file (RUST_LOG sets the filter)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Print a single frame to stdout and exit
    #[arg(long)]
    pub snapshot: bool,

    /// Snapshot width in columns
    #[arg(long, default_value_t = 80)]
    pub columns: u16,

    /// Snapshot height in rows
    #[arg(long, default_value_t = 24)]
    pub rows: u16,
}

impl Cli {
    pub fn render_state(&self) -> RenderState {
        RenderState {
            polygon_mode: if self.wireframe {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            },
            lighting_enabled: !self.no_lighting,
            cull_face: if self.cull {
                CullFace::Enabled
            } else {
                CullFace::Disabled
            },
        }
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }

    pub fn load_scene(&self) -> Result<Scene, SceneError> {
        match &self.scene {
            Some(path) => Scene::load(path),
            None => Scene::forest(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_fixed_function_defaults() {
        let cli = Cli::try_parse_from(["shapes3d"]).unwrap();
        assert_eq!(cli.render_state(), RenderState::default());
        assert_eq!(cli.frame_interval(), Duration::from_secs(1) / 30);
        assert!(cli.scene.is_none());
        assert!(!cli.snapshot);
    }

    #[test]
    fn flags_select_the_render_state() {
        let cli = Cli::try_parse_from(["shapes3d", "--wireframe", "--no-lighting", "--cull"])
            .unwrap();
        assert_eq!(
            cli.render_state(),
            RenderState {
                polygon_mode: PolygonMode::Line,
                lighting_enabled: false,
                cull_face: CullFace::Enabled,
            }
        );
    }

    #[test]
    fn zero_fps_is_rejected() {
        assert!(Cli::try_parse_from(["shapes3d", "--fps", "0"]).is_err());
    }

    #[test]
    fn builtin_scene_is_used_without_a_path() {
        let cli = Cli::try_parse_from(["shapes3d", "--snapshot"]).unwrap();
        assert_eq!(cli.load_scene().unwrap(), Scene::forest().unwrap());
    }
}
