use crate::camera::Camera;

/// Application state
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// Interactive camera
    pub camera: Camera,
    /// Enable debug mode
    pub debug: bool,
    /// Camera input ignored while paused
    pub paused: bool,
    /// Set once the user asked to leave
    pub quit: bool,
}

impl AppState {
    pub fn new(camera: Camera, debug: bool) -> Self {
        AppState {
            camera,
            debug,
            paused: false,
            quit: false,
        }
    }
}
