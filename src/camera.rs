use glam::{Mat4, Vec3};
use serde::Deserialize;

/// Step sizes and input sensitivities of the camera
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraSettings {
    /// Starting distance of the eye from the origin
    pub eye_distance: f32,
    /// Degrees per arrow key press
    pub key_rotation_step: f32,
    /// Eye distance change per `+`/`-` press
    pub key_zoom_step: f32,
    /// Degrees per terminal cell dragged with the left button
    pub drag_rotation_factor: f32,
    /// Pan offset per terminal cell dragged with the right button
    pub drag_pan_factor: f32,
    /// Eye distance change per wheel notch
    pub wheel_zoom_factor: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        CameraSettings {
            eye_distance: 10.0,
            key_rotation_step: 1.0,
            key_zoom_step: 0.1,
            drag_rotation_factor: 1.0,
            drag_pan_factor: 0.05,
            wheel_zoom_factor: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyDirection {
    Left,
    Right,
    Up,
    Down,
    ZoomIn,
    ZoomOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragButton {
    Left,
    Right,
    Middle,
}

/// Interactive camera orbiting the origin.
///
/// None of the fields is range-limited: zooming through the origin or
/// rotating past a full turn is accepted as is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye_distance: f32,
    pub pan_x: f32,
    pub pan_y: f32,
    /// Rotation about the X axis in degrees
    pub rotation_x: f32,
    /// Rotation about the Y axis in degrees
    pub rotation_y: f32,
    settings: CameraSettings,
}

impl Default for Camera {
    fn default() -> Self {
        Camera::new(CameraSettings::default())
    }
}

impl Camera {
    pub fn new(settings: CameraSettings) -> Self {
        Camera {
            eye_distance: settings.eye_distance,
            pan_x: 0.0,
            pan_y: 0.0,
            rotation_x: 0.0,
            rotation_y: 0.0,
            settings,
        }
    }

    /// Back to the starting pose
    pub fn reset(&mut self) {
        *self = Camera::new(self.settings);
    }

    pub fn on_key(&mut self, direction: KeyDirection) {
        let step = self.settings.key_rotation_step;
        match direction {
            KeyDirection::Left => self.rotation_y += step,
            KeyDirection::Right => self.rotation_y -= step,
            KeyDirection::Up => self.rotation_x += step,
            KeyDirection::Down => self.rotation_x -= step,
            KeyDirection::ZoomIn => self.eye_distance -= self.settings.key_zoom_step,
            KeyDirection::ZoomOut => self.eye_distance += self.settings.key_zoom_step,
        }
    }

    /// Applies a drag delta in terminal cells; y grows downward
    pub fn on_mouse_drag(&mut self, button: DragButton, delta_x: f32, delta_y: f32) {
        match button {
            DragButton::Left => {
                self.rotation_y += delta_x * self.settings.drag_rotation_factor;
                self.rotation_x += delta_y * self.settings.drag_rotation_factor;
            }
            DragButton::Right => {
                self.pan_x += delta_x * self.settings.drag_pan_factor;
                self.pan_y -= delta_y * self.settings.drag_pan_factor;
            }
            DragButton::Middle => {}
        }
    }

    /// Positive notches move the eye away from the origin
    pub fn on_mouse_wheel(&mut self, notches: f32) {
        self.eye_distance += notches * self.settings.wheel_zoom_factor;
    }

    /// Model-view transform: look-at, then pan, then rotate about X, then about Y
    pub fn view_transform(&self) -> Mat4 {
        let eye = Vec3::new(0.0, 0.0, self.eye_distance);
        Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y)
            * Mat4::from_translation(Vec3::new(self.pan_x, self.pan_y, 0.0))
            * Mat4::from_rotation_x(self.rotation_x.to_radians())
            * Mat4::from_rotation_y(self.rotation_y.to_radians())
    }
}
