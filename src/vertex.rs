use glam::{Vec2, Vec3};

/// Vertex position in model space
pub type Vertex = Vec3;

/// Projected vertex with screen position and depth
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenVertex {
    pub screen_position: Vec2,
    /// Normalized device depth in [-1, 1]
    pub depth: f32,
}
