use crate::backend::Material;
use glam::{Vec2, Vec3};
use serde::Deserialize;

/// Positional light in eye coordinates
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Light {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            position: Vec3::new(0.0, 2.0, 6.0),
            ambient: Vec3::ONE,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
        }
    }
}

/// Edge function used in rasterization
pub fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

/// Unit normal of a counter-clockwise triangle, zero when degenerate
pub fn calculate_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

/// Fixed-function lighting of a surface point (Blinn-Phong, infinite viewer)
pub fn shade(material: &Material, light: &Light, normal: Vec3, position: Vec3) -> Vec3 {
    let to_light = (light.position - position).normalize_or_zero();
    let diffuse = normal.dot(to_light).max(0.0);
    let specular = if diffuse > 0.0 {
        let half = (to_light + Vec3::Z).normalize_or_zero();
        normal.dot(half).max(0.0).powf(material.shininess)
    } else {
        0.0
    };

    let color = material.emission
        + material.ambient * light.ambient
        + material.diffuse * light.diffuse * diffuse
        + material.specular * light.specular * specular;
    color.clamp(Vec3::ZERO, Vec3::ONE)
}

/// Converts a [0, 1] colour to 8-bit channels
pub fn to_rgb8(color: Vec3) -> [u8; 3] {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8]
}
