//! Immediate-mode rendering interface consumed by the shapes renderer.
//!
//! The calls mirror a fixed-function pipeline: primitives are opened, fed
//! vertices one by one and closed, and placement happens through a
//! model-view transform stack.

use crate::shapes::Primitive;
use crate::vertex::Vertex;
use glam::{Mat4, Vec3};

/// How the vertices of a primitive are connected into triangles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Each new vertex forms a triangle with the previous two
    TriangleStrip,
    /// Every triangle shares the first vertex
    TriangleFan,
}

impl PrimitiveKind {
    /// Index triples for a primitive of `count` vertices.
    ///
    /// Every triangle keeps the winding of the first one, so odd strip
    /// triangles swap their leading pair.
    pub fn triangles(self, count: usize) -> Vec<[usize; 3]> {
        if count < 3 {
            return Vec::new();
        }
        match self {
            PrimitiveKind::TriangleStrip => (0..count - 2)
                .map(|k| {
                    if k % 2 == 0 {
                        [k, k + 1, k + 2]
                    } else {
                        [k + 1, k, k + 2]
                    }
                })
                .collect(),
            PrimitiveKind::TriangleFan => (1..count - 1).map(|k| [0, k, k + 1]).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolygonMode {
    #[default]
    Fill,
    Line,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullFace {
    Enabled,
    #[default]
    Disabled,
}

/// Rasterization toggles applied to every following primitive
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderState {
    pub polygon_mode: PolygonMode,
    pub lighting_enabled: bool,
    pub cull_face: CullFace,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            polygon_mode: PolygonMode::Fill,
            lighting_enabled: true,
            cull_face: CullFace::Disabled,
        }
    }
}

impl RenderState {
    pub fn toggle_polygon_mode(&mut self) {
        self.polygon_mode = match self.polygon_mode {
            PolygonMode::Fill => PolygonMode::Line,
            PolygonMode::Line => PolygonMode::Fill,
        };
    }

    pub fn toggle_cull_face(&mut self) {
        self.cull_face = match self.cull_face {
            CullFace::Enabled => CullFace::Disabled,
            CullFace::Disabled => CullFace::Enabled,
        };
    }
}

/// Surface reflectance in the fixed-function lighting model
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emission: Vec3,
    pub shininess: f32,
    /// Flat colour used while lighting is disabled
    pub color: Vec3,
}

impl Material {
    pub const WOOD_BROWN: Material = Material {
        ambient: Vec3::new(0.0, 0.1, 0.0),
        diffuse: Vec3::ZERO,
        specular: Vec3::new(0.3, 0.3, 0.3),
        emission: Vec3::new(0.647059, 0.164706, 0.164706),
        shininess: 0.5,
        color: Vec3::new(0.647059, 0.164706, 0.164706),
    };

    pub const LEAF_GREEN: Material = Material {
        ambient: Vec3::new(0.0, 0.1, 0.0),
        diffuse: Vec3::new(0.0, 0.5, 0.0),
        specular: Vec3::new(0.3, 0.3, 0.3),
        emission: Vec3::ZERO,
        shininess: 1.0,
        color: Vec3::new(0.0, 0.5, 0.0),
    };

    /// Material for a plain vertex colour, lit like the default GL material
    pub fn plain(color: Vec3) -> Material {
        Material {
            ambient: color * 0.2,
            diffuse: color * 0.8,
            specular: Vec3::ZERO,
            emission: Vec3::ZERO,
            shininess: 0.0,
            color,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material::plain(Vec3::ONE)
    }
}

/// Immediate-mode rendering backend
pub trait Backend {
    /// Clears colour and depth
    fn clear(&mut self);
    fn set_projection(&mut self, projection: Mat4);
    /// Replaces the current model-view transform
    fn load_transform(&mut self, transform: Mat4);
    fn push_transform(&mut self);
    fn pop_transform(&mut self);
    fn translate(&mut self, offset: Vec3);
    fn scale(&mut self, factors: Vec3);
    fn rotate(&mut self, angle_deg: f32, axis: Vec3);
    fn set_render_state(&mut self, state: RenderState);
    fn set_material(&mut self, material: Material);
    fn begin_primitive(&mut self, kind: PrimitiveKind);
    fn emit_vertex(&mut self, vertex: Vertex);
    fn end_primitive(&mut self);

    /// Emits every primitive of a generated shape
    fn draw(&mut self, primitives: &[Primitive]) {
        for primitive in primitives {
            self.begin_primitive(primitive.kind);
            for &vertex in &primitive.vertices {
                self.emit_vertex(vertex);
            }
            self.end_primitive();
        }
    }
}
