//! Procedural geometry for the demo's primitive shapes.
//!
//! Every generator is a pure function returning the ordered vertex sequence
//! of one or more strips/fans. Front faces are wound counter-clockwise when
//! seen from outside the solid.

use crate::backend::PrimitiveKind;
use crate::vertex::Vertex;
use glam::Vec3;
use serde::Deserialize;
use std::f32::consts::PI;

/// Fewest slices that still close a ring
pub const MIN_SLICES: u32 = 3;
pub const MIN_STACKS: u32 = 1;

/// A strip or fan ready to be emitted to a backend
#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub vertices: Vec<Vertex>,
}

impl Primitive {
    fn strip(vertices: Vec<Vertex>) -> Self {
        Primitive {
            kind: PrimitiveKind::TriangleStrip,
            vertices,
        }
    }

    fn fan(vertices: Vec<Vertex>) -> Self {
        Primitive {
            kind: PrimitiveKind::TriangleFan,
            vertices,
        }
    }
}

/// Shape descriptor: kind, dimensions and tessellation
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Shape {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
        slices: u32,
        stacks: u32,
    },
    /// Open barrel, no end caps
    Cylinder {
        base: f32,
        top: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    },
    /// Barrel closed by a fan at each end
    Frustum {
        base: f32,
        top: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    },
}

impl Shape {
    pub fn generate(&self) -> Vec<Primitive> {
        match *self {
            Shape::Box {
                width,
                height,
                depth,
            } => vec![box_strip(width, height, depth)],
            Shape::Sphere {
                radius,
                slices,
                stacks,
            } => sphere(radius, slices, stacks),
            Shape::Cylinder {
                base,
                top,
                height,
                slices,
                stacks,
            } => cylinder(base, top, height, slices, stacks),
            Shape::Frustum {
                base,
                top,
                height,
                slices,
                stacks,
            } => frustum(base, top, height, slices, stacks),
        }
    }
}

/// Non-positive and NaN dimensions collapse to zero
fn extent(value: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        0.0
    }
}

fn clamp_slices(slices: u32) -> u32 {
    slices.max(MIN_SLICES)
}

fn clamp_stacks(stacks: u32) -> u32 {
    stacks.max(MIN_STACKS)
}

/// Point `index` of a ring of `slices` points; `index == slices` wraps to 0
fn circle_point(radius: f32, index: u32, slices: u32, z: f32) -> Vertex {
    let theta = (index % slices) as f32 * 2.0 * PI / slices as f32;
    let (sin, cos) = theta.sin_cos();
    Vec3::new(radius * cos, radius * sin, z)
}

/// Box centred at the origin as a single 14-vertex triangle strip
pub fn box_strip(width: f32, height: f32, depth: f32) -> Primitive {
    let hw = extent(width) / 2.0;
    let hh = extent(height) / 2.0;
    let hd = extent(depth) / 2.0;

    // Front face (+z) then back face (-z), each top-left clockwise
    let v = [
        Vec3::new(-hw, hh, hd),
        Vec3::new(hw, hh, hd),
        Vec3::new(hw, -hh, hd),
        Vec3::new(-hw, -hh, hd),
        Vec3::new(-hw, hh, -hd),
        Vec3::new(hw, hh, -hd),
        Vec3::new(hw, -hh, -hd),
        Vec3::new(-hw, -hh, -hd),
    ];

    // 12 triangles need 14 emissions; shared edges revisit corners
    let order = [
        2, 3, 6, 7, // bottom
        4, // back, bottom left
        3, 0, // left
        2, 1, // front
        6, 5, // right
        4, // back, top right
        1, 0, // top
    ];
    Primitive::strip(order.iter().map(|&i| v[i]).collect())
}

/// Cross-section rings of a barrel, from z = 0 to z = height
pub fn barrel_rings(
    base: f32,
    top: f32,
    height: f32,
    slices: u32,
    stacks: u32,
) -> Vec<Vec<Vertex>> {
    let slices = clamp_slices(slices);
    let stacks = clamp_stacks(stacks);
    let (base, top, height) = (extent(base), extent(top), extent(height));

    (0..=stacks)
        .map(|j| {
            let t = j as f32 / stacks as f32;
            let radius = base + (top - base) * t;
            let z = height * t;
            (0..slices)
                .map(|i| circle_point(radius, i, slices, z))
                .collect()
        })
        .collect()
}

/// Lateral surface, one strip per stack
pub fn barrel(base: f32, top: f32, height: f32, slices: u32, stacks: u32) -> Vec<Primitive> {
    let rings = barrel_rings(base, top, height, slices, stacks);
    rings
        .windows(2)
        .map(|band| {
            let (lower, upper) = (&band[0], &band[1]);
            let n = lower.len();
            let vertices = (0..=n)
                .flat_map(|i| [upper[i % n], lower[i % n]])
                .collect();
            Primitive::strip(vertices)
        })
        .collect()
}

/// Fans closing a barrel: the base facing -z and the top facing +z
pub fn end_caps(base: f32, top: f32, height: f32, slices: u32) -> [Primitive; 2] {
    let slices = clamp_slices(slices);
    let (base, top, height) = (extent(base), extent(top), extent(height));

    let mut bottom = Vec::with_capacity(slices as usize + 2);
    bottom.push(Vec3::ZERO);
    bottom.extend((0..=slices).rev().map(|i| circle_point(base, i, slices, 0.0)));

    let mut upper = Vec::with_capacity(slices as usize + 2);
    upper.push(Vec3::new(0.0, 0.0, height));
    upper.extend((0..=slices).map(|i| circle_point(top, i, slices, height)));

    [Primitive::fan(bottom), Primitive::fan(upper)]
}

/// Open barrel
pub fn cylinder(base: f32, top: f32, height: f32, slices: u32, stacks: u32) -> Vec<Primitive> {
    barrel(base, top, height, slices, stacks)
}

/// Barrel closed at both ends
pub fn frustum(base: f32, top: f32, height: f32, slices: u32, stacks: u32) -> Vec<Primitive> {
    let mut primitives = barrel(base, top, height, slices, stacks);
    primitives.extend(end_caps(base, top, height, slices));
    primitives
}

/// Latitude/longitude sphere around the z axis.
///
/// The polar bands are fans around the poles; a single stack degenerates to
/// one strip joining them.
pub fn sphere(radius: f32, slices: u32, stacks: u32) -> Vec<Primitive> {
    let slices = clamp_slices(slices);
    let stacks = clamp_stacks(stacks);
    let radius = extent(radius);

    let point = |stack: u32, slice: u32| {
        let phi = PI * stack as f32 / stacks as f32;
        let theta = 2.0 * PI * (slice % slices) as f32 / slices as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        radius * Vec3::new(sin_phi * cos_theta, sin_phi * sin_theta, cos_phi)
    };
    let band = |stack: u32| -> Primitive {
        Primitive::strip(
            (0..=slices)
                .flat_map(|i| [point(stack, i), point(stack + 1, i)])
                .collect(),
        )
    };

    if stacks == 1 {
        return vec![band(0)];
    }

    let north = Vec3::new(0.0, 0.0, radius);
    let south = Vec3::new(0.0, 0.0, -radius);
    let mut primitives = Vec::with_capacity(stacks as usize);

    primitives.push(Primitive::fan(
        std::iter::once(north)
            .chain((0..=slices).map(|i| point(1, i)))
            .collect(),
    ));
    primitives.extend((1..stacks - 1).map(band));
    primitives.push(Primitive::fan(
        std::iter::once(south)
            .chain((0..=slices).rev().map(|i| point(stacks - 1, i)))
            .collect(),
    ));
    primitives
}
