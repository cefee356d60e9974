use crate::backend::{Backend, CullFace, Material, PolygonMode, PrimitiveKind, RenderState};
use crate::math::{calculate_normal, edge_function, shade, Light};
use crate::vertex::{ScreenVertex, Vertex};
use glam::{Mat4, Vec2, Vec3};

/// Colour and depth buffers
pub struct FrameBuffer {
    width: usize,
    height: usize,
    color: Vec<Vec3>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            color: vec![Vec3::ZERO; width * height],
            depth: vec![f32::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Vec3 {
        self.color[y * self.width + x]
    }

    pub fn clear(&mut self, color: Vec3) {
        self.color.fill(color);
        self.depth.fill(f32::INFINITY);
    }

    /// Depth-tested write, clipped to the near and far planes
    fn plot(&mut self, x: usize, y: usize, depth: f32, color: Vec3) {
        if !(-1.0..=1.0).contains(&depth) {
            return;
        }
        let offset = y * self.width + x;
        if depth < self.depth[offset] {
            self.depth[offset] = depth;
            self.color[offset] = color;
        }
    }
}

/// Fills a triangle of either winding with a flat colour
pub fn draw_triangle(
    v0: &ScreenVertex,
    v1: &ScreenVertex,
    v2: &ScreenVertex,
    color: Vec3,
    frame: &mut FrameBuffer,
) {
    if frame.width == 0 || frame.height == 0 {
        return;
    }

    // Precompute area of the triangle
    let area = edge_function(v0.screen_position, v1.screen_position, v2.screen_position);
    if area == 0.0 || !area.is_finite() {
        return;
    }

    // Compute bounding box of the triangle
    let min = v0
        .screen_position
        .min(v1.screen_position)
        .min(v2.screen_position)
        .floor()
        .max(Vec2::ZERO);
    let max = v0
        .screen_position
        .max(v1.screen_position)
        .max(v2.screen_position)
        .ceil()
        .min(Vec2::new(frame.width as f32 - 1.0, frame.height as f32 - 1.0));
    if min.x > max.x || min.y > max.y {
        return;
    }

    for y in min.y as usize..=max.y as usize {
        for x in min.x as usize..=max.x as usize {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            // Normalized barycentric coordinates, positive inside for both windings
            let w0 = edge_function(v1.screen_position, v2.screen_position, p) / area;
            let w1 = edge_function(v2.screen_position, v0.screen_position, p) / area;
            let w2 = edge_function(v0.screen_position, v1.screen_position, p) / area;

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
                frame.plot(x, y, depth, color);
            }
        }
    }
}

/// Parameter range `[t0, t1]` of the segment `a..b` that lies inside a
/// `width` x `height` pixel grid (Liang-Barsky), `None` when fully outside
pub fn clip_to_frame(a: Vec2, b: Vec2, width: usize, height: usize) -> Option<(f32, f32)> {
    if width == 0 || height == 0 || !a.is_finite() || !b.is_finite() {
        return None;
    }
    let max = Vec2::new(width as f32 - 1.0, height as f32 - 1.0);
    let d = b - a;
    let (mut t0, mut t1) = (0.0f32, 1.0f32);
    for (p, q) in [(-d.x, a.x), (d.x, max.x - a.x), (-d.y, a.y), (d.y, max.y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Draws a depth-tested line between two vertices using Bresenham's algorithm.
/// The segment is clipped to the frame first.
pub fn draw_line(v0: &ScreenVertex, v1: &ScreenVertex, color: Vec3, frame: &mut FrameBuffer) {
    let (a, b) = (v0.screen_position, v1.screen_position);
    let Some((t0, t1)) = clip_to_frame(a, b, frame.width, frame.height) else {
        return;
    };
    let (start, end) = (a.lerp(b, t0), a.lerp(b, t1));
    let depth0 = v0.depth + (v1.depth - v0.depth) * t0;
    let depth1 = v0.depth + (v1.depth - v0.depth) * t1;

    let (mut x0, mut y0, x1, y1) = (
        start.x.round() as isize,
        start.y.round() as isize,
        end.x.round() as isize,
        end.y.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy
    let steps = dx.max(-dy).max(1) as f32;
    let mut step = 0.0;

    loop {
        if x0 >= 0 && x0 < frame.width as isize && y0 >= 0 && y0 < frame.height as isize {
            let depth = depth0 + (depth1 - depth0) * (step / steps);
            frame.plot(x0 as usize, y0 as usize, depth, color);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1.0;
    }
}

/// Software implementation of the immediate-mode backend
pub struct Rasterizer {
    frame: FrameBuffer,
    projection: Mat4,
    /// Model-view stack; the last entry is current and the stack is never empty
    transforms: Vec<Mat4>,
    state: RenderState,
    material: Material,
    light: Light,
    clear_color: Vec3,
    primitive: Option<PrimitiveKind>,
    vertices: Vec<Vertex>,
    triangles_drawn: usize,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize, light: Light, clear_color: Vec3) -> Self {
        Rasterizer {
            frame: FrameBuffer::new(width, height),
            projection: Mat4::IDENTITY,
            transforms: vec![Mat4::IDENTITY],
            state: RenderState::default(),
            material: Material::default(),
            light,
            clear_color,
            primitive: None,
            vertices: Vec::new(),
            triangles_drawn: 0,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.frame.width || height != self.frame.height {
            self.frame = FrameBuffer::new(width, height);
        }
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Triangles rasterized since the last clear
    pub fn triangles_drawn(&self) -> usize {
        self.triangles_drawn
    }

    fn current(&mut self) -> &mut Mat4 {
        // The stack keeps its base entry, see `pop_transform`
        let last = self.transforms.len() - 1;
        &mut self.transforms[last]
    }

    fn project(&self, position: Vec3) -> Option<ScreenVertex> {
        let clip = self.projection * position.extend(1.0);
        if clip.w <= f32::EPSILON || !clip.is_finite() {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let screen_position = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.frame.width as f32,
            (1.0 - ndc.y) * 0.5 * self.frame.height as f32,
        );
        Some(ScreenVertex {
            screen_position,
            depth: ndc.z,
        })
    }

    /// Rasterizes one eye-space triangle
    fn draw_face(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let (Some(sa), Some(sb), Some(sc)) = (self.project(a), self.project(b), self.project(c))
        else {
            return;
        };

        // Counter-clockwise in normalized device coordinates; screen y points down
        let front_facing =
            edge_function(sa.screen_position, sb.screen_position, sc.screen_position) > 0.0;
        if self.state.cull_face == CullFace::Enabled && !front_facing {
            return;
        }

        let color = if self.state.lighting_enabled {
            let normal = calculate_normal(a, b, c);
            // Back faces are lit from their visible side
            let normal = if front_facing { normal } else { -normal };
            shade(&self.material, &self.light, normal, (a + b + c) / 3.0)
        } else {
            self.material.color
        };

        match self.state.polygon_mode {
            PolygonMode::Fill => draw_triangle(&sa, &sb, &sc, color, &mut self.frame),
            PolygonMode::Line => {
                draw_line(&sa, &sb, color, &mut self.frame);
                draw_line(&sb, &sc, color, &mut self.frame);
                draw_line(&sc, &sa, color, &mut self.frame);
            }
        }
        self.triangles_drawn += 1;
    }
}

impl Backend for Rasterizer {
    fn clear(&mut self) {
        self.frame.clear(self.clear_color);
        self.triangles_drawn = 0;
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    fn load_transform(&mut self, transform: Mat4) {
        *self.current() = transform;
    }

    fn push_transform(&mut self) {
        let top = *self.current();
        self.transforms.push(top);
    }

    fn pop_transform(&mut self) {
        if self.transforms.len() > 1 {
            self.transforms.pop();
        } else {
            tracing::warn!("model-view stack underflow ignored");
        }
    }

    fn translate(&mut self, offset: Vec3) {
        *self.current() *= Mat4::from_translation(offset);
    }

    fn scale(&mut self, factors: Vec3) {
        *self.current() *= Mat4::from_scale(factors);
    }

    fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        if axis != Vec3::ZERO {
            *self.current() *= Mat4::from_axis_angle(axis, angle_deg.to_radians());
        }
    }

    fn set_render_state(&mut self, state: RenderState) {
        self.state = state;
    }

    fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    fn begin_primitive(&mut self, kind: PrimitiveKind) {
        if self.primitive.is_some() {
            tracing::warn!(?kind, "primitive begun inside another, previous one dropped");
        }
        self.primitive = Some(kind);
        self.vertices.clear();
    }

    fn emit_vertex(&mut self, vertex: Vertex) {
        if self.primitive.is_some() {
            self.vertices.push(vertex);
        }
    }

    fn end_primitive(&mut self) {
        let Some(kind) = self.primitive.take() else {
            tracing::warn!("end_primitive without begin_primitive");
            return;
        };
        let model_view = *self.current();
        let eye: Vec<Vec3> = self
            .vertices
            .drain(..)
            .map(|v| model_view.transform_point3(v))
            .collect();
        for [a, b, c] in kind.triangles(eye.len()) {
            self.draw_face(eye[a], eye[b], eye[c]);
        }
    }
}
