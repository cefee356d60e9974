use crate::backend::{Backend, CullFace, RenderState};
use crate::camera::Camera;
use crate::scene::Scene;
use glam::Mat4;

pub const FIELD_OF_VIEW_DEG: f32 = 45.0;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Perspective projection for a viewport; a zero height counts as one
pub fn perspective(width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height.max(1) as f32;
    Mat4::perspective_rh_gl(
        FIELD_OF_VIEW_DEG.to_radians(),
        aspect,
        NEAR_PLANE,
        FAR_PLANE,
    )
}

/// Callbacks a windowing collaborator drives
pub trait FrameHandler {
    fn on_init(&mut self, backend: &mut dyn Backend);
    fn on_resize(&mut self, backend: &mut dyn Backend, width: u32, height: u32);
    fn on_frame(&mut self, backend: &mut dyn Backend, camera: &Camera);
    fn on_dispose(&mut self, backend: &mut dyn Backend);
}

/// Draws every placement of a scene from the camera's point of view
pub struct ShapesRenderer {
    scene: Scene,
    render_state: RenderState,
    frames: u64,
}

impl ShapesRenderer {
    pub fn new(scene: Scene, render_state: RenderState) -> Self {
        ShapesRenderer {
            scene,
            render_state,
            frames: 0,
        }
    }

    pub fn render_state(&self) -> RenderState {
        self.render_state
    }

    pub fn render_state_mut(&mut self) -> &mut RenderState {
        &mut self.render_state
    }
}

impl FrameHandler for ShapesRenderer {
    fn on_init(&mut self, backend: &mut dyn Backend) {
        tracing::info!(
            objects = self.scene.objects.len(),
            render_state = ?self.render_state,
            "renderer initialized"
        );
        backend.set_render_state(self.render_state);
    }

    fn on_resize(&mut self, backend: &mut dyn Backend, width: u32, height: u32) {
        tracing::debug!(width, height, "viewport resized");
        backend.set_projection(perspective(width, height));
    }

    fn on_frame(&mut self, backend: &mut dyn Backend, camera: &Camera) {
        backend.set_render_state(self.render_state);
        backend.clear();
        backend.load_transform(camera.view_transform());

        for placement in &self.scene.objects {
            backend.push_transform();
            backend.translate(placement.translation);
            if let Some(rotation) = placement.rotation {
                backend.rotate(rotation.angle, rotation.axis);
            }
            backend.scale(placement.scale);
            for part in placement.model.parts() {
                backend.push_transform();
                backend.translate(part.offset);
                backend.set_material(part.material);
                backend.draw(&part.shape.generate());
                backend.pop_transform();
            }
            backend.pop_transform();
        }
        self.frames += 1;
    }

    fn on_dispose(&mut self, backend: &mut dyn Backend) {
        backend.set_render_state(RenderState {
            cull_face: CullFace::Disabled,
            ..self.render_state
        });
        tracing::info!(frames = self.frames, "renderer disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{Material, PrimitiveKind};
    use crate::graphics::Rasterizer;
    use crate::math::Light;
    use crate::scene::{MaterialName, Model, Placement, Rotation};
    use crate::shapes::Shape;
    use crate::vertex::Vertex;
    use glam::Vec3;

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Projection(Mat4),
        Load(Mat4),
        Push,
        Pop,
        Translate(Vec3),
        Scale(Vec3),
        Rotate(f32, Vec3),
        State(RenderState),
        Material(Material),
        Begin(PrimitiveKind),
        Vertex(Vertex),
        End,
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Backend for Recorder {
        fn clear(&mut self) {
            self.calls.push(Call::Clear);
        }
        fn set_projection(&mut self, projection: Mat4) {
            self.calls.push(Call::Projection(projection));
        }
        fn load_transform(&mut self, transform: Mat4) {
            self.calls.push(Call::Load(transform));
        }
        fn push_transform(&mut self) {
            self.calls.push(Call::Push);
        }
        fn pop_transform(&mut self) {
            self.calls.push(Call::Pop);
        }
        fn translate(&mut self, offset: Vec3) {
            self.calls.push(Call::Translate(offset));
        }
        fn scale(&mut self, factors: Vec3) {
            self.calls.push(Call::Scale(factors));
        }
        fn rotate(&mut self, angle_deg: f32, axis: Vec3) {
            self.calls.push(Call::Rotate(angle_deg, axis));
        }
        fn set_render_state(&mut self, state: RenderState) {
            self.calls.push(Call::State(state));
        }
        fn set_material(&mut self, material: Material) {
            self.calls.push(Call::Material(material));
        }
        fn begin_primitive(&mut self, kind: PrimitiveKind) {
            self.calls.push(Call::Begin(kind));
        }
        fn emit_vertex(&mut self, vertex: Vertex) {
            self.calls.push(Call::Vertex(vertex));
        }
        fn end_primitive(&mut self) {
            self.calls.push(Call::End);
        }
    }

    fn single_box_scene() -> Scene {
        Scene {
            objects: vec![Placement {
                model: Model::Shape {
                    shape: Shape::Box {
                        width: 1.0,
                        height: 1.0,
                        depth: 1.0,
                    },
                    material: MaterialName::Blue,
                },
                translation: Vec3::new(1.0, 2.0, 0.0),
                rotation: None,
                scale: Vec3::new(2.0, 1.0, 1.0),
            }],
            ..Scene::default()
        }
    }

    #[test]
    fn projection_uses_the_viewport_aspect() {
        let mut renderer = ShapesRenderer::new(Scene::default(), RenderState::default());
        let mut recorder = Recorder::default();
        renderer.on_resize(&mut recorder, 200, 100);
        renderer.on_resize(&mut recorder, 80, 0);
        let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 2.0, 0.1, 100.0);
        assert_eq!(recorder.calls[0], Call::Projection(expected));
        let expected = Mat4::perspective_rh_gl(45f32.to_radians(), 80.0, 0.1, 100.0);
        assert_eq!(recorder.calls[1], Call::Projection(expected));
    }

    #[test]
    fn frame_places_each_object_before_drawing_it() {
        let state = RenderState::default();
        let mut renderer = ShapesRenderer::new(single_box_scene(), state);
        let camera = Camera::default();
        let mut recorder = Recorder::default();
        renderer.on_frame(&mut recorder, &camera);

        let calls = &recorder.calls;
        assert_eq!(
            calls[..9],
            [
                Call::State(state),
                Call::Clear,
                Call::Load(camera.view_transform()),
                Call::Push,
                Call::Translate(Vec3::new(1.0, 2.0, 0.0)),
                Call::Scale(Vec3::new(2.0, 1.0, 1.0)),
                Call::Push,
                Call::Translate(Vec3::ZERO),
                Call::Material(MaterialName::Blue.material()),
            ]
        );
        assert_eq!(calls[9], Call::Begin(PrimitiveKind::TriangleStrip));
        let vertices = calls.iter().filter(|c| matches!(c, Call::Vertex(_))).count();
        assert_eq!(vertices, 14);
        assert_eq!(calls[calls.len() - 3..], [Call::End, Call::Pop, Call::Pop]);
        assert_eq!(renderer.frames, 1);
    }

    #[test]
    fn rotation_sits_between_translation_and_scale() {
        let mut scene = single_box_scene();
        scene.objects[0].rotation = Some(Rotation {
            angle: 30.0,
            axis: Vec3::Z,
        });
        let mut renderer = ShapesRenderer::new(scene, RenderState::default());
        let mut recorder = Recorder::default();
        renderer.on_frame(&mut recorder, &Camera::default());

        assert_eq!(
            recorder.calls[4..7],
            [
                Call::Translate(Vec3::new(1.0, 2.0, 0.0)),
                Call::Rotate(30.0, Vec3::Z),
                Call::Scale(Vec3::new(2.0, 1.0, 1.0)),
            ]
        );
    }

    #[test]
    fn transform_stack_is_balanced_per_frame() {
        let mut renderer = ShapesRenderer::new(Scene::forest().unwrap(), RenderState::default());
        let mut recorder = Recorder::default();
        renderer.on_frame(&mut recorder, &Camera::default());

        let pushes = recorder.calls.iter().filter(|c| **c == Call::Push).count();
        let pops = recorder.calls.iter().filter(|c| **c == Call::Pop).count();
        assert_eq!(pushes, 16 * 3);
        assert_eq!(pushes, pops);
        let begins = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Begin(_)))
            .count();
        let ends = recorder.calls.iter().filter(|c| **c == Call::End).count();
        assert_eq!(begins, ends);
    }

    #[test]
    fn dispose_switches_culling_off() {
        let state = RenderState {
            cull_face: CullFace::Enabled,
            ..RenderState::default()
        };
        let mut renderer = ShapesRenderer::new(Scene::default(), state);
        let mut recorder = Recorder::default();
        renderer.on_init(&mut recorder);
        renderer.on_dispose(&mut recorder);
        assert_eq!(
            recorder.calls,
            [
                Call::State(state),
                Call::State(RenderState {
                    cull_face: CullFace::Disabled,
                    ..state
                }),
            ]
        );
    }

    #[test]
    fn forest_renders_through_the_rasterizer() {
        let background = Vec3::ONE;
        let mut rasterizer = Rasterizer::new(64, 48, Light::default(), background);
        let mut renderer = ShapesRenderer::new(Scene::forest().unwrap(), RenderState::default());
        renderer.on_init(&mut rasterizer);
        renderer.on_resize(&mut rasterizer, 64, 48);
        renderer.on_frame(&mut rasterizer, &Camera::default());

        assert!(rasterizer.triangles_drawn() > 0);
        let frame = rasterizer.frame();
        let covered = (0..frame.height())
            .flat_map(|y| (0..frame.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.pixel(x, y) != background)
            .count();
        assert!(covered > 0);
    }
}
