use crate::camera::{DragButton, KeyDirection};
use crate::graphics::{FrameBuffer, Rasterizer};
use crate::math::{to_rgb8, Light};
use crate::renderer::{FrameHandler, ShapesRenderer};
use crate::state::AppState;
use crossterm::cursor::MoveTo;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use glam::Vec3;
use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Background colour of the canvas
pub const CLEAR_COLOR: Vec3 = Vec3::ONE;

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: char = '\u{2580}';

fn terminal_color(color: Vec3) -> Color {
    let [r, g, b] = to_rgb8(color);
    Color::Rgb { r, g, b }
}

/// Writes a frame as half-block cells, two pixel rows per terminal row.
///
/// With `positioned` every row starts with a cursor move; otherwise rows are
/// separated by newlines for plain output streams.
pub fn write_frame<W: Write>(
    out: &mut W,
    frame: &FrameBuffer,
    positioned: bool,
) -> io::Result<()> {
    let rows = frame.height().div_ceil(2);
    for row in 0..rows {
        if positioned {
            queue!(out, MoveTo(0, row as u16))?;
        }
        let mut last = None;
        for x in 0..frame.width() {
            let top = frame.pixel(x, 2 * row);
            let bottom = if 2 * row + 1 < frame.height() {
                frame.pixel(x, 2 * row + 1)
            } else {
                CLEAR_COLOR
            };
            let colors = (to_rgb8(top), to_rgb8(bottom));
            if last != Some(colors) {
                queue!(
                    out,
                    SetForegroundColor(terminal_color(top)),
                    SetBackgroundColor(terminal_color(bottom))
                )?;
                last = Some(colors);
            }
            queue!(out, Print(HALF_BLOCK))?;
        }
        queue!(out, ResetColor)?;
        if !positioned {
            queue!(out, Print('\n'))?;
        }
    }
    out.flush()
}

/// Terminal canvas for the shapes scene
pub struct Canvas {
    renderer: ShapesRenderer,
    rasterizer: Rasterizer,
    frames_since_last_update: usize,
    last_fps_calculation: Instant,
    fps: f64,
    /// Button held down and the last cell it was seen at
    drag: Option<(DragButton, u16, u16)>,
    columns: u16,
    rows: u16,
    disposed: bool,
}

impl Canvas {
    pub fn new(renderer: ShapesRenderer, light: Light, columns: u16, rows: u16) -> Self {
        let mut canvas = Canvas {
            renderer,
            rasterizer: Rasterizer::new(0, 0, light, CLEAR_COLOR),
            frames_since_last_update: 0,
            last_fps_calculation: Instant::now(),
            fps: 0.0,
            drag: None,
            columns: 0,
            rows: 0,
            disposed: false,
        };
        canvas.renderer.on_init(&mut canvas.rasterizer);
        canvas.resize(columns, rows);
        canvas
    }

    /// Each cell holds two vertically stacked pixels
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        let (width, height) = (columns as u32, rows as u32 * 2);
        self.rasterizer.resize(width as usize, height as usize);
        self.renderer.on_resize(&mut self.rasterizer, width, height);
    }

    /// Routes one terminal event into the application state
    pub fn event(&mut self, event: &Event, data: &mut AppState) {
        match event {
            Event::Key(key_event) => self.key(key_event, data),
            Event::Mouse(mouse_event) => {
                if !data.paused {
                    self.mouse(mouse_event, data);
                }
            }
            Event::Resize(columns, rows) => self.resize(*columns, *rows),
            _ => {}
        }
    }

    fn key(&mut self, key_event: &KeyEvent, data: &mut AppState) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        match key_event.code {
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                data.quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => data.quit = true,
            KeyCode::Char('d') | KeyCode::Char('D') => data.debug = !data.debug,
            KeyCode::Char('p') | KeyCode::Char('P') => {
                data.paused = !data.paused;
                // Reset any drag that was captured
                self.drag = None;
            }
            _ if data.paused => {}
            KeyCode::Left => data.camera.on_key(KeyDirection::Left),
            KeyCode::Right => data.camera.on_key(KeyDirection::Right),
            KeyCode::Up => data.camera.on_key(KeyDirection::Up),
            KeyCode::Down => data.camera.on_key(KeyDirection::Down),
            KeyCode::Char('+') | KeyCode::Char('=') => data.camera.on_key(KeyDirection::ZoomIn),
            KeyCode::Char('-') => data.camera.on_key(KeyDirection::ZoomOut),
            KeyCode::Char('w') | KeyCode::Char('W') => {
                self.renderer.render_state_mut().toggle_polygon_mode();
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                let state = self.renderer.render_state_mut();
                state.lighting_enabled = !state.lighting_enabled;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.renderer.render_state_mut().toggle_cull_face();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => data.camera.reset(),
            _ => {}
        }
    }

    fn mouse(&mut self, mouse_event: &MouseEvent, data: &mut AppState) {
        let (column, row) = (mouse_event.column, mouse_event.row);
        match mouse_event.kind {
            MouseEventKind::Down(button) => {
                self.drag = Some((drag_button(button), column, row));
            }
            MouseEventKind::Drag(button) => {
                let button = drag_button(button);
                if let Some((held, last_column, last_row)) = self.drag {
                    if held == button {
                        let delta_x = column as f32 - last_column as f32;
                        let delta_y = row as f32 - last_row as f32;
                        data.camera.on_mouse_drag(button, delta_x, delta_y);
                    }
                }
                self.drag = Some((button, column, row));
            }
            MouseEventKind::Up(_) => self.drag = None,
            MouseEventKind::ScrollUp => data.camera.on_mouse_wheel(-1.0),
            MouseEventKind::ScrollDown => data.camera.on_mouse_wheel(1.0),
            _ => {}
        }
    }

    /// Renders the scene into the frame buffer
    pub fn render(&mut self, data: &AppState) {
        // Update FPS calculation
        self.frames_since_last_update += 1;
        let now = Instant::now();
        let duration = now.duration_since(self.last_fps_calculation);
        if duration.as_secs_f64() >= 1.0 {
            self.fps = self.frames_since_last_update as f64 / duration.as_secs_f64();
            self.frames_since_last_update = 0;
            self.last_fps_calculation = now;
            tracing::trace!(fps = self.fps, "frame rate");
        }

        self.renderer.on_frame(&mut self.rasterizer, &data.camera);
    }

    /// Renders and draws the frame plus overlays on the terminal screen
    pub fn paint<W: Write>(&mut self, out: &mut W, data: &AppState) -> io::Result<()> {
        self.render(data);
        write_frame(out, self.rasterizer.frame(), true)?;

        if data.debug {
            let camera = &data.camera;
            let state = self.renderer.render_state();
            let lines = [
                format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                format!(
                    "Rotation X: {:.1}, Y: {:.1}",
                    camera.rotation_x, camera.rotation_y
                ),
                format!("Pan X: {:.2}, Y: {:.2}", camera.pan_x, camera.pan_y),
                format!("Eye distance: {:.2}", camera.eye_distance),
                format!(
                    "Polygons: {:?}, lighting: {}, culling: {:?}",
                    state.polygon_mode, state.lighting_enabled, state.cull_face
                ),
                format!("Triangles: {}", self.rasterizer.triangles_drawn()),
                format!("FPS: {:.2}", self.fps),
            ];
            queue!(
                out,
                SetForegroundColor(Color::Black),
                SetBackgroundColor(Color::White)
            )?;
            for (row, line) in lines.iter().enumerate() {
                queue!(out, MoveTo(1, row as u16), Print(line))?;
            }
            queue!(out, ResetColor)?;
        }

        // Display 'Paused' if the camera is frozen
        if data.paused {
            let text = " Paused ";
            let column = self.columns.saturating_sub(text.len() as u16) / 2;
            queue!(
                out,
                MoveTo(column, self.rows / 2),
                SetForegroundColor(Color::White),
                SetBackgroundColor(Color::Black),
                Print(text),
                ResetColor
            )?;
        }
        out.flush()
    }

    /// Renders one frame to a plain output stream
    pub fn snapshot<W: Write>(&mut self, out: &mut W, data: &AppState) -> io::Result<()> {
        self.render(data);
        write_frame(out, self.rasterizer.frame(), false)
    }

    /// Interactive loop: handles events from `next_event` as they arrive and
    /// paints whenever a frame is due. The renderer is disposed on every exit.
    pub fn drive<W, F>(
        &mut self,
        data: &mut AppState,
        out: &mut W,
        interval: Duration,
        mut next_event: F,
    ) -> io::Result<()>
    where
        W: Write,
        F: FnMut(Duration) -> io::Result<Option<Event>>,
    {
        let result = self.event_loop(data, out, interval, &mut next_event);
        self.dispose();
        result
    }

    fn event_loop<W, F>(
        &mut self,
        data: &mut AppState,
        out: &mut W,
        interval: Duration,
        next_event: &mut F,
    ) -> io::Result<()>
    where
        W: Write,
        F: FnMut(Duration) -> io::Result<Option<Event>>,
    {
        let mut next_frame = Instant::now();
        while !data.quit {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            if let Some(event) = next_event(timeout)? {
                self.event(&event, data);
                if data.quit {
                    break;
                }
            }
            // A busy event stream must not hold back a due frame
            if Instant::now() >= next_frame {
                self.paint(out, data)?;
                next_frame = Instant::now() + interval;
            }
        }
        Ok(())
    }

    /// Runs `on_dispose` once; later calls do nothing
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.renderer.on_dispose(&mut self.rasterizer);
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn drag_button(button: MouseButton) -> DragButton {
    match button {
        MouseButton::Left => DragButton::Left,
        MouseButton::Right => DragButton::Right,
        MouseButton::Middle => DragButton::Middle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CullFace, PolygonMode, RenderState};
    use crate::camera::{Camera, CameraSettings};
    use crate::scene::Scene;

    fn canvas() -> (Canvas, AppState) {
        let renderer = ShapesRenderer::new(Scene::forest().unwrap(), RenderState::default());
        let canvas = Canvas::new(renderer, Light::default(), 40, 12);
        (canvas, AppState::new(Camera::default(), false))
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn arrow_and_zoom_keys_move_the_camera() {
        let (mut canvas, mut data) = canvas();
        let settings = CameraSettings::default();
        canvas.event(&key(KeyCode::Left), &mut data);
        canvas.event(&key(KeyCode::Left), &mut data);
        canvas.event(&key(KeyCode::Up), &mut data);
        canvas.event(&key(KeyCode::Char('-')), &mut data);
        assert_eq!(data.camera.rotation_y, 2.0 * settings.key_rotation_step);
        assert_eq!(data.camera.rotation_x, settings.key_rotation_step);
        assert_eq!(
            data.camera.eye_distance,
            settings.eye_distance + settings.key_zoom_step
        );
    }

    #[test]
    fn key_releases_are_ignored() {
        let (mut canvas, mut data) = canvas();
        let mut release = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        canvas.event(&Event::Key(release), &mut data);
        assert_eq!(data.camera, Camera::default());
    }

    #[test]
    fn left_drag_rotates_by_the_cell_delta() {
        let (mut canvas, mut data) = canvas();
        let factor = CameraSettings::default().drag_rotation_factor;
        canvas.event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 5), &mut data);
        canvas.event(&mouse(MouseEventKind::Drag(MouseButton::Left), 13, 5), &mut data);
        canvas.event(&mouse(MouseEventKind::Drag(MouseButton::Left), 13, 3), &mut data);
        canvas.event(&mouse(MouseEventKind::Up(MouseButton::Left), 13, 3), &mut data);
        assert_eq!(data.camera.rotation_y, 3.0 * factor);
        assert_eq!(data.camera.rotation_x, -2.0 * factor);
    }

    #[test]
    fn right_drag_pans() {
        let (mut canvas, mut data) = canvas();
        let factor = CameraSettings::default().drag_pan_factor;
        canvas.event(&mouse(MouseEventKind::Down(MouseButton::Right), 0, 0), &mut data);
        canvas.event(&mouse(MouseEventKind::Drag(MouseButton::Right), 2, 1), &mut data);
        assert_eq!(data.camera.pan_x, 2.0 * factor);
        assert_eq!(data.camera.pan_y, -factor);
        assert_eq!(data.camera.rotation_x, 0.0);
    }

    #[test]
    fn wheel_zooms_in_and_out() {
        let (mut canvas, mut data) = canvas();
        canvas.event(&mouse(MouseEventKind::ScrollUp, 0, 0), &mut data);
        assert!(data.camera.eye_distance < 10.0);
        canvas.event(&mouse(MouseEventKind::ScrollDown, 0, 0), &mut data);
        assert_eq!(data.camera.eye_distance, 10.0);
    }

    #[test]
    fn pause_freezes_camera_input() {
        let (mut canvas, mut data) = canvas();
        canvas.event(&key(KeyCode::Char('p')), &mut data);
        assert!(data.paused);
        canvas.event(&key(KeyCode::Left), &mut data);
        canvas.event(&key(KeyCode::Char('w')), &mut data);
        canvas.event(&mouse(MouseEventKind::ScrollDown, 0, 0), &mut data);
        assert_eq!(data.camera, Camera::default());
        assert_eq!(canvas.renderer.render_state(), RenderState::default());

        canvas.event(&key(KeyCode::Char('p')), &mut data);
        canvas.event(&key(KeyCode::Left), &mut data);
        assert_ne!(data.camera, Camera::default());
    }

    #[test]
    fn render_state_keys_toggle_the_renderer() {
        let (mut canvas, mut data) = canvas();
        canvas.event(&key(KeyCode::Char('w')), &mut data);
        canvas.event(&key(KeyCode::Char('l')), &mut data);
        canvas.event(&key(KeyCode::Char('c')), &mut data);
        assert_eq!(
            canvas.renderer.render_state(),
            RenderState {
                polygon_mode: PolygonMode::Line,
                lighting_enabled: false,
                cull_face: CullFace::Enabled,
            }
        );
    }

    #[test]
    fn quit_and_reset_keys() {
        let (mut canvas, mut data) = canvas();
        canvas.event(&key(KeyCode::Right), &mut data);
        canvas.event(&key(KeyCode::Char('r')), &mut data);
        assert_eq!(data.camera, Camera::default());
        assert!(!data.quit);
        canvas.event(
            &Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            &mut data,
        );
        assert!(data.quit);
    }

    #[test]
    fn resize_doubles_the_pixel_rows() {
        let (mut canvas, mut data) = canvas();
        let frame = canvas.rasterizer.frame();
        assert_eq!((frame.width(), frame.height()), (40, 24));
        canvas.event(&Event::Resize(100, 30), &mut data);
        let frame = canvas.rasterizer.frame();
        assert_eq!((frame.width(), frame.height()), (100, 60));
    }

    #[test]
    fn snapshot_writes_one_line_per_cell_row() {
        let (mut canvas, data) = canvas();
        let mut out = Vec::new();
        canvas.snapshot(&mut out, &data).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 12);
        assert_eq!(text.chars().filter(|&c| c == HALF_BLOCK).count(), 40 * 12);
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn busy_event_stream_still_paints() {
        let (mut canvas, mut data) = canvas();
        let mut remaining = 10;
        let mut out = Vec::new();
        canvas
            .drive(&mut data, &mut out, Duration::ZERO, |_| {
                remaining -= 1;
                if remaining == 0 {
                    return Ok(Some(key(KeyCode::Char('q'))));
                }
                let drag = MouseEventKind::Drag(MouseButton::Left);
                Ok(Some(mouse(drag, remaining, 0)))
            })
            .unwrap();
        assert!(data.quit);
        let text = String::from_utf8(out).unwrap();
        // Every frame starts by moving to the top-left cell
        assert!(text.matches("\x1b[1;1H").count() >= 2);
        assert!(canvas.disposed);
    }

    #[test]
    fn failed_paint_still_disposes() {
        let (mut canvas, mut data) = canvas();
        let result = canvas.drive(&mut data, &mut BrokenPipe, Duration::ZERO, |_| Ok(None));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(canvas.disposed);
    }

    #[test]
    fn dispose_runs_once() {
        let (mut canvas, _) = canvas();
        canvas.dispose();
        canvas.dispose();
        assert!(canvas.disposed);
    }

    #[test]
    fn odd_pixel_rows_are_padded_with_the_background() {
        let mut frame = FrameBuffer::new(2, 3);
        frame.clear(Vec3::new(1.0, 0.0, 0.0));
        let mut out = Vec::new();
        write_frame(&mut out, &frame, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\x1b[38;2;255;0;0m"));
        assert!(text.contains("\x1b[48;2;255;255;255m"));
    }
}
