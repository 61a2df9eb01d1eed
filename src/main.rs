use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use eddy::{
    overlay_obstacle, overlay_text, paint_cells, CellRenderer, ObstacleShape, PaintOptions, Scene,
    SceneKind, GLYPH_HEIGHT, LINE_SPACING,
};

const HUD_COLOR: [u8; 3] = [255, 255, 255];

struct App {
    window: Arc<Window>,
    renderer: CellRenderer,
    scene: Scene,
    pixels: Vec<u8>,
    paused: bool,
    dragging: bool,
    cursor: PhysicalPosition<f64>,
    frames: u32,
    last_fps: Instant,
}

impl App {
    fn new(event_loop: &ActiveEventLoop) -> Result<Self> {
        let scene = Scene::new(SceneKind::WindTunnel, ObstacleShape::Circle);
        let attributes = Window::default_attributes()
            .with_title("eddy")
            .with_inner_size(LogicalSize::new(1010.0, 510.0));
        let window = Arc::new(event_loop.create_window(attributes)?);
        let size = scene.fluid.size;
        let renderer = CellRenderer::new(window.clone(), size.width() as u32, size.height() as u32)?;
        log::info!(
            "starting {} with {}x{} cells",
            scene.kind.label(),
            size.width(),
            size.height()
        );
        Ok(Self {
            window,
            renderer,
            scene,
            pixels: vec![0u8; size.cell_count() * 4],
            paused: false,
            dragging: false,
            cursor: PhysicalPosition::default(),
            frames: 0,
            last_fps: Instant::now(),
        })
    }

    fn switch_scene(&mut self, kind: SceneKind) {
        let shape = self.scene.shape;
        self.scene = Scene::new(kind, shape);
        let size = self.scene.fluid.size;
        self.renderer
            .set_grid_size(size.width() as u32, size.height() as u32);
        self.pixels.resize(size.cell_count() * 4, 0);
        log::info!(
            "{} with {}x{} cells",
            self.scene.kind.label(),
            size.width(),
            size.height()
        );
    }

    fn domain_position(&self) -> (f32, f32) {
        let window_size = self.window.inner_size();
        let (extent_x, extent_y) = self.scene.fluid.size.extent();
        let x = (self.cursor.x / window_size.width.max(1) as f64) as f32 * extent_x;
        let y = (1.0 - self.cursor.y / window_size.height.max(1) as f64) as f32 * extent_y;
        (x, y)
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Digit1 => self.switch_scene(SceneKind::Tank),
            KeyCode::Digit2 => self.switch_scene(SceneKind::WindTunnel),
            KeyCode::Digit3 => self.switch_scene(SceneKind::Paint),
            KeyCode::KeyR => self.switch_scene(self.scene.kind),
            KeyCode::KeyS => {
                let next = self.scene.shape.next();
                self.scene.set_shape(next);
            }
            KeyCode::KeyP => self.scene.show_pressure = !self.scene.show_pressure,
            KeyCode::KeyM => self.scene.show_smoke = !self.scene.show_smoke,
            KeyCode::KeyO => {
                self.scene.fluid.over_relaxation = if self.scene.fluid.over_relaxation > 1.0 {
                    1.0
                } else {
                    1.9
                };
            }
            KeyCode::Space => self.paused = !self.paused,
            _ => {}
        }
    }

    fn overlay_hud(&mut self) {
        let size = self.scene.fluid.size;
        let views = match (self.scene.show_pressure, self.scene.show_smoke) {
            (true, true) => "PRESSURE SMOKE",
            (true, false) => "PRESSURE",
            (false, true) => "SMOKE",
            (false, false) => "WALLS",
        };
        let mut lines = vec![
            self.scene.kind.label().to_string(),
            self.scene.shape.label().to_string(),
            views.to_string(),
            format!("SOR {:.1}", self.scene.fluid.over_relaxation),
        ];
        if self.paused {
            lines.push("PAUSED".to_string());
        }
        let mut y = 2;
        for line in &lines {
            overlay_text(
                &mut self.pixels,
                size.width(),
                size.height(),
                2,
                y,
                line,
                HUD_COLOR,
            );
            y = y.saturating_add(GLYPH_HEIGHT + LINE_SPACING);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if !self.paused {
            self.scene.step();
        }
        let options = PaintOptions {
            show_pressure: self.scene.show_pressure,
            show_smoke: self.scene.show_smoke,
            paint_palette: self.scene.kind == SceneKind::Paint,
        };
        paint_cells(&self.scene.fluid, options, &mut self.pixels);
        if let Some(obstacle) = self.scene.obstacle {
            overlay_obstacle(
                &self.scene.fluid,
                obstacle,
                self.scene.shape,
                self.scene.show_pressure,
                &mut self.pixels,
            );
        }
        self.overlay_hud();
        self.renderer.upload(&self.pixels);
        match self.renderer.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                self.renderer.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(err) => log::warn!("render error: {err:?}"),
        }

        self.frames += 1;
        if self.last_fps.elapsed() >= Duration::from_secs(1) {
            log::info!("{} fps", self.frames);
            self.frames = 0;
            self.last_fps = Instant::now();
        }
    }

    fn handle_window_event(&mut self, event_loop: &ActiveEventLoop, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.renderer.resize(size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !event.repeat {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        self.handle_key(event_loop, code);
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
                if self.dragging {
                    let (x, y) = self.domain_position();
                    self.scene.drag_obstacle(x, y);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.dragging = true;
                    let (x, y) = self.domain_position();
                    self.scene.place_obstacle(x, y);
                }
                ElementState::Released => self.dragging = false,
            },
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[derive(Default)]
struct AppState {
    app: Option<App>,
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() {
            match App::new(event_loop) {
                Ok(app) => self.app = Some(app),
                Err(err) => {
                    log::error!("failed to start: {err:#}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };
        if window_id != app.window.id() {
            return;
        }
        app.handle_window_event(event_loop, event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Some(app) = self.app.as_ref() {
            app.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let event_loop = EventLoop::new()?;
    let mut state = AppState::default();
    event_loop.run_app(&mut state)?;
    Ok(())
}
