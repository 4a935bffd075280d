//! Interactive window for the morphing tree.
//!
//! | Input         | Action                              |
//! |---------------|-------------------------------------|
//! | Space         | Toggle between formed and dispersed |
//! | P             | Pause or resume                     |
//! | Left drag     | Orbit the camera                    |
//! | Mouse wheel   | Zoom                                |
//! | Escape        | Quit                                |

mod camera;
mod gpu;
mod mesh;

pub use camera::{Camera, AUTO_ROTATE_PERIOD, MAX_DISTANCE, MIN_DISTANCE};
pub use gpu::{GpuState, SHADER_SOURCE};
pub use mesh::{Mesh, Vertex};

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::SceneConfig;
use crate::error::ViewerError;
use crate::morph::MorphState;
use crate::scene::Scene;
use crate::time::Time;

const TITLE: &str = "Evergreen";

/// Open a window and run the scene until it is closed.
pub fn run(config: &SceneConfig) -> Result<(), ViewerError> {
    let scene = Scene::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene, config.initial_state);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    scene: Scene,
    state: MorphState,
    time: Time,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    error: Option<ViewerError>,
}

impl App {
    fn new(scene: Scene, state: MorphState) -> Self {
        Self {
            window: None,
            gpu_state: None,
            scene,
            state,
            time: Time::new(),
            mouse_pressed: false,
            last_mouse_pos: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ViewerError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), &self.scene))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        self.time = Time::new();
        Ok(())
    }

    fn toggle(&mut self) {
        self.state = self.state.toggled();
        log::info!("Morphing toward {:?}", self.state);
    }

    fn toggle_pause(&mut self) {
        self.time.toggle_pause();
        log::info!("{}", if self.time.is_paused() { "Paused" } else { "Resumed" });
        self.update_title();
    }

    fn update_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.time.is_paused() {
            window.set_title(&format!("{} - paused - {:?}", TITLE, self.state));
        } else {
            window.set_title(&format!(
                "{} - {:.0} fps - {:?}",
                TITLE,
                self.time.fps(),
                self.state
            ));
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let frame = self.time.tick();
        match gpu_state.render(&mut self.scene, self.state, frame) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }

        if !self.time.is_paused() && frame.frame % 30 == 0 {
            self.update_title();
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                log::error!("{}", e);
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Space => self.toggle(),
                KeyCode::KeyP => self.toggle_pause(),
                KeyCode::Escape => event_loop.exit(),
                _ => {}
            },
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_mouse_pos = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let Some((last_x, last_y)) = self.last_mouse_pos {
                        let dx = (position.x - last_x) as f32;
                        let dy = (position.y - last_y) as f32;
                        if let Some(gpu_state) = &mut self.gpu_state {
                            gpu_state.camera.orbit(dx, dy);
                        }
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
                };
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.camera.zoom(scroll);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}
