use std::collections::HashSet;
use std::num::NonZeroU32;
use std::process::ExitCode;
use std::rc::Rc;
use std::time::{Duration, Instant};

use grid_raycaster::{Camera, EngineConfig, Framebuffer, GridWorld, Raycaster, Vec2};
use log::{debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::scaler::{ScaleLut, blit_nearest_stretch, build_scale_lut};

mod demo;
mod scaler;

const TITLE: &str = "grid_raycaster";

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    raycaster: Raycaster<'static, GridWorld>,
    config: EngineConfig,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Fixed-height internal buffer, stretched to the window
    fb: Framebuffer,
    scale_lut: ScaleLut,

    // Input and movement
    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl App {
    fn new(config: EngineConfig) -> grid_raycaster::Result<Self> {
        // The world lives as long as the process; the raycaster borrows it
        let world: &'static GridWorld =
            Box::leak(Box::new(demo::world(config.render.face_shading)?));
        let camera = Camera::looking(config.controls.start, Vec2::NEG_X, config.render.fov());
        let raycaster =
            Raycaster::new(world, camera, config.render.clone()).with_sprites(demo::sprites()?);

        Ok(Self {
            window: None,
            surface: None,
            raycaster,
            // Detached until the first window size is known
            fb: Framebuffer::detached(0, config.render.internal_height),
            config,

            frame_counter: 0,
            last_fps_print: Instant::now(),

            scale_lut: ScaleLut::empty(),

            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(960.0, 600.0));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(surface) => surface,
            Err(e) => {
                error!("failed to create softbuffer surface: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed if code == KeyCode::Escape => event_loop.exit(),
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.tick();

                let (window, surface) = match (&self.window, &mut self.surface) {
                    (Some(w), Some(s)) if w.id() == id => (w, s),
                    _ => return,
                };

                let size = window.inner_size();
                let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };
                if let Err(e) = surface.resize(w, h) {
                    error!("surface resize failed: {e}");
                    return;
                }

                self.raycaster.render(&mut self.fb);

                let mut buf = match surface.buffer_mut() {
                    Ok(buf) => buf,
                    Err(e) => {
                        error!("no surface buffer: {e}");
                        return;
                    }
                };
                blit_nearest_stretch(&mut buf, w.get() as usize, self.fb.pixels(), &self.scale_lut);
                if let Err(e) = buf.present() {
                    error!("present failed: {e}");
                }

                self.frame_counter += 1;
                let elapsed = self.last_fps_print.elapsed().as_secs_f32();
                if elapsed >= 1.0 {
                    let fps = self.frame_counter as f32 / elapsed;
                    window.set_title(&format!("{TITLE} - {fps:.0} fps"));
                    info!("FPS: {fps:.1}");
                    self.frame_counter = 0;
                    self.last_fps_print = Instant::now();
                }

                window.request_redraw();
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl App {
    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;
        let dt_s = dt.as_secs_f32();

        let held = |keys: [KeyCode; 2]| keys.iter().any(|k| self.keys_down.contains(k));
        let mut forward = 0.0;
        if held([KeyCode::ArrowUp, KeyCode::KeyW]) {
            forward += 1.0;
        }
        if held([KeyCode::ArrowDown, KeyCode::KeyS]) {
            forward -= 1.0;
        }
        let mut turn = 0.0;
        if held([KeyCode::ArrowLeft, KeyCode::KeyA]) {
            turn += 1.0;
        }
        if held([KeyCode::ArrowRight, KeyCode::KeyD]) {
            turn -= 1.0;
        }

        let controls = &self.config.controls;
        if turn != 0.0 {
            self.raycaster.rotate(turn * controls.turn_speed * dt_s);
        }
        if forward != 0.0 {
            let delta = self.raycaster.dir() * (forward * controls.move_speed * dt_s);
            self.raycaster.move_by(delta);
        }
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.config.render.internal_height;
        let aspect = if dst_h > 0 {
            dst_w as f32 / dst_h as f32
        } else {
            1.0
        };

        // Derive width from aspect, even so the center column is exact
        let mut target_w = ((target_h as f32 * aspect).round() as usize).max(160);
        if target_w % 2 != 0 {
            target_w += 1;
        }

        if target_w != self.fb.width() || target_h != self.fb.height() || !self.fb.is_attached() {
            self.fb.resize(target_w, target_h);
            self.fb.attach();
            debug!("internal framebuffer {target_w}x{target_h} for window {dst_w}x{dst_h}");
        }
        self.scale_lut = build_scale_lut(dst_w, dst_h, self.fb.width(), self.fb.height());
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info,grid_raycaster=debug"),
    )
    .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load_or_default(path),
        None => Ok(EngineConfig::default()),
    };
    let mut app = match config.and_then(App::new) {
        Ok(app) => app,
        Err(e) => {
            error!("startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("failed to create event loop: {e}");
            return ExitCode::FAILURE;
        }
    };
    // Redraws are requested every frame, so waiting costs nothing
    event_loop.set_control_flow(ControlFlow::Wait);

    if let Err(e) = event_loop.run_app(&mut app) {
        error!("event loop error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
