use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{ModifiersState, PhysicalKey},
    window::Window,
};
use std::sync::Arc;
use std::time::Instant;

// Import from the library crate
use flythrough::{
    logging,
    controller::{FrameLoopContext, FrameScheduler},
    controller::input::{InputEvent, Modifiers, MouseButton as PointerButton},
    view::{GpuContext, SceneRenderer},
    FlythroughConfig,
};

/// Frames are requested through winit's redraw queue.
struct RedrawScheduler(Arc<Window>);

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&self) {
        self.0.request_redraw();
    }
}

struct App {
    window: Arc<Window>,
    scheduler: RedrawScheduler,
    frame_loop: FrameLoopContext<SceneRenderer>,
    started: Instant,
    modifiers: ModifiersState,
    cursor: (f32, f32),
}

impl App {
    async fn new(window: Arc<Window>, config: &FlythroughConfig) -> Result<Self, flythrough::ContextError> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let gpu = GpuContext::new_native(window.clone(), width, height).await?;
        let renderer = SceneRenderer::new(gpu, window.scale_factor() as f32).await?;
        let frame_loop = FrameLoopContext::new(config, width, height, renderer);
        tracing::info!(width, height, scale_factor = window.scale_factor(), "session started");

        Ok(Self {
            scheduler: RedrawScheduler(window.clone()),
            window,
            frame_loop,
            started: Instant::now(),
            modifiers: ModifiersState::empty(),
            cursor: (0.0, 0.0),
        })
    }

    /// Translate a window event into an `InputEvent`; returns true when handled.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let translated = match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
                return true;
            }
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, .. }, .. } => {
                let PhysicalKey::Code(code) = physical_key else {
                    return false;
                };
                let code = format!("{code:?}");
                match state {
                    ElementState::Pressed => InputEvent::KeyDown {
                        code,
                        modifiers: Modifiers {
                            shift: self.modifiers.shift_key(),
                            alt: self.modifiers.alt_key(),
                        },
                    },
                    ElementState::Released => InputEvent::KeyUp { code },
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                InputEvent::PointerMove { x: self.cursor.0, y: self.cursor.1 }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Right => PointerButton::Right,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => PointerButton::Left,
                };
                match state {
                    ElementState::Pressed => InputEvent::PointerDown { button, x: self.cursor.0, y: self.cursor.1 },
                    ElementState::Released => InputEvent::PointerUp { button },
                }
            }
            WindowEvent::Focused(false) => InputEvent::FocusLost,
            WindowEvent::Occluded(occluded) => InputEvent::VisibilityChanged { visible: !occluded },
            _ => return false,
        };
        self.frame_loop.on_input(&translated);
        true
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // Minimised windows report zero; keep the last size until restored.
        if new_size.width > 0 && new_size.height > 0 {
            self.frame_loop.on_resize(new_size.width, new_size.height);
        }
    }

    fn redraw(&mut self) -> Result<(), flythrough::RenderError> {
        let timestamp = self.started.elapsed().as_secs_f64() * 1000.0;
        self.frame_loop.tick(timestamp, &self.scheduler)
    }
}

fn main() {
    logging::init();
    let config = FlythroughConfig::from_env();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            tracing::error!(%err, "failed to create event loop");
            std::process::exit(1);
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title(config.window.title.as_str())
        .with_inner_size(winit::dpi::LogicalSize::new(config.window.width, config.window.height));
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(err) => {
            tracing::error!(%err, "failed to create window");
            std::process::exit(1);
        }
    };

    let mut app = match pollster::block_on(App::new(window.clone(), &config)) {
        Ok(app) => app,
        Err(err) => {
            tracing::error!(%err, "rendering context unavailable");
            std::process::exit(1);
        }
    };
    app.window.request_redraw();

    let result = event_loop.run(move |event, elwt| {
        if let Event::WindowEvent { ref event, window_id } = event {
            if window_id != app.window.id() || app.input(event) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => {
                    app.frame_loop.stop();
                    elwt.exit();
                }
                WindowEvent::Resized(physical_size) => app.resize(*physical_size),
                WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                    app.frame_loop
                        .target_mut()
                        .set_base_pixels_per_point(*scale_factor as f32);
                }
                WindowEvent::RedrawRequested => {
                    if let Err(err) = app.redraw() {
                        tracing::error!(%err, "fatal render error");
                        elwt.exit();
                    }
                }
                _ => {}
            }
        }
    });

    if let Err(err) = result {
        tracing::error!(%err, "event loop terminated with error");
    }
}
