// Re-export all public modules so they can be used from main.rs
pub mod config;
pub mod error;
pub mod logging;
pub mod ui;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

pub use config::FlythroughConfig;
pub use controller::{FrameLoopContext, FrameScheduler};
pub use error::{ContextError, RenderError};

#[cfg(target_arch = "wasm32")]
use {
    std::cell::{Cell, RefCell},
    std::rc::Rc,
    controller::input::{wasm as input_wasm, InputEvent},
    view::{GpuContext, SceneRenderer},
    wasm_bindgen::closure::Closure,
    wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue},
    web_sys::{Document, Event, HtmlCanvasElement, KeyboardEvent, MouseEvent, Window},
};

#[cfg(target_arch = "wasm32")]
type WebContext = Rc<RefCell<FrameLoopContext<SceneRenderer>>>;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    logging::init();
    let config = FlythroughConfig::default();
    let (window, document, canvas) = init_canvas()?;
    setup_app(&window, &document, &canvas, &config)
        .await
        .map_err(|e| js_error(e.to_string()))
}

/// Main application setup for WASM
#[cfg(target_arch = "wasm32")]
async fn setup_app(
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    config: &FlythroughConfig,
) -> Result<(), ContextError> {
    let (width, height) = logical_size(window, config);

    let gpu = GpuContext::new(canvas, width, height).await?;
    // The backing store ignores devicePixelRatio, so CSS pixels are render pixels at quality 1.
    let renderer = SceneRenderer::new(gpu, 1.0).await?;

    let ctx: WebContext = Rc::new(RefCell::new(FrameLoopContext::new(config, width, height, renderer)));
    tracing::info!(width, height, "session started");

    setup_event_listeners(document, window, canvas, ctx.clone(), config.clone())
        .map_err(|e| ContextError::Canvas(format!("{e:?}")))?;

    let scheduler = Rc::new(RafScheduler::default());
    let frame = RcCellCallback::new(window.clone(), {
        let ctx = ctx.clone();
        let scheduler = scheduler.clone();
        move |timestamp: f64| {
            scheduler.requested.set(false);
            if let Err(err) = ctx.borrow_mut().tick(timestamp, scheduler.as_ref()) {
                tracing::error!(%err, "fatal render error");
            }
            scheduler.requested.get()
        }
    });
    frame
        .start()
        .map_err(|e| ContextError::Canvas(format!("requestAnimationFrame failed: {e:?}")))
}

/// Records whether the current frame asked for a successor.
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
struct RafScheduler {
    requested: Cell<bool>,
}

#[cfg(target_arch = "wasm32")]
impl FrameScheduler for RafScheduler {
    fn request_frame(&self) {
        self.requested.set(true);
    }
}

/// Wire host events straight into the shared context. Each handler applies
/// its change synchronously.
#[cfg(target_arch = "wasm32")]
fn setup_event_listeners(
    document: &Document,
    window: &Window,
    canvas: &HtmlCanvasElement,
    ctx: WebContext,
    config: FlythroughConfig,
) -> Result<(), JsValue> {
    // Resize
    {
        let ctx = ctx.clone();
        let window_for_size = window.clone();
        let resize = Closure::wrap(Box::new(move |_e: Event| {
            let (w, h) = logical_size(&window_for_size, &config);
            ctx.borrow_mut().on_resize(w, h);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    // Keyboard down: quality keys and fly controls
    {
        let ctx = ctx.clone();
        let keydown = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            // Alt combinations keep their browser meaning but still steer the camera.
            if !e.alt_key() {
                e.prevent_default();
            }
            ctx.borrow_mut().on_input(&input_wasm::keyboard_event_to_input(&e, true));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
        keydown.forget();
    }

    // Keyboard up
    {
        let ctx = ctx.clone();
        let keyup = Closure::wrap(Box::new(move |e: KeyboardEvent| {
            ctx.borrow_mut().on_input(&input_wasm::keyboard_event_to_input(&e, false));
        }) as Box<dyn FnMut(KeyboardEvent)>);
        document.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
        keyup.forget();
    }

    // Focus loss - clear all keys
    {
        let ctx = ctx.clone();
        let blur = Closure::wrap(Box::new(move |_e: Event| {
            ctx.borrow_mut().on_input(&InputEvent::FocusLost);
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback("blur", blur.as_ref().unchecked_ref())?;
        blur.forget();
    }

    // Visibility change - clear all keys
    {
        let ctx = ctx.clone();
        let doc = document.clone();
        let visibility = Closure::wrap(Box::new(move |_e: Event| {
            ctx.borrow_mut()
                .on_input(&InputEvent::VisibilityChanged { visible: !doc.hidden() });
        }) as Box<dyn FnMut(Event)>);
        document.add_event_listener_with_callback("visibilitychange", visibility.as_ref().unchecked_ref())?;
        visibility.forget();
    }

    // Drag to look: press on the canvas, track and release anywhere
    {
        let ctx = ctx.clone();
        let mousedown = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
            ctx.borrow_mut().on_input(&input_wasm::mouse_down_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("mousedown", mousedown.as_ref().unchecked_ref())?;
        mousedown.forget();
    }
    {
        let ctx = ctx.clone();
        let mousemove = Closure::wrap(Box::new(move |e: MouseEvent| {
            ctx.borrow_mut().on_input(&input_wasm::mouse_move_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mousemove", mousemove.as_ref().unchecked_ref())?;
        mousemove.forget();
    }
    {
        let ctx = ctx.clone();
        let mouseup = Closure::wrap(Box::new(move |e: MouseEvent| {
            ctx.borrow_mut().on_input(&input_wasm::mouse_up_to_input(&e));
        }) as Box<dyn FnMut(MouseEvent)>);
        document.add_event_listener_with_callback("mouseup", mouseup.as_ref().unchecked_ref())?;
        mouseup.forget();
    }

    // Context menu prevention
    {
        let contextmenu = Closure::wrap(Box::new(move |e: MouseEvent| {
            e.prevent_default();
        }) as Box<dyn FnMut(MouseEvent)>);
        canvas.add_event_listener_with_callback("contextmenu", contextmenu.as_ref().unchecked_ref())?;
        contextmenu.forget();
    }

    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn logical_size(window: &Window, config: &FlythroughConfig) -> (u32, u32) {
    let dim = |v: Result<JsValue, JsValue>, fallback: u32| {
        v.ok()
            .and_then(|v| v.as_f64())
            .map(|v| v.max(1.0) as u32)
            .unwrap_or(fallback)
    };
    (
        dim(window.inner_width(), config.window.width),
        dim(window.inner_height(), config.window.height),
    )
}

/// Full-page canvas: CSS stretches it over the window while the backing
/// store follows the render size.
#[cfg(target_arch = "wasm32")]
fn init_canvas() -> Result<(Window, Document, HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or(js_error("no global `window`"))?;
    let document = window.document().ok_or(js_error("no document on window"))?;
    let body = document.body().ok_or(js_error("no body on document"))?;
    let canvas_el = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| js_error("failed to create canvas"))?;

    body.style().set_property("margin", "0")?;
    body.style().set_property("overflow", "hidden")?;
    let style = canvas_el.style();
    style.set_property("width", "100%")?;
    style.set_property("height", "100%")?;
    style.set_property("display", "block")?;

    body.append_child(&canvas_el)?;
    Ok((window, document, canvas_el))
}

#[cfg(target_arch = "wasm32")]
fn js_error<E: Into<String>>(msg: E) -> JsValue {
    js_sys::Error::new(&msg.into()).into()
}

/// `requestAnimationFrame` driver. The wrapped closure gets the frame
/// timestamp and returns whether another frame was requested.
#[cfg(target_arch = "wasm32")]
struct RcCellCallback {
    inner: Rc<RefCell<Box<dyn FnMut(f64) -> bool>>>,
    window: Window,
}

#[cfg(target_arch = "wasm32")]
impl RcCellCallback {
    fn new(window: Window, f: impl FnMut(f64) -> bool + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Box::new(f))),
            window,
        }
    }

    fn start(self) -> Result<(), JsValue> {
        let inner = self.inner.clone();
        let window = self.window.clone();

        let callback = Rc::new(RefCell::new(None::<Closure<dyn FnMut(f64)>>));
        let callback_clone = callback.clone();

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            let again = inner.borrow_mut().as_mut()(timestamp);
            if !again {
                tracing::info!("animation frames no longer requested");
                return;
            }

            // Schedule the next frame with the same closure
            if let Some(cb) = callback_clone.borrow().as_ref() {
                if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    tracing::error!(?e, "requestAnimationFrame failed");
                }
            }
        }) as Box<dyn FnMut(f64)>));

        if let Some(cb) = callback.borrow().as_ref() {
            self.window
                .request_animation_frame(cb.as_ref().unchecked_ref())?;
        }

        // Leak the closure to keep it alive
        std::mem::forget(callback);
        Ok(())
    }
}
