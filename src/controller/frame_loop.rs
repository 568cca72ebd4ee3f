use crate::config::FlythroughConfig;
use crate::controller::camera_controller::CameraController;
use crate::controller::frame_clock::FrameClock;
use crate::controller::input::InputEvent;
use crate::controller::quality::QualityController;
use crate::error::RenderError;
use crate::model::Viewport;
use crate::ui::PerfStats;
use crate::view::render::RenderTarget;
use crate::view::uniforms::{SceneConstants, UniformBuilder, UniformSet};

/// Host hook for "call me again next frame". Implemented over
/// `requestAnimationFrame` on the web and `request_redraw` natively.
pub trait FrameScheduler {
    fn request_frame(&self);
}

/// Owns all per-session state and drives one frame per `tick`. The resize and
/// input handlers mutate the same context synchronously, so the next frame
/// always sees their effect.
pub struct FrameLoopContext<T: RenderTarget> {
    clock: FrameClock,
    quality: QualityController,
    camera: CameraController,
    viewport: Viewport,
    /// Render size last pushed to the target.
    applied_size: (u32, u32),
    scene_time: f64,
    time_divisor: f64,
    constants: SceneConstants,
    stats: PerfStats,
    target: T,
    running: bool,
}

impl<T: RenderTarget> FrameLoopContext<T> {
    pub fn new(config: &FlythroughConfig, logical_width: u32, logical_height: u32, mut target: T) -> Self {
        let quality = QualityController::new(config.quality);
        let viewport = Viewport::new(logical_width, logical_height, quality.scale());
        let applied_size = viewport.render_size();
        target.set_viewport(applied_size.0, applied_size.1);
        tracing::info!(
            logical_width,
            logical_height,
            render_width = applied_size.0,
            render_height = applied_size.1,
            "frame loop ready"
        );

        Self {
            clock: FrameClock::new(),
            quality,
            camera: CameraController::new(&config.camera),
            viewport,
            applied_size,
            scene_time: 0.0,
            time_divisor: config.time_divisor,
            constants: config.scene,
            stats: PerfStats::new(),
            target,
            running: true,
        }
    }

    /// Run one frame for the host timestamp (ms) and ask `scheduler` for the
    /// next one. A draw failure is fatal: the loop stops and the error is
    /// returned.
    pub fn tick<S: FrameScheduler + ?Sized>(&mut self, timestamp: f64, scheduler: &S) -> Result<(), RenderError> {
        if !self.running {
            return Ok(());
        }

        let timing = self.clock.advance(timestamp);

        if self.quality.update(timing.delta_time, timing.elapsed_since_start) {
            self.apply_scale();
        }

        // Out-of-order timestamps count as an empty frame.
        let dt = timing.delta_time.max(0.0);
        self.camera.update(dt);
        self.scene_time += dt / self.time_divisor;

        self.stats.record(dt, self.quality.scale(), self.viewport.render_size());
        let uniforms = self.uniforms();

        if let Err(err) = self.target.draw(&uniforms, &self.stats) {
            tracing::error!(%err, "draw failed, stopping frame loop");
            self.running = false;
            return Err(err);
        }

        scheduler.request_frame();
        Ok(())
    }

    /// Host resize: default quality, fresh adaptation window, new logical size.
    pub fn on_resize(&mut self, logical_width: u32, logical_height: u32) {
        self.quality.reset();
        self.clock.reset();
        self.viewport.set_logical_size(logical_width, logical_height);
        self.viewport.set_scale(self.quality.scale());

        let size = self.viewport.render_size();
        tracing::info!(logical_width, logical_height, render_width = size.0, render_height = size.1, "resize");
        if size != self.applied_size {
            self.push_viewport();
        }
    }

    /// Discrete input. Quality keys adjust the scale right away; everything
    /// else goes to the camera. Returns true if the event changed quality;
    /// a quality key at the floor is consumed but returns false.
    pub fn on_input(&mut self, event: &InputEvent) -> bool {
        if let InputEvent::KeyDown { code, modifiers } = event {
            let step = self.quality.config().manual_step;
            if let Some(delta) = self.camera.processor().quality_adjustment(code, *modifiers, step) {
                return self.adjust_quality(delta);
            }
        }
        self.camera.handle_event(event, self.viewport.logical_size());
        false
    }

    /// Returns true if the scale moved; the viewport is pushed right away.
    pub fn adjust_quality(&mut self, delta: f64) -> bool {
        let changed = self.quality.adjust(delta);
        if changed {
            self.apply_scale();
        }
        changed
    }

    /// Stop rescheduling. A frame already running is not interrupted.
    pub fn stop(&mut self) {
        if self.running {
            tracing::info!("frame loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Snapshot of the parameters the next draw would use.
    pub fn uniforms(&self) -> UniformSet {
        UniformBuilder::build(&self.viewport, &self.camera, self.scene_time, &self.constants)
    }

    pub fn quality(&self) -> &QualityController {
        &self.quality
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn scene_time(&self) -> f64 {
        self.scene_time
    }

    pub fn stats(&self) -> &PerfStats {
        &self.stats
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    fn apply_scale(&mut self) {
        self.viewport.set_scale(self.quality.scale());
        self.push_viewport();
    }

    fn push_viewport(&mut self) {
        let (w, h) = self.viewport.render_size();
        self.target.set_viewport(w, h);
        self.applied_size = (w, h);
    }
}
