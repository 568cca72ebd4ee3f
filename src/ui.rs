use egui::Context;

/// Frame statistics shown in the performance overlay.
#[derive(Debug, Clone, Default)]
pub struct PerfStats {
    pub fps: f32,
    pub frame_ms: f32,
    pub quality: f64,
    pub render_size: (u32, u32),
    frame_count: u32,
    fps_timer_ms: f64,
}

impl PerfStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame. FPS is averaged over roughly one second.
    pub fn record(&mut self, delta_ms: f64, quality: f64, render_size: (u32, u32)) {
        let delta_ms = delta_ms.max(0.0);
        self.frame_ms = delta_ms as f32;
        self.quality = quality;
        self.render_size = render_size;

        self.frame_count += 1;
        self.fps_timer_ms += delta_ms;
        if self.fps_timer_ms >= 1000.0 {
            self.fps = (self.frame_count as f64 * 1000.0 / self.fps_timer_ms) as f32;
            self.frame_count = 0;
            self.fps_timer_ms = 0.0;
        }
    }
}

/// Build the overlay for a surface of `width` x `height` render pixels.
/// `pixels_per_point` should already include the quality scale so the panel
/// keeps its on-screen size when the backing store shrinks.
pub fn build_overlay(
    egui_ctx: &Context,
    stats: &PerfStats,
    width: u32,
    height: u32,
    pixels_per_point: f32,
    now_ms: f64,
) -> egui::FullOutput {
    let mut raw_input = egui::RawInput::default();
    raw_input.time = Some(now_ms / 1000.0);
    raw_input.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::new(0.0, 0.0),
        egui::vec2(width as f32 / pixels_per_point, height as f32 / pixels_per_point),
    ));
    egui_ctx.set_pixels_per_point(pixels_per_point);

    egui_ctx.run(raw_input, |ctx| {
        draw_stats_panel(ctx, stats);
    })
}

fn draw_stats_panel(ctx: &Context, stats: &PerfStats) {
    egui::Area::new(egui::Id::new("perf_stats"))
        .anchor(egui::Align2::LEFT_TOP, [4.0, 4.0])
        .show(ctx, |ui| {
            egui::Frame::NONE
                .fill(egui::Color32::from_black_alpha(180))
                .inner_margin(4.0)
                .show(ui, |ui| {
                    ui.label(
                        egui::RichText::new(format!("{:.0} FPS", stats.fps))
                            .small()
                            .color(egui::Color32::LIGHT_GREEN),
                    );
                    ui.label(egui::RichText::new(format!("{:.1} ms", stats.frame_ms)).small());
                    ui.label(egui::RichText::new(format!("Quality: {:.2}", stats.quality)).small());
                    ui.label(
                        egui::RichText::new(format!(
                            "Res: {}x{}",
                            stats.render_size.0, stats.render_size.1
                        ))
                        .small(),
                    );
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn fps_averages_over_a_second() {
        let mut stats = PerfStats::new();
        for _ in 0..20 {
            stats.record(50.0, 1.0, (800, 600));
        }
        assert_relative_eq!(stats.fps, 20.0, epsilon = 1e-3);
        assert_eq!(stats.frame_ms, 50.0);
    }

    #[test]
    fn fps_holds_until_window_fills() {
        let mut stats = PerfStats::new();
        stats.record(16.0, 0.9, (720, 540));
        assert_eq!(stats.fps, 0.0);
        assert_eq!(stats.quality, 0.9);
        assert_eq!(stats.render_size, (720, 540));
    }

    #[test]
    fn negative_delta_counts_as_zero() {
        let mut stats = PerfStats::new();
        stats.record(-10.0, 1.0, (1, 1));
        assert_eq!(stats.frame_ms, 0.0);
    }

    #[test]
    fn overlay_builds_headless() {
        let ctx = Context::default();
        let mut stats = PerfStats::new();
        stats.record(16.0, 1.0, (640, 480));
        let out = build_overlay(&ctx, &stats, 640, 480, 1.0, 16.0);
        // First frame uploads the font atlas.
        assert!(!out.textures_delta.set.is_empty());
    }
}
