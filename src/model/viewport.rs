/// Logical (host) size plus the quality scale that produces the render size.
///
/// The render size is what the rendering target is configured with; the host
/// stretches it back to the logical size on presentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    logical_width: u32,
    logical_height: u32,
    scale: f64,
}

impl Viewport {
    pub fn new(logical_width: u32, logical_height: u32, scale: f64) -> Self {
        Self {
            logical_width,
            logical_height,
            scale,
        }
    }

    pub fn logical_size(&self) -> (u32, u32) {
        (self.logical_width, self.logical_height)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn render_width(&self) -> u32 {
        scaled(self.logical_width, self.scale)
    }

    pub fn render_height(&self) -> u32 {
        scaled(self.logical_height, self.scale)
    }

    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width(), self.render_height())
    }

    /// Returns true when the render size changed.
    pub fn set_scale(&mut self, scale: f64) -> bool {
        let before = self.render_size();
        self.scale = scale;
        before != self.render_size()
    }

    /// Returns true when the render size changed.
    pub fn set_logical_size(&mut self, width: u32, height: u32) -> bool {
        let before = self.render_size();
        self.logical_width = width;
        self.logical_height = height;
        before != self.render_size()
    }
}

// Truncates like a canvas backing store would, but never below one pixel.
// The small bias keeps 800 * 0.95 from landing on 759.
fn scaled(logical: u32, scale: f64) -> u32 {
    let px = (logical as f64 * scale + 1e-6).floor();
    if px.is_finite() && px >= 1.0 {
        px as u32
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_size_is_logical_times_scale() {
        let vp = Viewport::new(1280, 720, 1.0);
        assert_eq!(vp.render_size(), (1280, 720));

        let vp = Viewport::new(1280, 720, 0.5);
        assert_eq!(vp.render_size(), (640, 360));
    }

    #[test]
    fn render_size_truncates_and_never_collapses() {
        let vp = Viewport::new(1001, 333, 0.5);
        assert_eq!(vp.render_size(), (500, 166));

        let vp = Viewport::new(800, 600, 0.0);
        assert_eq!(vp.render_size(), (1, 1));

        let vp = Viewport::new(800, 600, -0.3);
        assert_eq!(vp.render_size(), (1, 1));
    }

    #[test]
    fn setters_report_render_size_changes() {
        let mut vp = Viewport::new(100, 100, 1.0);
        assert!(vp.set_scale(0.99));
        assert_eq!(vp.render_size(), (99, 99));
        // 100 * 0.995 still floors to 99.
        assert!(!vp.set_scale(0.995));
        assert!(vp.set_logical_size(200, 100));
        assert!(!vp.set_logical_size(200, 100));
    }
}
