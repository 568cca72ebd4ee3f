use crate::config::QualityConfig;

/// Whether automatic quality reduction is still allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityRegime {
    /// Within the adaptation window: slow frames lower the scale.
    Adapting,
    /// Window elapsed: scale frozen until `reset`.
    Settled,
}

/// Owns the render scale and lowers it while the session is young and frames
/// are slow.
#[derive(Debug, Clone)]
pub struct QualityController {
    config: QualityConfig,
    scale: f64,
    regime: QualityRegime,
}

impl QualityController {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            scale: config.default_scale,
            regime: QualityRegime::Adapting,
            config,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn regime(&self) -> QualityRegime {
        self.regime
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Per-frame adaptation. Returns true if the scale changed.
    pub fn update(&mut self, delta_time: f64, elapsed_since_start: f64) -> bool {
        if self.regime == QualityRegime::Adapting
            && elapsed_since_start >= self.config.adaptation_window_ms
        {
            self.regime = QualityRegime::Settled;
            tracing::info!(scale = self.scale, "quality settled");
        }

        if self.regime == QualityRegime::Settled || delta_time <= self.config.frame_budget_ms {
            return false;
        }

        let changed = self.set_scale(self.scale - self.config.step);
        if changed {
            tracing::debug!(delta_time, scale = self.scale, "frame over budget, lowering quality");
        }
        changed
    }

    /// Manual change from a quality key. Applies in either regime.
    pub fn adjust(&mut self, delta: f64) -> bool {
        let changed = self.set_scale(self.scale + delta);
        tracing::info!(delta, scale = self.scale, "quality adjusted");
        changed
    }

    /// Back to the default scale and a fresh adaptation window.
    pub fn reset(&mut self) {
        self.scale = self.config.default_scale;
        self.regime = QualityRegime::Adapting;
    }

    fn set_scale(&mut self, scale: f64) -> bool {
        let next = scale.max(self.config.min_scale);
        let changed = next != self.scale;
        self.scale = next;
        changed
    }
}

impl Default for QualityController {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn slow_frame_in_window_lowers_by_one_step() {
        let mut q = QualityController::default();
        assert!(q.update(46.0, 100.0));
        assert_abs_diff_eq!(q.scale(), 0.99, epsilon = 1e-12);
        assert!(q.update(1000.0, 200.0));
        assert_abs_diff_eq!(q.scale(), 0.98, epsilon = 1e-12);
    }

    #[test]
    fn frame_at_or_under_budget_is_ignored() {
        let mut q = QualityController::default();
        assert!(!q.update(45.0, 100.0));
        assert!(!q.update(16.6, 200.0));
        assert!(!q.update(-30.0, 300.0));
        assert_eq!(q.scale(), 1.0);
    }

    #[test]
    fn settles_once_window_elapses() {
        let mut q = QualityController::default();
        assert!(q.update(50.0, 4999.0));
        assert!(!q.update(500.0, 5000.0));
        assert_eq!(q.regime(), QualityRegime::Settled);

        // One-way until reset, even if elapsed goes backwards.
        assert!(!q.update(500.0, 10.0));
        assert_abs_diff_eq!(q.scale(), 0.99, epsilon = 1e-12);
    }

    #[test]
    fn adjust_applies_while_settled() {
        let mut q = QualityController::default();
        q.update(0.0, 6000.0);
        assert_eq!(q.regime(), QualityRegime::Settled);
        assert!(q.adjust(0.05));
        assert_abs_diff_eq!(q.scale(), 1.05, epsilon = 1e-12);
        assert!(q.adjust(-0.05));
        assert_abs_diff_eq!(q.scale(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn reset_restores_default_and_reopens_window() {
        let mut q = QualityController::default();
        q.update(100.0, 0.0);
        q.update(100.0, 9000.0);
        q.reset();
        assert_eq!(q.scale(), 1.0);
        assert_eq!(q.regime(), QualityRegime::Adapting);
        assert!(q.update(100.0, 0.0));
    }

    #[test]
    fn scale_never_drops_below_floor() {
        let mut q = QualityController::default();
        let mut changes = 0;
        for i in 0..200 {
            if q.update(100.0, i as f64) {
                changes += 1;
            }
        }
        assert_abs_diff_eq!(q.scale(), 0.01, epsilon = 1e-9);
        assert!(q.scale() > 0.0);
        assert!(changes < 200);
        assert!(!q.update(100.0, 300.0));

        assert!(!q.adjust(-0.05));
        assert_eq!(q.scale(), q.config().min_scale);
    }
}
