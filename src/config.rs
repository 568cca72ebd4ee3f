use glam::Vec3;

use crate::view::uniforms::SceneConstants;

/// Adaptive-resolution tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityConfig {
    /// Scale restored on startup and on every resize.
    pub default_scale: f64,
    /// Automatic reduction is only allowed this long after the session origin.
    pub adaptation_window_ms: f64,
    /// Frames slower than this count as over budget.
    pub frame_budget_ms: f64,
    /// Amount removed per over-budget frame.
    pub step: f64,
    /// Amount applied per quality key press.
    pub manual_step: f64,
    pub min_scale: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            default_scale: 1.0,
            adaptation_window_ms: 5000.0,
            frame_budget_ms: 45.0,
            step: 0.01,
            manual_step: 0.05,
            min_scale: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second at full input.
    pub roll_speed: f32,
    pub start_position: Vec3,
    pub drag_to_look: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.7,
            roll_speed: std::f32::consts::PI / 3.0,
            start_position: Vec3::ZERO,
            drag_to_look: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    /// Initial logical size of the native window; canvas fallback on the web.
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Flythrough".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Everything tunable about a session, in one place.
#[derive(Debug, Clone, PartialEq)]
pub struct FlythroughConfig {
    pub quality: QualityConfig,
    pub camera: CameraConfig,
    pub scene: SceneConstants,
    /// Milliseconds of wall time per unit of shader time.
    pub time_divisor: f64,
    pub window: WindowConfig,
}

impl Default for FlythroughConfig {
    fn default() -> Self {
        Self {
            quality: QualityConfig::default(),
            camera: CameraConfig::default(),
            scene: SceneConstants::default(),
            time_divisor: 3000.0,
            window: WindowConfig::default(),
        }
    }
}

pub const ENV_QUALITY: &str = "FLYTHROUGH_QUALITY";
pub const ENV_MIN_QUALITY: &str = "FLYTHROUGH_MIN_QUALITY";
pub const ENV_FRAME_BUDGET_MS: &str = "FLYTHROUGH_FRAME_BUDGET_MS";

impl FlythroughConfig {
    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults with overrides taken from `lookup`. Unparsable or
    /// non-positive values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = positive_override(&lookup, ENV_QUALITY) {
            config.quality.default_scale = v;
        }
        if let Some(v) = positive_override(&lookup, ENV_MIN_QUALITY) {
            config.quality.min_scale = v;
        }
        if let Some(v) = positive_override(&lookup, ENV_FRAME_BUDGET_MS) {
            config.quality.frame_budget_ms = v;
        }
        config
    }
}

fn positive_override<F>(lookup: &F, key: &str) -> Option<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => {
            tracing::info!(key, value = v, "config override");
            Some(v)
        }
        _ => {
            tracing::warn!(key, value = %raw, "ignoring invalid config override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_tuning() {
        let c = FlythroughConfig::default();
        assert_eq!(c.quality.default_scale, 1.0);
        assert_eq!(c.quality.adaptation_window_ms, 5000.0);
        assert_eq!(c.quality.frame_budget_ms, 45.0);
        assert_eq!(c.quality.step, 0.01);
        assert_eq!(c.quality.manual_step, 0.05);
        assert_eq!(c.time_divisor, 3000.0);
        assert_eq!(c.camera.move_speed, 0.7);
    }

    #[test]
    fn lookup_overrides_valid_values_only() {
        let vars: HashMap<&str, &str> = [
            (ENV_QUALITY, "0.75"),
            (ENV_MIN_QUALITY, "nope"),
            (ENV_FRAME_BUDGET_MS, "-3"),
        ]
        .into_iter()
        .collect();

        let c = FlythroughConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(c.quality.default_scale, 0.75);
        assert_eq!(c.quality.min_scale, QualityConfig::default().min_scale);
        assert_eq!(c.quality.frame_budget_ms, QualityConfig::default().frame_budget_ms);
    }

    #[test]
    fn empty_lookup_is_default() {
        assert_eq!(FlythroughConfig::from_lookup(|_| None), FlythroughConfig::default());
    }
}
