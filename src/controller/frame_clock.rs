/// Per-frame timing derived from the host timestamp stream (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub timestamp: f64,
    /// May be negative if the host hands out a timestamp older than the last one.
    pub delta_time: f64,
    pub elapsed_since_start: f64,
}

/// Turns monotonic host timestamps into delta and session-elapsed time.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    start_time: Option<f64>,
    last_timestamp: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, timestamp: f64) -> FrameTiming {
        let start = *self.start_time.get_or_insert(timestamp);
        let delta_time = match self.last_timestamp {
            Some(last) => timestamp - last,
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);

        if delta_time < 0.0 {
            tracing::warn!(timestamp, delta_time, "non-monotonic frame timestamp");
        }

        FrameTiming {
            timestamp,
            delta_time,
            elapsed_since_start: timestamp - start,
        }
    }

    /// Re-anchor the session origin on the next `advance`. Delta time keeps
    /// flowing from the last seen timestamp.
    pub fn reset(&mut self) {
        self.start_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_advance_anchors_session() {
        let mut clock = FrameClock::new();
        let t = clock.advance(1234.5);
        assert_eq!(t.delta_time, 0.0);
        assert_eq!(t.elapsed_since_start, 0.0);
        assert_eq!(clock.advance(1250.5).elapsed_since_start, 16.0);
    }

    #[test]
    fn elapsed_tracks_first_timestamp() {
        let mut clock = FrameClock::new();
        let stamps = [100.0, 116.0, 133.5, 150.0, 400.0, 401.0];
        for &ts in &stamps {
            let t = clock.advance(ts);
            assert_eq!(t.elapsed_since_start, ts - stamps[0]);
        }
    }

    #[test]
    fn delta_is_difference_of_consecutive_stamps() {
        let mut clock = FrameClock::new();
        clock.advance(10.0);
        assert_eq!(clock.advance(26.0).delta_time, 16.0);
        assert_eq!(clock.advance(26.0).delta_time, 0.0);
        assert_eq!(clock.advance(100.0).delta_time, 74.0);
    }

    #[test]
    fn reset_restarts_elapsed_but_not_delta() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        clock.advance(9000.0);
        clock.reset();

        let t = clock.advance(9016.0);
        assert_eq!(t.elapsed_since_start, 0.0);
        assert_eq!(t.delta_time, 16.0);
        assert_eq!(clock.advance(9032.0).elapsed_since_start, 16.0);
    }

    #[test]
    fn non_monotonic_stamp_yields_negative_delta() {
        let mut clock = FrameClock::new();
        clock.advance(500.0);
        let t = clock.advance(480.0);
        assert_eq!(t.delta_time, -20.0);
        assert_eq!(t.elapsed_since_start, -20.0);
    }
}
