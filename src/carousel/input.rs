//! Raw pointer input normalized to timeline deltas.

use serde::{Deserialize, Serialize};

use crate::constants::LINE_DELTA_MULTIPLIER;

/// Unit of a wheel event's delta, as reported by the DOM `deltaMode` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
    Page,
}

impl DeltaMode {
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => DeltaMode::Line,
            2 => DeltaMode::Page,
            _ => DeltaMode::Pixel,
        }
    }
}

/// Wheel delta in pixel-equivalent units, before sensitivity is applied.
pub fn wheel_delta(delta_y: f64, mode: DeltaMode) -> f64 {
    match mode {
        DeltaMode::Line => delta_y * LINE_DELTA_MULTIPLIER,
        DeltaMode::Pixel | DeltaMode::Page => delta_y,
    }
}

/// Turns successive touch samples into signed vertical deltas.
///
/// Dragging the finger upwards yields a positive delta, matching a wheel
/// scrolled down.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    last_y: Option<f64>,
}

impl TouchTracker {
    pub fn start(&mut self, y: f64) {
        self.last_y = Some(y);
    }

    /// Delta since the previous sample; a move without a prior sample seeds the tracker.
    pub fn move_to(&mut self, y: f64) -> f64 {
        let delta = self.last_y.map(|last| last - y).unwrap_or(0.0);
        self.last_y = Some(y);
        delta
    }

    pub fn end(&mut self) {
        self.last_y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_mode_is_scaled() {
        assert_eq!(wheel_delta(3.0, DeltaMode::Line), 60.0);
        assert_eq!(wheel_delta(3.0, DeltaMode::Pixel), 3.0);
        assert_eq!(DeltaMode::from_dom(1), DeltaMode::Line);
        assert_eq!(DeltaMode::from_dom(7), DeltaMode::Pixel);
    }

    #[test]
    fn touch_deltas_follow_consecutive_samples() {
        let mut touch = TouchTracker::default();
        touch.start(500.0);
        assert_eq!(touch.move_to(450.0), 50.0);
        assert_eq!(touch.move_to(470.0), -20.0);
        touch.end();
        assert_eq!(touch.move_to(100.0), 0.0);
        assert_eq!(touch.move_to(90.0), 10.0);
    }
}
