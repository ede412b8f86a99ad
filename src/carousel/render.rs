use serde::Serialize;

use crate::constants::{
    FADE_START, FLY_OFF_DISTANCE, SCALE_CAP, SCALE_HOLD_PROGRESS, SCALE_OFFSET, SEGMENT_LENGTH,
    VERTICAL_DRIFT,
};

/// Transform and opacity of the active card for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderParams {
    pub scale: f64,
    pub opacity: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl RenderParams {
    pub fn css_transform(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }
}

/// Position within the active card's segment, in half-segments.
pub fn progress(scroll_timeline: f64, active_index: usize) -> f64 {
    (scroll_timeline - active_index as f64 * SEGMENT_LENGTH) / (SEGMENT_LENGTH / 2.0)
}

/// Fly-off direction for a card: even indices leave to the right, odd to the left.
pub fn fly_direction(index: usize) -> f64 {
    if index % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Pure mapping from progress to the card's transform.
///
/// The card grows until progress 0.5, holds, then from `FADE_START` fades out
/// while flying off horizontally, fully transparent at progress 1.8.
pub fn render_params(progress: f64, fly_direction: f64, vertical_direction: f64) -> RenderParams {
    let mut scale = if progress >= SCALE_HOLD_PROGRESS {
        SCALE_CAP
    } else {
        (progress + SCALE_OFFSET).min(SCALE_CAP)
    };

    let fading = progress >= FADE_START;
    let opacity = if fading {
        (1.0 - (progress - FADE_START)).max(0.0)
    } else {
        1.0
    };
    if opacity <= 0.5 {
        scale = SCALE_CAP;
    }

    let (translate_x, translate_y) = if fading {
        let fly_off = (FLY_OFF_DISTANCE * (progress - FADE_START)).min(FLY_OFF_DISTANCE);
        (fly_off * fly_direction, vertical_direction * VERTICAL_DRIFT)
    } else {
        (0.0, 0.0)
    };

    RenderParams {
        scale,
        opacity,
        translate_x,
        translate_y,
    }
}
