//! Tuning constants shared by the loader and the carousel engine.
use std::time::Duration;

// Loader
pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_IMAGE_WIDTH: u32 = 800;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 600;
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "apod_timeline=info,warn";

// Timeline
pub const SEGMENT_LENGTH: f64 = 1000.0;
pub const SCROLL_SENSITIVITY: f64 = 0.5;
/// Pixels per line for wheel events reported in line units.
pub const LINE_DELTA_MULTIPLIER: f64 = 20.0;

// Card animation
pub const SCALE_OFFSET: f64 = 0.5;
pub const SCALE_CAP: f64 = 1.3;
pub const SCALE_HOLD_PROGRESS: f64 = 0.5;
pub const FADE_START: f64 = 0.8;
pub const FLY_OFF_DISTANCE: f64 = 500.0;
pub const VERTICAL_DRIFT: f64 = 50.0;

// Timers
pub const TYPE_TICK: Duration = Duration::from_millis(10);
pub const TOAST_DURATION: Duration = Duration::from_secs(8);

/// Request the next page once the active card is this close to the end.
pub const PAGINATION_LOOKAHEAD: usize = 1;

pub const HEADING: &str = "APOD Timeline";
