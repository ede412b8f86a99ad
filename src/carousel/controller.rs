//! Scroll-timeline state machine for the card carousel.
//!
//! The controller is synchronous and owns no timers or tasks. Every input
//! returns the [`Effect`]s the hosting runtime must carry out.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tracing::{debug, info};

use super::input::{wheel_delta, DeltaMode, TouchTracker};
use super::render::{fly_direction, progress, render_params, RenderParams};
use super::toast::{Toast, ToastSlot};
use super::typewriter::{TickerChange, Typewriter, TypingState};
use crate::constants::{PAGINATION_LOOKAHEAD, SCROLL_SENSITIVITY, SEGMENT_LENGTH, TOAST_DURATION};
use crate::dates::{window_start, DATE_FORMAT};
use crate::demo::is_demo;
use crate::types::{ApodRecord, LoadResult};

/// Inputs accepted by the controller.
#[derive(Debug, Clone)]
pub enum CarouselEvent {
    Wheel { delta_y: f64, delta_mode: DeltaMode },
    TouchStart { y: f64 },
    TouchMove { y: f64 },
    TouchEnd,
    /// Click or Enter/Space on the active card.
    Activate,
    PointerDownOutside,
    Tick,
    PageLoaded(LoadResult),
    PageFailed(String),
    DismissToast,
    ToastExpired(u64),
}

/// Side effects requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartTicker,
    StopTicker,
    RequestPage { base: NaiveDate },
    ScheduleToastExpiry { id: u64, after: Duration },
}

pub struct CarouselController {
    items: Vec<ApodRecord>,
    active_index: usize,
    scroll_timeline: f64,
    typewriter: Typewriter,
    touch: TouchTracker,
    loading_more: bool,
    last_loaded_date: NaiveDate,
    pending_window_start: Option<NaiveDate>,
    batch_size: usize,
    fly_direction: f64,
    vertical_direction: f64,
    toast: ToastSlot,
    rng: StdRng,
}

impl CarouselController {
    /// Build from the first load of a page view.
    ///
    /// `base` is the newest date of that load's window. `batch_size` only
    /// anchors pagination when the load holds nothing but the demo entry.
    /// The returned effects cover the initial toast and, for a short first
    /// page, the first page request.
    pub fn new(initial: LoadResult, base: NaiveDate, batch_size: usize) -> (Self, Vec<Effect>) {
        Self::with_rng(initial, base, batch_size, StdRng::from_entropy())
    }

    pub fn with_rng(
        initial: LoadResult,
        base: NaiveDate,
        batch_size: usize,
        rng: StdRng,
    ) -> (Self, Vec<Effect>) {
        let last_loaded_date =
            earliest_loaded(&initial.apods).unwrap_or_else(|| window_start(batch_size, base));
        let mut controller = Self {
            items: initial.apods,
            active_index: 0,
            scroll_timeline: 0.0,
            typewriter: Typewriter::default(),
            touch: TouchTracker::default(),
            loading_more: false,
            last_loaded_date,
            pending_window_start: None,
            batch_size,
            fly_direction: fly_direction(0),
            vertical_direction: 1.0,
            toast: ToastSlot::default(),
            rng,
        };

        let mut effects = Vec::new();
        if let Some(error) = initial.error.as_ref() {
            let id = controller.toast.show(error);
            effects.push(Effect::ScheduleToastExpiry {
                id,
                after: TOAST_DURATION,
            });
        }
        controller.maybe_request_page(&mut effects);
        (controller, effects)
    }

    pub fn handle(&mut self, event: CarouselEvent) -> Vec<Effect> {
        match event {
            CarouselEvent::Wheel {
                delta_y,
                delta_mode,
            } => self.scroll(wheel_delta(delta_y, delta_mode)),
            CarouselEvent::TouchStart { y } => {
                self.touch.start(y);
                Vec::new()
            }
            CarouselEvent::TouchMove { y } => {
                let delta = self.touch.move_to(y);
                self.scroll(delta)
            }
            CarouselEvent::TouchEnd => {
                self.touch.end();
                Vec::new()
            }
            CarouselEvent::Activate => self.activate(),
            CarouselEvent::PointerDownOutside => self.pointer_down_outside(),
            CarouselEvent::Tick => self.tick(),
            CarouselEvent::PageLoaded(result) => self.page_loaded(result),
            CarouselEvent::PageFailed(message) => self.page_failed(&message),
            CarouselEvent::DismissToast => {
                self.toast.dismiss();
                Vec::new()
            }
            CarouselEvent::ToastExpired(id) => {
                self.toast.expire(id);
                Vec::new()
            }
        }
    }

    /// Feed a pixel-equivalent delta into the timeline.
    ///
    /// Crossing the end of the active segment advances exactly one card and
    /// re-anchors the timeline at the new card's segment start, so a single
    /// large delta can never skip a card.
    pub fn scroll(&mut self, delta: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.items.is_empty() {
            return effects;
        }

        let segment_start = self.active_index as f64 * SEGMENT_LENGTH;
        self.scroll_timeline = (self.scroll_timeline + delta * SCROLL_SENSITIVITY).max(segment_start);

        if self.scroll_timeline > segment_start + SEGMENT_LENGTH {
            self.advance(&mut effects);
        }
        effects
    }

    fn advance(&mut self, effects: &mut Vec<Effect>) {
        self.active_index = (self.active_index + 1) % self.items.len();
        self.scroll_timeline = self.active_index as f64 * SEGMENT_LENGTH;
        self.fly_direction = fly_direction(self.active_index);
        self.vertical_direction = if self.rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        if self.typewriter.reset() == TickerChange::Stop {
            effects.push(Effect::StopTicker);
        }
        debug!(active_index = self.active_index, "Advanced to next card");
        self.maybe_request_page(effects);
    }

    fn maybe_request_page(&mut self, effects: &mut Vec<Effect>) {
        if self.loading_more || self.items.is_empty() {
            return;
        }
        if self.active_index + PAGINATION_LOOKAHEAD < self.items.len() {
            return;
        }

        let base = self.last_loaded_date - chrono::Duration::days(1);
        self.loading_more = true;
        self.pending_window_start = Some(window_start(self.batch_size, base));
        info!(%base, "Requesting next page");
        effects.push(Effect::RequestPage { base });
    }

    pub fn activate(&mut self) -> Vec<Effect> {
        let len = self.active_text_len();
        ticker_effect(self.typewriter.activate(len))
    }

    pub fn pointer_down_outside(&mut self) -> Vec<Effect> {
        ticker_effect(self.typewriter.reset())
    }

    pub fn tick(&mut self) -> Vec<Effect> {
        let len = self.active_text_len();
        ticker_effect(self.typewriter.tick(len))
    }

    pub fn page_loaded(&mut self, result: LoadResult) -> Vec<Effect> {
        let mut effects = Vec::new();
        let requested_start = self.pending_window_start.take();
        // The page's own dates win over the locally computed window, since
        // the serving side may use a different batch size.
        if let Some(start) = earliest_loaded(&result.apods).or(requested_start) {
            self.last_loaded_date = self.last_loaded_date.min(start);
        }
        self.loading_more = false;

        info!(appended = result.apods.len(), "Page appended");
        self.items.extend(result.apods);
        if let Some(error) = result.error.as_ref() {
            let id = self.toast.show(error);
            effects.push(Effect::ScheduleToastExpiry {
                id,
                after: TOAST_DURATION,
            });
        }
        effects
    }

    /// The page request itself failed; nothing is appended and the next
    /// transition near the end may try again.
    pub fn page_failed(&mut self, message: &str) -> Vec<Effect> {
        debug!("Page request failed: {}", message);
        self.pending_window_start = None;
        self.loading_more = false;
        Vec::new()
    }

    fn active_text_len(&self) -> usize {
        self.active_item()
            .map(|item| item.explanation.chars().count())
            .unwrap_or(0)
    }

    pub fn items(&self) -> &[ApodRecord] {
        &self.items
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_item(&self) -> Option<&ApodRecord> {
        self.items.get(self.active_index)
    }

    pub fn scroll_timeline(&self) -> f64 {
        self.scroll_timeline
    }

    pub fn progress(&self) -> f64 {
        progress(self.scroll_timeline, self.active_index)
    }

    pub fn render_params(&self) -> RenderParams {
        render_params(self.progress(), self.fly_direction, self.vertical_direction)
    }

    pub fn typing_state(&self) -> TypingState {
        self.typewriter.state()
    }

    pub fn revealed_text(&self) -> &str {
        self.active_item()
            .map(|item| self.typewriter.revealed(&item.explanation))
            .unwrap_or("")
    }

    pub fn loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn last_loaded_date(&self) -> NaiveDate {
        self.last_loaded_date
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.current()
    }
}

/// Oldest date among real entries; the demo stand-in is dated today and skipped.
fn earliest_loaded(items: &[ApodRecord]) -> Option<NaiveDate> {
    items
        .iter()
        .filter(|item| !is_demo(item))
        .filter_map(|item| NaiveDate::parse_from_str(&item.date, DATE_FORMAT).ok())
        .min()
}

fn ticker_effect(change: TickerChange) -> Vec<Effect> {
    match change {
        TickerChange::Start => vec![Effect::StartTicker],
        TickerChange::Stop => vec![Effect::StopTicker],
        TickerChange::Keep => Vec::new(),
    }
}
