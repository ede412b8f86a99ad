//! Event loop hosting one [`CarouselController`] for the life of a page view.
//!
//! Inputs arrive over an mpsc channel and are applied one at a time. Timers
//! and the pagination request run as tasks owned by the loop; their results
//! come back through a private channel. Every owned task is aborted when the
//! loop exits, so nothing fires after teardown.

use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::controller::{CarouselController, CarouselEvent, Effect};
use super::pages::PageSource;
use crate::constants::TYPE_TICK;
use crate::types::LoadResult;
use crate::view::Frame;

const EVENT_BUFFER: usize = 256;

/// Aborts the wrapped task when dropped.
struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Results of tasks owned by the loop.
enum Internal {
    /// Tick from the ticker of the given generation.
    Tick(u64),
    Page(crate::error::Result<LoadResult>),
    ToastExpired(u64),
}

/// Client side of a running session.
pub struct SessionHandle {
    events: mpsc::Sender<CarouselEvent>,
    frames: watch::Receiver<Frame>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Queue an input event. Fails only once the session has shut down.
    pub async fn send(&self, event: CarouselEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub fn frames(&self) -> watch::Receiver<Frame> {
        self.frames.clone()
    }

    pub fn current_frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Stop the loop and wait until every owned task has been released.
    pub async fn shutdown(self) {
        drop(self.events);
        if let Err(e) = self.task.await {
            warn!("Carousel session ended abnormally: {}", e);
        }
    }
}

pub struct CarouselSession {
    controller: CarouselController,
    pages: Arc<dyn PageSource>,
    internal_tx: mpsc::Sender<Internal>,
    frames: watch::Sender<Frame>,
    ticker: Option<TaskGuard>,
    ticker_generation: u64,
    page_task: Option<TaskGuard>,
    toast_timer: Option<TaskGuard>,
}

impl CarouselSession {
    /// Start a session over an already loaded first page whose window ends at `base`.
    pub fn spawn(
        initial: LoadResult,
        base: NaiveDate,
        batch_size: usize,
        pages: Arc<dyn PageSource>,
    ) -> SessionHandle {
        let (controller, effects) = CarouselController::new(initial, base, batch_size);
        Self::spawn_with(controller, effects, pages)
    }

    pub fn spawn_with(
        controller: CarouselController,
        initial_effects: Vec<Effect>,
        pages: Arc<dyn PageSource>,
    ) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let (internal_tx, internal_rx) = mpsc::channel(EVENT_BUFFER);
        let (frames_tx, frames_rx) = watch::channel(Frame::from_controller(&controller));

        let session = CarouselSession {
            controller,
            pages,
            internal_tx,
            frames: frames_tx,
            ticker: None,
            ticker_generation: 0,
            page_task: None,
            toast_timer: None,
        };
        let task = tokio::spawn(session.run(events_rx, internal_rx, initial_effects));

        SessionHandle {
            events: events_tx,
            frames: frames_rx,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::Receiver<CarouselEvent>,
        mut internal: mpsc::Receiver<Internal>,
        initial_effects: Vec<Effect>,
    ) {
        info!(items = self.controller.items().len(), "Carousel session started");
        self.apply(initial_effects);

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let effects = self.controller.handle(event);
                        self.apply(effects);
                    }
                    None => break,
                },
                Some(message) = internal.recv() => self.on_internal(message),
            }
            self.frames.send_replace(Frame::from_controller(&self.controller));
        }

        // Dropping the guards aborts the ticker, toast timer and any page request.
        self.ticker.take();
        self.toast_timer.take();
        self.page_task.take();
        info!("Carousel session stopped");
    }

    fn on_internal(&mut self, message: Internal) {
        let effects = match message {
            Internal::Tick(generation) if generation == self.ticker_generation => {
                self.controller.handle(CarouselEvent::Tick)
            }
            Internal::Tick(_) => Vec::new(),
            Internal::Page(Ok(result)) => {
                self.page_task = None;
                self.controller.handle(CarouselEvent::PageLoaded(result))
            }
            Internal::Page(Err(e)) => {
                self.page_task = None;
                warn!("Loading the next page failed: {}", e);
                self.controller.handle(CarouselEvent::PageFailed(e.to_string()))
            }
            Internal::ToastExpired(id) => self.controller.handle(CarouselEvent::ToastExpired(id)),
        };
        self.apply(effects);
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartTicker => self.start_ticker(),
                Effect::StopTicker => self.stop_ticker(),
                Effect::RequestPage { base } => self.request_page(base),
                Effect::ScheduleToastExpiry { id, after } => self.schedule_toast_expiry(id, after),
            }
        }
    }

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let generation = self.ticker_generation;
        let tx = self.internal_tx.clone();
        self.ticker = Some(TaskGuard(tokio::spawn(async move {
            let mut interval = tokio::time::interval(TYPE_TICK);
            // first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(Internal::Tick(generation)).await.is_err() {
                    break;
                }
            }
        })));
        debug!(generation, "Typewriter ticker started");
    }

    /// Abort the live ticker; queued ticks from it are dropped by generation.
    fn stop_ticker(&mut self) {
        self.ticker_generation += 1;
        self.ticker = None;
    }

    fn request_page(&mut self, base: NaiveDate) {
        let pages = Arc::clone(&self.pages);
        let tx = self.internal_tx.clone();
        self.page_task = Some(TaskGuard(tokio::spawn(async move {
            let result = pages.load_page(base).await;
            let _ = tx.send(Internal::Page(result)).await;
        })));
    }

    fn schedule_toast_expiry(&mut self, id: u64, after: Duration) {
        let tx = self.internal_tx.clone();
        self.toast_timer = Some(TaskGuard(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(Internal::ToastExpired(id)).await;
        })));
    }
}
