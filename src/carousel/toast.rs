use serde::Serialize;

use crate::types::{ErrorKind, LoadError};

const DEMO_NOTICE: &str = "Showing demo content. NASA APOD service is currently unavailable.";

/// Viewer-facing title and message for a load error.
pub fn toast_content(kind: ErrorKind) -> (&'static str, &'static str) {
    match kind {
        ErrorKind::ServiceOutage => ("NASA API Service Outage", DEMO_NOTICE),
        ErrorKind::Timeout => ("Request Timed Out", DEMO_NOTICE),
        ErrorKind::Network => (
            "Network Error",
            "Network error. Please check your internet connection.",
        ),
        ErrorKind::ApiError => ("Demo Mode", DEMO_NOTICE),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ErrorKind,
    pub title: String,
    pub message: String,
}

/// Holds at most one notification. Ids let stale expiry timers be told apart.
#[derive(Debug, Clone, Default)]
pub struct ToastSlot {
    current: Option<Toast>,
    next_id: u64,
}

impl ToastSlot {
    pub fn current(&self) -> Option<&Toast> {
        self.current.as_ref()
    }

    /// Replace any visible toast; returns the new toast's id.
    pub fn show(&mut self, error: &LoadError) -> u64 {
        self.next_id += 1;
        let (title, message) = toast_content(error.kind);
        self.current = Some(Toast {
            id: self.next_id,
            kind: error.kind,
            title: title.to_string(),
            message: message.to_string(),
        });
        self.next_id
    }

    /// Clear the toast only if `id` is still the one on screen.
    pub fn expire(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|t| t.id == id) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}
