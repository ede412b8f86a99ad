//! Derived, non-authoritative render output.

use askama::Template;
use serde::Serialize;

use crate::carousel::controller::CarouselController;
use crate::carousel::render::RenderParams;
use crate::carousel::toast::toast_content;
use crate::carousel::typewriter::TypingState;
use crate::constants::HEADING;
use crate::demo::is_demo;
use crate::error::Result;
use crate::media::is_video_url;
use crate::types::{ApodRecord, ErrorKind, LoadResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub index: usize,
    pub title: String,
    pub date: String,
    pub media_url: String,
    pub is_video: bool,
    pub is_demo: bool,
    pub revealed_text: String,
    pub typing: TypingState,
    pub params: RenderParams,
    pub transform: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToastView {
    pub title: String,
    pub message: String,
}

/// Everything the page needs to paint one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub heading: String,
    pub card: Option<CardView>,
    pub toast: Option<ToastView>,
    pub item_count: usize,
    pub loading_more: bool,
}

impl Frame {
    pub fn from_controller(controller: &CarouselController) -> Self {
        let card = controller.active_item().map(|item| {
            let params = controller.render_params();
            CardView {
                index: controller.active_index(),
                revealed_text: controller.revealed_text().to_string(),
                typing: controller.typing_state(),
                transform: params.css_transform(),
                params,
                ..card_base(item)
            }
        });

        Self {
            heading: HEADING.to_string(),
            card,
            toast: controller.toast().map(|toast| ToastView {
                title: toast.title.clone(),
                message: toast.message.clone(),
            }),
            item_count: controller.items().len(),
            loading_more: controller.loading_more(),
        }
    }
}

fn card_base(item: &ApodRecord) -> CardView {
    let params = RenderParams {
        scale: 1.0,
        opacity: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };
    CardView {
        index: 0,
        title: item.title.clone(),
        date: item.date.clone(),
        media_url: item.media_url.clone(),
        is_video: is_video_url(&item.media_url),
        is_demo: is_demo(item),
        revealed_text: String::new(),
        typing: TypingState::Idle,
        transform: params.css_transform(),
        params,
    }
}

/// One entry of the server-rendered first page.
pub struct IndexCard {
    pub index: usize,
    pub title: String,
    pub date: String,
    pub media_url: String,
    pub is_video: bool,
    pub explanation: String,
}

pub struct IndexToast {
    pub kind: ErrorKind,
    pub title: &'static str,
    pub message: &'static str,
}

/// Static page for the first load: heading, one card per entry, optional toast.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub heading: &'static str,
    pub cards: Vec<IndexCard>,
    pub toast: Option<IndexToast>,
}

impl IndexTemplate {
    pub fn from_result(result: &LoadResult) -> Self {
        let cards = result
            .apods
            .iter()
            .enumerate()
            .map(|(index, item)| IndexCard {
                index,
                title: item.title.clone(),
                date: item.date.clone(),
                media_url: item.media_url.clone(),
                is_video: is_video_url(&item.media_url),
                explanation: item.explanation.clone(),
            })
            .collect();

        let toast = result.error.as_ref().map(|error| {
            let (title, message) = toast_content(error.kind);
            IndexToast {
                kind: error.kind,
                title,
                message,
            }
        });

        Self {
            heading: HEADING,
            cards,
            toast,
        }
    }
}

pub fn render_index(result: &LoadResult) -> Result<String> {
    Ok(IndexTemplate::from_result(result).render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::controller::CarouselEvent;
    use crate::carousel::input::DeltaMode;
    use crate::types::LoadError;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(title: &str, url: &str) -> ApodRecord {
        ApodRecord {
            title: title.to_string(),
            date: "2024-01-03".to_string(),
            media_url: url.to_string(),
            explanation: "Dust & gas".to_string(),
        }
    }

    #[test]
    fn frame_tracks_active_card() {
        let initial = LoadResult {
            apods: vec![
                record("One", "https://apod.nasa.gov/1.jpg"),
                record("Two", "https://www.youtube.com/embed/x"),
                record("Three", "https://apod.nasa.gov/3.jpg"),
            ],
            error: Some(LoadError::network()),
        };
        let base = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let (mut controller, _) =
            CarouselController::with_rng(initial, base, 3, StdRng::seed_from_u64(3));
        controller.handle(CarouselEvent::Wheel {
            delta_y: 2_100.0,
            delta_mode: DeltaMode::Pixel,
        });

        let frame = Frame::from_controller(&controller);
        let card = frame.card.unwrap();
        assert_eq!(frame.heading, "APOD Timeline");
        assert_eq!(card.index, 1);
        assert_eq!(card.title, "Two");
        assert!(card.is_video);
        assert_eq!(card.transform, "translate(0px, 0px) scale(0.5)");
        assert_eq!(frame.toast.unwrap().title, "Network Error");
        assert_eq!(frame.item_count, 3);
    }

    #[test]
    fn index_escapes_content() {
        let result = LoadResult {
            apods: vec![record("<Eclipse>", "https://apod.nasa.gov/a.jpg?x=1&y=2")],
            error: None,
        };
        let html = render_index(&result).unwrap();
        assert!(html.contains("<h2>&lt;Eclipse&gt;</h2>"));
        assert!(html.contains("x=1&amp;y=2"));
        assert!(html.contains("Dust &amp; gas"));
        assert!(!html.contains("class=\"toast\""));
    }

    #[test]
    fn index_embeds_videos() {
        let result = LoadResult {
            apods: vec![record("Timelapse", "https://www.youtube.com/embed/x")],
            error: None,
        };
        let html = render_index(&result).unwrap();
        assert!(html.contains("<iframe src=\""));
        assert!(html.contains("youtube.com"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn index_shows_toast_for_errors() {
        let result = LoadResult {
            apods: vec![record("Demo", "/assets/demo.jpg")],
            error: Some(LoadError::service_outage()),
        };
        let html = render_index(&result).unwrap();
        assert!(html.contains("data-error=\"service_outage\""));
        assert!(html.contains("NASA API Service Outage"));
    }
}
