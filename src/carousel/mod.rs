//! Scroll-driven card carousel: input mapping, the transition state machine,
//! typewriter reveal, notifications and the session runtime hosting them.

pub mod controller;
pub mod input;
pub mod pages;
pub mod render;
pub mod session;
pub mod toast;
pub mod typewriter;

pub use controller::{CarouselController, CarouselEvent, Effect};
pub use pages::{LoaderPages, PageSource, RemotePageSource};
pub use session::{CarouselSession, SessionHandle};
