pub mod carousel;
pub mod client;
pub mod config;
pub mod constants;
pub mod dates;
pub mod demo;
pub mod error;
pub mod loader;
pub mod logging;
pub mod media;
pub mod metrics;
pub mod server;
pub mod types;
pub mod view;
