//! Demo host application
//!
//! Handles windowing, graphics setup, and forwarding of raw pointer events
//! into the overlay.

pub mod config;
mod graphics;
mod runner;
mod window;

pub use config::{AppConfig, WindowConfig};
pub use graphics::Graphics;
pub use runner::{App, QueueSink};
pub use window::window_attributes_from_config;
