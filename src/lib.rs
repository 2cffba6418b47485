//! Virtual Pad
//!
//! An on-screen virtual control overlay built with Rust, winit, and wgpu.
//! Touching (or clicking) one of the overlay's buttons synthesizes key events
//! that the host application consumes like physical keyboard input.

/// Demo host application - windowing, graphics setup, and event forwarding
pub mod app;

/// The overlay core - button geometry, input translation, and rendering
pub mod overlay;
