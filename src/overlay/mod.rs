//! On-screen virtual control overlay
//!
//! A fixed set of screen-space buttons for devices without a physical
//! keyboard. Pointer events are hit-tested against the button set and turned
//! into synthetic key events; every frame the same state is drawn back as
//! translucent colored quads for visual feedback.
//!
//! # Architecture
//!
//! ```text
//! Raw pointer events (host) → Translator → ButtonSet press flags
//!                                  ↓              ↓
//!                           KeySink (host     OverlayRenderer
//!                           input queue)      (quads, each frame)
//! ```
//!
//! Everything runs on the host's single event/render thread; no operation
//! blocks and all are O(button count), capped at [`MAX_BUTTONS`].
//!
//! # Usage
//!
//! ```ignore
//! // Once a surface exists
//! let mut overlay = Overlay::new(size.width, size.height, Box::new(sink));
//!
//! // In the event loop
//! overlay.handle_pointer_event(PointerPhase::Down, nx, ny);
//! overlay.on_window_resized(new.width, new.height);
//!
//! // Each frame, after drawing the scene
//! overlay.draw(&device, &queue, config.format, &mut rpass);
//! ```

mod buttons;
mod renderer;
mod translator;

pub use buttons::{Button, ButtonId, ButtonSet, MAX_BUTTONS, NormRect, OverlayError};
pub use renderer::OverlayRenderer;
pub use translator::{KeyEvent, KeySink, PointerPhase, Translator};

use tracing::{info, warn};
use winit::event::ElementState;
use winit::keyboard::KeyCode;

/// The reference button layout: left/down/up/right arrows in the bottom-left
/// corner and an action button in the bottom-right.
pub fn default_layout() -> Vec<(NormRect, KeyCode)> {
    vec![
        (NormRect::new(0.05, 0.75, 0.12, 0.18), KeyCode::ArrowLeft),
        (NormRect::new(0.22, 0.75, 0.12, 0.18), KeyCode::ArrowDown),
        (NormRect::new(0.22, 0.55, 0.12, 0.18), KeyCode::ArrowUp),
        (NormRect::new(0.39, 0.75, 0.12, 0.18), KeyCode::ArrowRight),
        (NormRect::new(0.80, 0.75, 0.15, 0.18), KeyCode::Enter),
    ]
}

/// The overlay: button store, input translator, and renderer in one
/// host-owned value.
///
/// Construct once after the rendering surface exists; the button set is fixed
/// for the overlay's lifetime. All methods expect the host's single
/// event/render thread.
pub struct Overlay {
    buttons: ButtonSet,
    translator: Translator,
    renderer: OverlayRenderer,
}

impl Overlay {
    /// Creates an overlay with the default layout
    ///
    /// `sink` receives every synthesized key event; wire it to the host's
    /// input queue.
    pub fn new(width: u32, height: u32, sink: Box<dyn KeySink>) -> Self {
        Self::with_layout(width, height, &default_layout(), sink)
    }

    /// Creates an overlay with a custom layout
    ///
    /// Entries beyond [`MAX_BUTTONS`] are skipped with a warning rather than
    /// failing construction; a partially registered overlay still works.
    pub fn with_layout(
        width: u32,
        height: u32,
        layout: &[(NormRect, KeyCode)],
        sink: Box<dyn KeySink>,
    ) -> Self {
        let mut buttons = ButtonSet::new(width, height);
        for &(bounds, key) in layout {
            if let Err(e) = buttons.register(bounds, key) {
                warn!(error = %e, ?key, "Skipping button registration");
            }
        }

        info!(
            buttons = buttons.len(),
            window.width = width,
            window.height = height,
            "Overlay initialized"
        );

        Self {
            buttons,
            translator: Translator::new(sink),
            renderer: OverlayRenderer::new(),
        }
    }

    /// Updates the window dimensions used for coordinate conversion
    ///
    /// Call on every resize or orientation change. Button press state is
    /// unaffected.
    pub fn on_window_resized(&mut self, width: u32, height: u32) {
        self.buttons.set_window_size(width, height);
    }

    /// Multi-touch entry point: a pointer event at normalized coordinates
    pub fn handle_pointer_event(&mut self, phase: PointerPhase, nx: f32, ny: f32) {
        self.translator
            .pointer_event(&mut self.buttons, phase, nx, ny);
    }

    /// Fallback entry point for pointer devices reported in pixel coordinates
    ///
    /// On release, every pressed button is released regardless of position
    /// (a single cursor cannot hold several buttons once it lets go).
    pub fn handle_legacy_pointer_event(&mut self, state: ElementState, px: f32, py: f32) {
        self.translator
            .legacy_pointer_event(&mut self.buttons, state, px, py);
    }

    /// Draws the overlay into the host's render pass
    ///
    /// Call once per frame after the host scene, before presenting.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        rpass: &mut wgpu::RenderPass<'_>,
    ) {
        self.renderer
            .draw(device, queue, format, &self.buttons, rpass);
    }

    /// Releases renderer resources
    ///
    /// Idempotent; drawing afterwards transparently recreates them.
    pub fn shutdown(&mut self) {
        self.renderer.shutdown();
    }

    /// Read access to the button collection
    pub fn buttons(&self) -> &ButtonSet {
        &self.buttons
    }
}
