//! Main application handler for the demo

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{MouseButton, Touch, TouchPhase, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use super::config::AppConfig;
use super::graphics::Graphics;
use super::window::window_attributes_from_config;
use crate::overlay::{KeyEvent, KeySink, Overlay, PointerPhase};

/// Key sink backed by the host's input queue
///
/// The overlay pushes synthesized key events here and the host drains them in
/// its frame loop exactly as it would drain physical keyboard events.
#[derive(Clone, Default)]
pub struct QueueSink(Rc<RefCell<VecDeque<KeyEvent>>>);

impl QueueSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pop(&self) -> Option<KeyEvent> {
        self.0.borrow_mut().pop_front()
    }
}

impl KeySink for QueueSink {
    fn key_event(&mut self, event: KeyEvent) {
        self.0.borrow_mut().push_back(event);
    }
}

/// Demo application hosting the overlay
pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    graphics: Option<Graphics>,
    overlay: Option<Overlay>,
    /// Host's input queue; the overlay's sink feeds it
    key_queue: QueueSink,
    /// Last cursor position, needed because mouse button events carry none
    cursor_pos: Option<[f32; 2]>,
}

impl App {
    /// Creates a new demo application with the provided configuration
    pub fn new(config: AppConfig) -> Self {
        info!(profile = %config.profile, "Starting virtual pad demo");
        info!(?config.window, "Window configuration");

        Self {
            config,
            window: None,
            graphics: None,
            overlay: None,
            key_queue: QueueSink::new(),
            cursor_pos: None,
        }
    }

    /// Creates a new demo application with configuration loaded from environment
    pub fn from_env() -> Self {
        let config = AppConfig::load_from_env().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using default configuration");
            AppConfig::default()
        });
        Self::new(config)
    }

    /// Forwards a touch event to the overlay in normalized coordinates
    fn forward_touch(&mut self, touch: &Touch) {
        let (Some(window), Some(overlay)) = (&self.window, &mut self.overlay) else {
            return;
        };

        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return;
        }

        let nx = touch.location.x as f32 / size.width as f32;
        let ny = touch.location.y as f32 / size.height as f32;

        let phase = match touch.phase {
            TouchPhase::Started => PointerPhase::Down,
            TouchPhase::Moved => PointerPhase::Motion,
            TouchPhase::Ended | TouchPhase::Cancelled => PointerPhase::Up,
        };

        overlay.handle_pointer_event(phase, nx, ny);
    }

    /// Drains synthesized key events the way a host consumes keyboard input
    fn drain_key_queue(&mut self) {
        while let Some(event) = self.key_queue.pop() {
            info!(
                key = ?event.key,
                pressed = event.is_pressed(),
                "Virtual key event"
            );
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = window_attributes_from_config(&self.config.window);

            match event_loop.create_window(window_attributes) {
                Ok(window) => {
                    let size = window.inner_size();
                    info!(
                        window.width = size.width,
                        window.height = size.height,
                        "Window created successfully"
                    );

                    let window = Arc::new(window);

                    // Initialize graphics using a tokio runtime because
                    // winit's event loop is synchronous
                    let graphics = tokio::runtime::Runtime::new()
                        .expect("Failed to create tokio runtime")
                        .block_on(async {
                            Graphics::new(window.clone(), self.config.window.vsync).await
                        });

                    match graphics {
                        Ok(graphics) => {
                            info!("Graphics initialized successfully");
                            self.overlay = Some(Overlay::new(
                                size.width,
                                size.height,
                                Box::new(self.key_queue.clone()),
                            ));
                            self.graphics = Some(graphics);
                            self.window = Some(window);
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to initialize graphics");
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Failed to create window");
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, exiting");
                if let Some(overlay) = &mut self.overlay {
                    overlay.shutdown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(graphics) = &mut self.graphics {
                    graphics.resize(new_size);
                }
                if let Some(overlay) = &mut self.overlay {
                    overlay.on_window_resized(new_size.width, new_size.height);
                }
            }
            WindowEvent::Touch(touch) => {
                self.forward_touch(&touch);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = [position.x as f32, position.y as f32];
                self.cursor_pos = Some(pos);

                // A moving cursor acts like a dragging finger so held buttons
                // release when the mouse leaves them
                if let (Some(overlay), Some(window)) = (&mut self.overlay, &self.window) {
                    let size = window.inner_size();
                    if size.width > 0 && size.height > 0 {
                        overlay.handle_pointer_event(
                            PointerPhase::Motion,
                            pos[0] / size.width as f32,
                            pos[1] / size.height as f32,
                        );
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                if let (Some(overlay), Some([px, py])) = (&mut self.overlay, self.cursor_pos) {
                    overlay.handle_legacy_pointer_event(state, px, py);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(graphics), Some(overlay)) = (&mut self.graphics, &mut self.overlay) {
                    match graphics.draw(overlay) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => {
                            warn!("Surface lost, reconfiguring");
                            if let Some(window) = &self.window {
                                graphics.resize(window.inner_size());
                            }
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("Out of memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => {
                            error!(error = %e, "Render error");
                        }
                    }
                }

                self.drain_key_queue();
            }
            _ => {}
        }
    }
}
