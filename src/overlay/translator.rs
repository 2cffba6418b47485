//! Pointer-to-key translation
//!
//! Maps raw pointer events (finger down/up/motion, mouse down/up) onto button
//! press transitions and emits one synthetic key event per transition through
//! an injected [`KeySink`]. No per-pointer identity is tracked: every event is
//! treated as a position sample against the full button set, which is enough
//! for independent, non-overlapping buttons.

use std::time::Instant;

use winit::event::ElementState;
use winit::keyboard::KeyCode;

use super::buttons::ButtonSet;

/// Phase of a multi-touch pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Up,
    Motion,
}

/// A synthesized key event
///
/// Carries exactly what the host's key handling expects from a physical key:
/// the key code, pressed/released state, and a timestamp. The key code is a
/// pass-through of whatever the button was bound to at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyCode,
    pub state: ElementState,
    pub timestamp: Instant,
}

impl KeyEvent {
    pub fn is_pressed(&self) -> bool {
        self.state.is_pressed()
    }
}

/// Receiver for synthesized key events
///
/// The host wires this to its real input queue so existing key handling
/// consumes virtual-button input unchanged. Tests capture events instead.
pub trait KeySink {
    fn key_event(&mut self, event: KeyEvent);
}

/// Translates pointer events into button transitions and key events
///
/// State machine per button: Released -> Pressed -> Released. All transitions
/// implied by one pointer event are applied to the button set before the
/// corresponding key events reach the sink; events arrive in registration
/// order.
pub struct Translator {
    sink: Box<dyn KeySink>,
}

impl Translator {
    pub fn new(sink: Box<dyn KeySink>) -> Self {
        Self { sink }
    }

    /// Handles a multi-touch pointer event at a normalized position
    pub fn pointer_event(
        &mut self,
        buttons: &mut ButtonSet,
        phase: PointerPhase,
        nx: f32,
        ny: f32,
    ) {
        match phase {
            PointerPhase::Down => self.press_containing(buttons, nx, ny),
            PointerPhase::Up => self.release_containing(buttons, nx, ny),
            PointerPhase::Motion => self.release_escaped(buttons, nx, ny),
        }
    }

    /// Handles a mouse event reported in pixel coordinates
    ///
    /// The fallback path for pointer devices that are not touch screens.
    /// Down presses every released button under the cursor; Up releases every
    /// pressed button unconditionally - a single cursor cannot still be inside
    /// a button it pressed elsewhere, so on release all held buttons are
    /// assumed to have lost input. This deliberately differs from the
    /// position-scoped Up of the multi-touch path.
    pub fn legacy_pointer_event(
        &mut self,
        buttons: &mut ButtonSet,
        state: ElementState,
        px: f32,
        py: f32,
    ) {
        let [nx, ny] = buttons.normalize(px, py);
        match state {
            ElementState::Pressed => self.press_containing(buttons, nx, ny),
            ElementState::Released => self.release_all(buttons),
        }
    }

    /// Presses every released button containing the point
    ///
    /// Overlapping buttons may both fire; overlap is a layout mistake, not
    /// something prevented at runtime.
    fn press_containing(&mut self, buttons: &mut ButtonSet, nx: f32, ny: f32) {
        let mut emitted = Vec::new();
        for button in buttons.iter_mut() {
            if !button.pressed && button.bounds.contains(nx, ny) {
                button.pressed = true;
                emitted.push(button.key);
            }
        }
        self.emit_all(&emitted, ElementState::Pressed);
    }

    /// Releases every pressed button containing the point
    fn release_containing(&mut self, buttons: &mut ButtonSet, nx: f32, ny: f32) {
        let mut emitted = Vec::new();
        for button in buttons.iter_mut() {
            if button.pressed && button.bounds.contains(nx, ny) {
                button.pressed = false;
                emitted.push(button.key);
            }
        }
        self.emit_all(&emitted, ElementState::Released);
    }

    /// Releases every pressed button the point has moved out of (drag-off)
    ///
    /// Motion never presses a button that was not already pressed.
    fn release_escaped(&mut self, buttons: &mut ButtonSet, nx: f32, ny: f32) {
        let mut emitted = Vec::new();
        for button in buttons.iter_mut() {
            if button.pressed && !button.bounds.contains(nx, ny) {
                button.pressed = false;
                emitted.push(button.key);
            }
        }
        self.emit_all(&emitted, ElementState::Released);
    }

    /// Releases every pressed button regardless of position
    fn release_all(&mut self, buttons: &mut ButtonSet) {
        let mut emitted = Vec::new();
        for button in buttons.iter_mut() {
            if button.pressed {
                button.pressed = false;
                emitted.push(button.key);
            }
        }
        self.emit_all(&emitted, ElementState::Released);
    }

    fn emit_all(&mut self, keys: &[KeyCode], state: ElementState) {
        let timestamp = Instant::now();
        for &key in keys {
            self.sink.key_event(KeyEvent {
                key,
                state,
                timestamp,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::overlay::buttons::NormRect;

    /// Sink that records every event for assertions
    #[derive(Clone, Default)]
    struct Capture(Rc<RefCell<Vec<KeyEvent>>>);

    impl KeySink for Capture {
        fn key_event(&mut self, event: KeyEvent) {
            self.0.borrow_mut().push(event);
        }
    }

    impl Capture {
        fn events(&self) -> Vec<KeyEvent> {
            self.0.borrow().clone()
        }
    }

    fn setup() -> (ButtonSet, Translator, Capture) {
        let mut buttons = ButtonSet::new(800, 600);
        buttons
            .register(NormRect::new(0.05, 0.75, 0.12, 0.18), KeyCode::ArrowLeft)
            .unwrap();
        buttons
            .register(NormRect::new(0.80, 0.75, 0.15, 0.18), KeyCode::Enter)
            .unwrap();

        let capture = Capture::default();
        let translator = Translator::new(Box::new(capture.clone()));
        (buttons, translator, capture)
    }

    #[test]
    fn test_down_presses_and_emits_once() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);

        let events = capture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, KeyCode::ArrowLeft);
        assert!(events[0].is_pressed());
        assert!(buttons.get(crate::overlay::ButtonId(0)).unwrap().pressed);

        // A second Down on an already-pressed button is idempotent
        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);
        assert_eq!(capture.events().len(), 1);
    }

    #[test]
    fn test_down_outside_any_button_emits_nothing() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.5, 0.1);

        assert!(capture.events().is_empty());
        assert!(buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_motion_off_button_releases() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);
        // Drag within the button: no new events
        translator.pointer_event(&mut buttons, PointerPhase::Motion, 0.12, 0.82);
        assert_eq!(capture.events().len(), 1);

        // Drag off: exactly one key-up
        translator.pointer_event(&mut buttons, PointerPhase::Motion, 0.50, 0.50);
        let events = capture.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].key, KeyCode::ArrowLeft);
        assert!(!events[1].is_pressed());
        assert!(buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_motion_never_presses() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Motion, 0.10, 0.80);

        assert!(capture.events().is_empty());
        assert!(buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_up_is_scoped_to_release_position() {
        let (mut buttons, mut translator, capture) = setup();

        // Two fingers press two different buttons
        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);
        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.85, 0.80);
        assert_eq!(capture.events().len(), 2);

        // Lifting the first finger only releases the button under it
        translator.pointer_event(&mut buttons, PointerPhase::Up, 0.10, 0.80);
        let events = capture.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].key, KeyCode::ArrowLeft);
        assert!(!events[2].is_pressed());
        assert!(buttons.get(crate::overlay::ButtonId(1)).unwrap().pressed);
    }

    #[test]
    fn test_down_up_round_trip() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);
        translator.pointer_event(&mut buttons, PointerPhase::Up, 0.10, 0.80);

        let events = capture.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].is_pressed());
        assert!(!events[1].is_pressed());
        assert_eq!(events[0].key, events[1].key);
        assert!(buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_legacy_up_releases_everything() {
        let (mut buttons, mut translator, capture) = setup();

        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.10, 0.80);
        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.85, 0.80);

        // Mouse released far away from both buttons
        translator.legacy_pointer_event(&mut buttons, ElementState::Released, 10.0, 10.0);

        let events = capture.events();
        assert_eq!(events.len(), 4);
        assert!(!events[2].is_pressed());
        assert!(!events[3].is_pressed());
        assert!(buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_legacy_down_normalizes_pixels() {
        let (mut buttons, mut translator, capture) = setup();

        // (80, 480) in an 800x600 window is (0.10, 0.80) normalized
        translator.legacy_pointer_event(&mut buttons, ElementState::Pressed, 80.0, 480.0);

        let events = capture.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, KeyCode::ArrowLeft);
        assert!(events[0].is_pressed());
    }

    #[test]
    fn test_overlapping_buttons_both_fire() {
        let mut buttons = ButtonSet::new(800, 600);
        buttons
            .register(NormRect::new(0.0, 0.0, 0.5, 0.5), KeyCode::ArrowUp)
            .unwrap();
        buttons
            .register(NormRect::new(0.25, 0.25, 0.5, 0.5), KeyCode::ArrowDown)
            .unwrap();

        let capture = Capture::default();
        let mut translator = Translator::new(Box::new(capture.clone()));
        translator.pointer_event(&mut buttons, PointerPhase::Down, 0.3, 0.3);

        let events = capture.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, KeyCode::ArrowUp);
        assert_eq!(events[1].key, KeyCode::ArrowDown);
    }
}
