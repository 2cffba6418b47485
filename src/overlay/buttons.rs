//! Button geometry and press state

use thiserror::Error;
use winit::keyboard::KeyCode;

/// Maximum number of buttons an overlay can hold
pub const MAX_BUTTONS: usize = 16;

/// Errors produced by the overlay
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("button capacity exceeded (max {max})")]
    CapacityExceeded { max: usize },
}

/// Rectangle in normalized window coordinates
///
/// All fields are fractions of the window size in [0, 1], origin at the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormRect {
    /// Create a new normalized rectangle
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a normalized point is inside this rectangle
    ///
    /// Containment is half-open per axis: `[x, x + width)` and
    /// `[y, y + height)`, so adjacent buttons never claim a shared edge twice.
    pub fn contains(&self, nx: f32, ny: f32) -> bool {
        nx >= self.x && nx < self.x + self.width && ny >= self.y && ny < self.y + self.height
    }
}

/// Stable index of a button within its [`ButtonSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonId(pub usize);

/// A single on-screen control
#[derive(Debug, Clone)]
pub struct Button {
    /// Screen area in normalized coordinates, immutable after registration
    pub bounds: NormRect,
    /// Key synthesized while this button is held
    pub key: KeyCode,
    /// Dense index assigned at registration time
    pub id: ButtonId,
    /// True while at least one active pointer is on this button
    pub pressed: bool,
}

/// The fixed, insertion-ordered button collection plus the window dimensions
/// used to convert between pixel and normalized coordinates.
///
/// Press flags are only flipped by the input translator; the renderer reads
/// them. Window size is purely a scaling factor - updating it never touches
/// pointer state.
#[derive(Debug)]
pub struct ButtonSet {
    buttons: Vec<Button>,
    width: u32,
    height: u32,
}

impl ButtonSet {
    /// Creates an empty set for a window of the given pixel size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buttons: Vec::new(),
            width,
            height,
        }
    }

    /// Registers a button, assigning it the next dense id
    ///
    /// Fails with [`OverlayError::CapacityExceeded`] once [`MAX_BUTTONS`]
    /// buttons are registered; the set is left unchanged in that case.
    pub fn register(&mut self, bounds: NormRect, key: KeyCode) -> Result<ButtonId, OverlayError> {
        if self.buttons.len() >= MAX_BUTTONS {
            return Err(OverlayError::CapacityExceeded { max: MAX_BUTTONS });
        }

        let id = ButtonId(self.buttons.len());
        self.buttons.push(Button {
            bounds,
            key,
            id,
            pressed: false,
        });
        Ok(id)
    }

    /// Updates the stored window dimensions
    pub fn set_window_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Converts a pixel position to normalized coordinates
    pub fn normalize(&self, px: f32, py: f32) -> [f32; 2] {
        [px / self.width as f32, py / self.height as f32]
    }

    /// Checks whether a normalized point lies inside the given button
    pub fn hit(&self, id: ButtonId, nx: f32, ny: f32) -> bool {
        self.buttons
            .get(id.0)
            .is_some_and(|b| b.bounds.contains(nx, ny))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    /// Iterates buttons in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Button> {
        self.buttons.iter()
    }

    pub fn get(&self, id: ButtonId) -> Option<&Button> {
        self.buttons.get(id.0)
    }

    /// Mutable iteration for the translator's state transitions
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Button> {
        self.buttons.iter_mut()
    }
}
