//! # Gamepad Snapshot Module
//!
//! Per-frame, read-only view of one connected controller, laid out like the
//! W3C "standard" gamepad mapping.
//!
//! ## Standard Layout
//!
//! | Index | Button | Index | Axis |
//! |-------|--------|-------|------|
//! | 0 | South face (primary action) | 0 | Left stick X (-1 left, +1 right) |
//! | 1 | East face | 1 | Left stick Y (-1 up, +1 down) |
//! | 2 | West face | 2 | Right stick X |
//! | 3 | North face | 3 | Right stick Y |
//! | 4 / 5 | L1 / R1 | | |
//! | 6 / 7 | L2 / R2 | | |
//! | 8 / 9 | Select / Start | | |
//! | 10 / 11 | L3 / R3 | | |
//! | 12..=15 | D-Pad up, down, left, right | | |
//! | 16 | Home | | |

/// Mapping tag reported by devices that follow the standard layout.
pub const STANDARD_MAPPING: &str = "standard";

/// Number of buttons in the standard layout.
pub const STANDARD_BUTTON_COUNT: usize = 17;

/// Number of axes in the standard layout.
pub const STANDARD_AXIS_COUNT: usize = 4;

/// Button indices in the standard layout.
pub mod buttons {
    /// South face button, used as the primary action ("click").
    pub const PRIMARY: usize = 0;
    /// East face button.
    pub const SECONDARY: usize = 1;
    /// West face button.
    pub const TERTIARY: usize = 2;
    /// North face button.
    pub const QUATERNARY: usize = 3;
    /// Left shoulder.
    pub const LEFT_BUMPER: usize = 4;
    /// Right shoulder.
    pub const RIGHT_BUMPER: usize = 5;
    /// Left trigger.
    pub const LEFT_TRIGGER: usize = 6;
    /// Right trigger.
    pub const RIGHT_TRIGGER: usize = 7;
    /// Select / back / share.
    pub const SELECT: usize = 8;
    /// Start / options.
    pub const START: usize = 9;
    /// Left stick click.
    pub const LEFT_STICK: usize = 10;
    /// Right stick click.
    pub const RIGHT_STICK: usize = 11;
    /// D-Pad up.
    pub const DPAD_UP: usize = 12;
    /// D-Pad down.
    pub const DPAD_DOWN: usize = 13;
    /// D-Pad left.
    pub const DPAD_LEFT: usize = 14;
    /// D-Pad right.
    pub const DPAD_RIGHT: usize = 15;
    /// Home / guide.
    pub const HOME: usize = 16;
}

/// Axis indices in the standard layout.
pub mod axes {
    /// Left stick horizontal.
    pub const LEFT_X: usize = 0;
    /// Left stick vertical.
    pub const LEFT_Y: usize = 1;
    /// Right stick horizontal.
    pub const RIGHT_X: usize = 2;
    /// Right stick vertical.
    pub const RIGHT_Y: usize = 3;
}

/// State of a single gamepad button.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ButtonState {
    /// Digital pressed state.
    pub pressed: bool,
    /// Analog value, `0.0` released to `1.0` fully pressed.
    pub value: f32,
}

impl ButtonState {
    /// A released button.
    pub const RELEASED: Self = Self {
        pressed: false,
        value: 0.0,
    };

    /// A fully pressed button.
    pub const PRESSED: Self = Self {
        pressed: true,
        value: 1.0,
    };

    /// Builds a digital button state.
    #[must_use]
    pub fn digital(pressed: bool) -> Self {
        if pressed {
            Self::PRESSED
        } else {
            Self::RELEASED
        }
    }
}

/// Snapshot of a controller as reported by the platform for one frame.
///
/// # Examples
///
/// ```
/// use skyline_input::gamepad::snapshot::{buttons, GamepadSnapshot};
///
/// let mut pad = GamepadSnapshot::standard(0, "Test Pad");
/// pad.axes[0] = 0.5;
/// pad.set_pressed(buttons::PRIMARY, true);
///
/// assert!(pad.is_standard());
/// assert_eq!(pad.axis(0), 0.5);
/// assert!(pad.is_pressed(buttons::PRIMARY));
/// assert!(!pad.is_pressed(99)); // out of range reads as released
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadSnapshot {
    /// Human-readable device name.
    pub id: String,
    /// Slot index in the platform's device list.
    pub index: usize,
    /// Whether the device is currently connected.
    pub connected: bool,
    /// Mapping tag; [`STANDARD_MAPPING`] for the standard layout.
    pub mapping: String,
    /// Analog axes in `[-1.0, 1.0]`.
    pub axes: Vec<f32>,
    /// Buttons in layout order.
    pub buttons: Vec<ButtonState>,
}

impl GamepadSnapshot {
    /// Creates a connected, at-rest snapshot with the standard layout.
    #[must_use]
    pub fn standard(index: usize, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index,
            connected: true,
            mapping: STANDARD_MAPPING.to_string(),
            axes: vec![0.0; STANDARD_AXIS_COUNT],
            buttons: vec![ButtonState::RELEASED; STANDARD_BUTTON_COUNT],
        }
    }

    /// Creates a connected, at-rest snapshot with an unrecognised layout.
    #[must_use]
    pub fn unmapped(index: usize, id: impl Into<String>, axes: usize, buttons: usize) -> Self {
        Self {
            id: id.into(),
            index,
            connected: true,
            mapping: String::new(),
            axes: vec![0.0; axes],
            buttons: vec![ButtonState::RELEASED; buttons],
        }
    }

    /// Returns true when the device reports the standard mapping.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        self.mapping == STANDARD_MAPPING
    }

    /// Reads an axis, treating missing axes as centred.
    #[must_use]
    pub fn axis(&self, index: usize) -> f32 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    /// Reads a button's pressed state, treating missing buttons as released.
    #[must_use]
    pub fn is_pressed(&self, index: usize) -> bool {
        self.buttons.get(index).is_some_and(|b| b.pressed)
    }

    /// Sets a button as fully pressed or released. Out-of-range indices are ignored.
    pub fn set_pressed(&mut self, index: usize, pressed: bool) {
        if let Some(button) = self.buttons.get_mut(index) {
            *button = ButtonState::digital(pressed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_snapshot_layout() {
        let pad = GamepadSnapshot::standard(2, "Pad");
        assert_eq!(pad.index, 2);
        assert!(pad.connected);
        assert!(pad.is_standard());
        assert_eq!(pad.axes.len(), STANDARD_AXIS_COUNT);
        assert_eq!(pad.buttons.len(), STANDARD_BUTTON_COUNT);
        assert!(pad.buttons.iter().all(|b| !b.pressed && b.value == 0.0));
    }

    #[test]
    fn test_unmapped_snapshot() {
        let pad = GamepadSnapshot::unmapped(0, "Joystick", 2, 4);
        assert!(!pad.is_standard());
        assert_eq!(pad.axes.len(), 2);
        assert!(!pad.is_pressed(buttons::DPAD_RIGHT));
    }

    #[test]
    fn test_missing_axis_reads_zero() {
        let pad = GamepadSnapshot::unmapped(0, "Joystick", 1, 1);
        assert_eq!(pad.axis(axes::LEFT_Y), 0.0);
    }

    #[test]
    fn test_set_pressed_updates_value() {
        let mut pad = GamepadSnapshot::standard(0, "Pad");
        pad.set_pressed(buttons::DPAD_LEFT, true);
        assert_eq!(pad.buttons[buttons::DPAD_LEFT], ButtonState::PRESSED);
        pad.set_pressed(buttons::DPAD_LEFT, false);
        assert_eq!(pad.buttons[buttons::DPAD_LEFT], ButtonState::RELEASED);
    }

    #[test]
    fn test_set_pressed_out_of_range_is_ignored() {
        let mut pad = GamepadSnapshot::unmapped(0, "Joystick", 2, 2);
        pad.set_pressed(10, true);
        assert_eq!(pad.buttons.len(), 2);
    }
}
