//! # Virtual Pointer Module
//!
//! Emulates a physical mouse pointer from gamepad input.
//!
//! Each frame the pointer samples the primary controller, moves an on-screen
//! cursor with the left stick (or the d-pad as a fallback), keeps it inside
//! the viewport, and turns a fresh press of the primary face button into a
//! synthetic click on whatever interactive element sits under the cursor.
//!
//! ## Per-Frame Step
//!
//! 1. Sample the controller; without one, hide the cursor and stop
//! 2. Deadzone the stick; d-pad fills in any axis the stick leaves at zero
//! 3. Pick the analog or d-pad speed
//! 4. Move and clamp to `[margin, dimension - margin]`
//! 5. On a false→true edge of the primary button, hit-test and dispatch
//!
//! ## Usage
//!
//! ```
//! use skyline_input::gamepad::snapshot::GamepadSnapshot;
//! use skyline_input::gamepad::sampler::GamepadSource;
//! use skyline_input::pointer::{PointerTuning, Viewport, VirtualPointer};
//! use skyline_input::ui::UiTree;
//!
//! struct OnePad(GamepadSnapshot);
//! impl GamepadSource for OnePad {
//!     fn gamepads(&mut self) -> Vec<GamepadSnapshot> {
//!         vec![self.0.clone()]
//!     }
//! }
//!
//! let mut pad = GamepadSnapshot::standard(0, "Pad");
//! pad.axes[0] = 1.0;
//!
//! let mut pointer = VirtualPointer::new(
//!     OnePad(pad),
//!     UiTree::new(),
//!     Viewport::new(800.0, 600.0),
//!     PointerTuning::default(),
//! );
//! pointer.enable();
//! pointer.step();
//!
//! let cursor = pointer.cursor().unwrap();
//! assert_eq!((cursor.x, cursor.y), (418.0, 300.0));
//! ```

pub mod dispatch;

use tracing::{debug, info};

use crate::config::PointerConfig;
use crate::frame::{FrameStep, FrameTime};
use crate::gamepad::deadzone::DeadzoneFilter;
use crate::gamepad::sampler::{GamepadSampler, GamepadSource};
use crate::gamepad::snapshot::{axes, buttons, GamepadSnapshot};
use crate::ui::Document;

pub use dispatch::Activation;

/// Cursor speed in pixels per frame while the stick drives motion.
pub const DEFAULT_ANALOG_SPEED: f32 = 18.0;

/// Cursor speed in pixels per frame while only the d-pad drives motion.
pub const DEFAULT_DPAD_SPEED: f32 = 10.0;

/// Distance the cursor keeps from every viewport edge.
pub const DEFAULT_EDGE_MARGIN: f32 = 6.0;

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Centre point of the viewport.
    #[must_use]
    pub fn center(&self) -> PointerPosition {
        PointerPosition::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Cursor position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

impl PointerPosition {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Movement tuning for the virtual pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTuning {
    pub deadzone: DeadzoneFilter,
    pub analog_speed: f32,
    pub dpad_speed: f32,
    pub margin: f32,
}

impl Default for PointerTuning {
    fn default() -> Self {
        Self {
            deadzone: DeadzoneFilter::default(),
            analog_speed: DEFAULT_ANALOG_SPEED,
            dpad_speed: DEFAULT_DPAD_SPEED,
            margin: DEFAULT_EDGE_MARGIN,
        }
    }
}

impl PointerTuning {
    /// Builds tuning from the `[pointer]` config section.
    #[must_use]
    pub fn from_config(config: &PointerConfig) -> Self {
        Self {
            deadzone: DeadzoneFilter::new(config.deadzone),
            analog_speed: config.analog_speed,
            dpad_speed: config.dpad_speed,
            margin: config.margin,
        }
    }
}

/// What happened during one pointer frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerFrame {
    /// A controller was found this frame.
    pub device_present: bool,
    /// Cursor position after the frame.
    pub position: PointerPosition,
    /// Activation triggered by a fresh button press, if any.
    pub activation: Option<Activation>,
}

/// Clamps one coordinate to `[margin, extent - margin]`.
///
/// Viewports narrower than twice the margin pin the coordinate to `margin`.
#[must_use]
pub fn clamp_axis(value: f32, extent: f32, margin: f32) -> f32 {
    let high = (extent - margin).max(margin);
    value.clamp(margin, high)
}

/// Gamepad-driven pointer that dispatches synthetic clicks into a [`Document`].
///
/// The pointer owns its platform capabilities: a [`GamepadSource`] to poll and
/// the [`Document`] it clicks into.
pub struct VirtualPointer<S, D> {
    source: S,
    document: D,
    sampler: GamepadSampler,
    tuning: PointerTuning,
    viewport: Viewport,
    position: Option<PointerPosition>,
    last_pressed: bool,
    device_present: bool,
    enabled: bool,
}

impl<S: GamepadSource, D: Document> VirtualPointer<S, D> {
    /// Creates a disabled pointer. Call [`enable`](Self::enable) to start it.
    pub fn new(source: S, document: D, viewport: Viewport, tuning: PointerTuning) -> Self {
        Self {
            source,
            document,
            sampler: GamepadSampler::new(),
            tuning,
            viewport,
            position: None,
            last_pressed: false,
            device_present: false,
            enabled: false,
        }
    }

    /// Starts the pointer.
    ///
    /// The first activation places the cursor at the viewport centre; later
    /// activations resume from the last coordinates.
    pub fn enable(&mut self) {
        if self.enabled {
            return;
        }
        let viewport = self.viewport;
        let margin = self.tuning.margin;
        let start = self.position.unwrap_or_else(|| viewport.center());
        self.position = Some(PointerPosition::new(
            clamp_axis(start.x, viewport.width, margin),
            clamp_axis(start.y, viewport.height, margin),
        ));
        self.last_pressed = false;
        self.enabled = true;
        debug!("Virtual pointer enabled");
    }

    /// Stops the pointer, hides the cursor and forgets any held press.
    pub fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.last_pressed = false;
        self.device_present = false;
        debug!("Virtual pointer disabled");
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// True while a controller is detected.
    #[must_use]
    pub fn device_present(&self) -> bool {
        self.device_present
    }

    /// Last known cursor coordinates, whether or not the cursor is visible.
    #[must_use]
    pub fn position(&self) -> PointerPosition {
        self.position.unwrap_or_else(|| self.viewport.center())
    }

    /// The cursor to draw: `Some` only while enabled with a controller present.
    #[must_use]
    pub fn cursor(&self) -> Option<PointerPosition> {
        if self.enabled && self.device_present {
            self.position
        } else {
            None
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Re-clamps the stored position into a resized viewport.
    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(position) = self.position.as_mut() {
            position.x = clamp_axis(position.x, viewport.width, self.tuning.margin);
            position.y = clamp_axis(position.y, viewport.height, self.tuning.margin);
        }
    }

    /// Runs one pointer frame. Does nothing while disabled.
    pub fn step(&mut self) -> PointerFrame {
        if !self.enabled {
            return self.frame_result(None);
        }

        let Some(pad) = self.sampler.sample(&mut self.source) else {
            self.set_device_present(None);
            self.last_pressed = false;
            return self.frame_result(None);
        };
        self.set_device_present(Some(&pad));

        self.apply_movement(&pad);

        let pressed = pad.is_pressed(buttons::PRIMARY);
        let activation = if pressed && !self.last_pressed {
            Some(self.activate_under_cursor())
        } else {
            None
        };
        self.last_pressed = pressed;

        self.frame_result(activation)
    }

    fn apply_movement(&mut self, pad: &GamepadSnapshot) {
        let analog_x = self.tuning.deadzone.apply(pad.axis(axes::LEFT_X));
        let analog_y = self.tuning.deadzone.apply(pad.axis(axes::LEFT_Y));

        let move_x = if analog_x != 0.0 {
            analog_x
        } else {
            dpad_axis(pad, buttons::DPAD_LEFT, buttons::DPAD_RIGHT)
        };
        let move_y = if analog_y != 0.0 {
            analog_y
        } else {
            dpad_axis(pad, buttons::DPAD_UP, buttons::DPAD_DOWN)
        };

        let speed = if analog_x != 0.0 || analog_y != 0.0 {
            self.tuning.analog_speed
        } else {
            self.tuning.dpad_speed
        };

        let current = self.position();
        let margin = self.tuning.margin;
        self.position = Some(PointerPosition::new(
            clamp_axis(current.x + move_x * speed, self.viewport.width, margin),
            clamp_axis(current.y + move_y * speed, self.viewport.height, margin),
        ));
    }

    fn activate_under_cursor(&mut self) -> Activation {
        let position = self.position();
        match hit_test::resolve_target(&self.document, position.x, position.y) {
            Some(target) => dispatch::activate(&mut self.document, target, position),
            None => {
                debug!(
                    "Press at ({:.1}, {:.1}) found no interactive target",
                    position.x, position.y
                );
                Activation::NoTarget
            }
        }
    }

    fn set_device_present(&mut self, pad: Option<&GamepadSnapshot>) {
        let present = pad.is_some();
        if present == self.device_present {
            return;
        }
        self.device_present = present;
        match pad {
            Some(pad) => info!("Gamepad connected: {} (mapping '{}')", pad.id, pad.mapping),
            None => info!("Gamepad disconnected, pointer hidden"),
        }
    }

    fn frame_result(&self, activation: Option<Activation>) -> PointerFrame {
        PointerFrame {
            device_present: self.device_present,
            position: self.position(),
            activation,
        }
    }
}

impl<S: GamepadSource, D: Document> FrameStep for VirtualPointer<S, D> {
    fn on_frame(&mut self, _time: &FrameTime) {
        self.step();
    }
}

/// `+1` for the positive button, `-1` for the negative one, `0` for neither or both.
fn dpad_axis(pad: &GamepadSnapshot, negative: usize, positive: usize) -> f32 {
    let mut value = 0.0;
    if pad.is_pressed(positive) {
        value += 1.0;
    }
    if pad.is_pressed(negative) {
        value -= 1.0;
    }
    value
}
