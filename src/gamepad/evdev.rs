//! # Evdev Gamepad Backend
//!
//! Implements the platform gamepad query on Linux by polling evdev devices.
//!
//! Every poll reads the absolute-axis and key state of each open controller
//! (no event queue, so polling never blocks) and lays it out in the standard
//! gamepad mapping.
//!
//! ## Layout Translation
//!
//! | Standard | evdev |
//! |----------|-------|
//! | Axis 0 / 1 | ABS_X / ABS_Y |
//! | Axis 2 / 3 | ABS_RX / ABS_RY |
//! | Buttons 0..=3 | BTN_SOUTH, BTN_EAST, BTN_WEST, BTN_NORTH |
//! | Buttons 4 / 5 | BTN_TL / BTN_TR |
//! | Buttons 6 / 7 | BTN_TL2 / BTN_TR2 or ABS_Z / ABS_RZ (analog) |
//! | Buttons 8 / 9 | BTN_SELECT / BTN_START |
//! | Buttons 10 / 11 | BTN_THUMBL / BTN_THUMBR |
//! | Buttons 12..=15 | BTN_DPAD_* or ABS_HAT0X / ABS_HAT0Y |
//! | Button 16 | BTN_MODE |
//!
//! Devices lacking a south face button or a left stick are still reported,
//! but with an empty mapping tag.

use evdev::{AbsoluteAxisType, AttributeSet, Device, Key};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::sampler::GamepadSource;
use super::snapshot::{
    axes, buttons, ButtonState, GamepadSnapshot, STANDARD_AXIS_COUNT, STANDARD_BUTTON_COUNT,
    STANDARD_MAPPING,
};
use crate::device::{scan_devices, INPUT_DIR, RESCAN_INTERVAL_POLLS};
use crate::error::Result;

/// Analog trigger travel that counts as "pressed".
pub const TRIGGER_PRESS_THRESHOLD: f32 = 0.5;

/// Axes read from every controller.
const TRACKED_AXES: [AbsoluteAxisType; 8] = [
    AbsoluteAxisType::ABS_X,
    AbsoluteAxisType::ABS_Y,
    AbsoluteAxisType::ABS_RX,
    AbsoluteAxisType::ABS_RY,
    AbsoluteAxisType::ABS_Z,
    AbsoluteAxisType::ABS_RZ,
    AbsoluteAxisType::ABS_HAT0X,
    AbsoluteAxisType::ABS_HAT0Y,
];

/// Digital buttons and their standard-layout slots.
const BUTTON_MAP: [(usize, Key); 15] = [
    (buttons::PRIMARY, Key::BTN_SOUTH),
    (buttons::SECONDARY, Key::BTN_EAST),
    (buttons::TERTIARY, Key::BTN_WEST),
    (buttons::QUATERNARY, Key::BTN_NORTH),
    (buttons::LEFT_BUMPER, Key::BTN_TL),
    (buttons::RIGHT_BUMPER, Key::BTN_TR),
    (buttons::SELECT, Key::BTN_SELECT),
    (buttons::START, Key::BTN_START),
    (buttons::LEFT_STICK, Key::BTN_THUMBL),
    (buttons::RIGHT_STICK, Key::BTN_THUMBR),
    (buttons::DPAD_UP, Key::BTN_DPAD_UP),
    (buttons::DPAD_DOWN, Key::BTN_DPAD_DOWN),
    (buttons::DPAD_LEFT, Key::BTN_DPAD_LEFT),
    (buttons::DPAD_RIGHT, Key::BTN_DPAD_RIGHT),
    (buttons::HOME, Key::BTN_MODE),
];

/// One absolute-axis reading with its reported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisReading {
    pub value: i32,
    pub minimum: i32,
    pub maximum: i32,
}

impl AxisReading {
    #[must_use]
    pub fn new(value: i32, minimum: i32, maximum: i32) -> Self {
        Self {
            value,
            minimum,
            maximum,
        }
    }

    /// Position within the range mapped to `0.0..=1.0`.
    #[must_use]
    pub fn unit(&self) -> f32 {
        if self.maximum <= self.minimum {
            return 0.0;
        }
        let span = (self.maximum - self.minimum) as f32;
        ((self.value - self.minimum) as f32 / span).clamp(0.0, 1.0)
    }

    /// Position within the range mapped to `-1.0..=1.0`.
    #[must_use]
    pub fn centered(&self) -> f32 {
        if self.maximum <= self.minimum {
            return 0.0;
        }
        self.unit() * 2.0 - 1.0
    }
}

/// Raw controller state for one poll.
#[derive(Clone)]
pub struct RawPadState {
    pub keys: AttributeSet<Key>,
    pub axes: Vec<(AbsoluteAxisType, AxisReading)>,
}

impl Default for RawPadState {
    fn default() -> Self {
        Self {
            keys: AttributeSet::new(),
            axes: Vec::new(),
        }
    }
}

impl std::fmt::Debug for RawPadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawPadState")
            .field("keys", &self.keys.iter().collect::<Vec<_>>())
            .field("axes", &self.axes)
            .finish()
    }
}

impl RawPadState {
    /// Reading for `axis`, if the device has it.
    #[must_use]
    pub fn axis(&self, axis: AbsoluteAxisType) -> Option<AxisReading> {
        self.axes
            .iter()
            .find(|(tracked, _)| *tracked == axis)
            .map(|(_, reading)| *reading)
    }

    /// Translates the raw state into a standard-layout snapshot.
    #[must_use]
    pub fn to_snapshot(&self, index: usize, id: &str, mapping: &str) -> GamepadSnapshot {
        let mut pad = GamepadSnapshot {
            id: id.to_string(),
            index,
            connected: true,
            mapping: mapping.to_string(),
            axes: vec![0.0; STANDARD_AXIS_COUNT],
            buttons: vec![ButtonState::RELEASED; STANDARD_BUTTON_COUNT],
        };

        for (slot, axis) in [
            (axes::LEFT_X, AbsoluteAxisType::ABS_X),
            (axes::LEFT_Y, AbsoluteAxisType::ABS_Y),
            (axes::RIGHT_X, AbsoluteAxisType::ABS_RX),
            (axes::RIGHT_Y, AbsoluteAxisType::ABS_RY),
        ] {
            if let Some(reading) = self.axis(axis) {
                pad.axes[slot] = reading.centered();
            }
        }

        for (slot, key) in BUTTON_MAP {
            if self.keys.contains(key) {
                pad.buttons[slot] = ButtonState::PRESSED;
            }
        }

        pad.buttons[buttons::LEFT_TRIGGER] = self.trigger(Key::BTN_TL2, AbsoluteAxisType::ABS_Z);
        pad.buttons[buttons::RIGHT_TRIGGER] = self.trigger(Key::BTN_TR2, AbsoluteAxisType::ABS_RZ);

        if let Some(hat) = self.axis(AbsoluteAxisType::ABS_HAT0X) {
            if hat.value < 0 {
                pad.set_pressed(buttons::DPAD_LEFT, true);
            } else if hat.value > 0 {
                pad.set_pressed(buttons::DPAD_RIGHT, true);
            }
        }
        if let Some(hat) = self.axis(AbsoluteAxisType::ABS_HAT0Y) {
            if hat.value < 0 {
                pad.set_pressed(buttons::DPAD_UP, true);
            } else if hat.value > 0 {
                pad.set_pressed(buttons::DPAD_DOWN, true);
            }
        }

        pad
    }

    fn trigger(&self, key: Key, axis: AbsoluteAxisType) -> ButtonState {
        let digital = self.keys.contains(key);
        let value = self
            .axis(axis)
            .map_or(if digital { 1.0 } else { 0.0 }, |reading| reading.unit());
        ButtonState {
            pressed: digital || value > TRIGGER_PRESS_THRESHOLD,
            value,
        }
    }
}

/// True for joystick-class devices (gamepads, flight sticks, wheels).
#[must_use]
pub fn is_game_controller(device: &Device) -> bool {
    let has_buttons = device
        .supported_keys()
        .is_some_and(|keys| keys.contains(Key::BTN_SOUTH) || keys.contains(Key::BTN_TRIGGER));
    let has_stick = device
        .supported_absolute_axes()
        .is_some_and(|abs| abs.contains(AbsoluteAxisType::ABS_X));
    has_buttons && has_stick
}

/// Mapping tag for a controller: standard when it has a face pad and a left stick.
#[must_use]
pub fn mapping_for(device: &Device) -> &'static str {
    let face = device
        .supported_keys()
        .is_some_and(|keys| keys.contains(Key::BTN_SOUTH));
    let stick = device.supported_absolute_axes().is_some_and(|abs| {
        abs.contains(AbsoluteAxisType::ABS_X) && abs.contains(AbsoluteAxisType::ABS_Y)
    });
    if face && stick {
        STANDARD_MAPPING
    } else {
        ""
    }
}

struct PadSlot {
    index: usize,
    id: String,
    path: String,
    mapping: &'static str,
    axes: Vec<AbsoluteAxisType>,
    device: Device,
}

impl PadSlot {
    fn read(&self) -> io::Result<RawPadState> {
        let keys = self.device.get_key_state()?;
        let abs = self.device.get_abs_state()?;
        let axes = self
            .axes
            .iter()
            .map(|&axis| {
                let info = abs[axis.0 as usize];
                (axis, AxisReading::new(info.value, info.minimum, info.maximum))
            })
            .collect();
        Ok(RawPadState { keys, axes })
    }
}

/// Polled evdev controllers.
///
/// Controllers that fail a state query are treated as unplugged and dropped.
/// While none are open, `/dev/input` is rescanned every
/// [`RESCAN_INTERVAL_POLLS`] polls.
pub struct EvdevGamepads {
    dir: PathBuf,
    pads: Vec<PadSlot>,
    polls_since_scan: u32,
}

impl std::fmt::Debug for EvdevGamepads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevGamepads")
            .field("dir", &self.dir)
            .field("pads", &self.pads.iter().map(|p| p.path.as_str()).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl EvdevGamepads {
    /// Opens every controller under `/dev/input`.
    ///
    /// Finding none is not an error.
    ///
    /// # Errors
    ///
    /// - `Device`: `/dev/input` is missing or unreadable
    pub fn open() -> Result<Self> {
        Self::open_in(Path::new(INPUT_DIR))
    }

    /// Opens every controller under `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let mut gamepads = Self {
            dir: dir.to_path_buf(),
            pads: Vec::new(),
            polls_since_scan: 0,
        };
        gamepads.rescan()?;
        Ok(gamepads)
    }

    /// Number of open controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pads.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    fn rescan(&mut self) -> Result<()> {
        self.polls_since_scan = 0;
        let found = scan_devices(&self.dir, is_game_controller)?;

        self.pads = found
            .into_iter()
            .enumerate()
            .map(|(index, opened)| {
                let id = opened.device.name().unwrap_or("Unknown controller").to_string();
                let mapping = mapping_for(&opened.device);
                let axes = TRACKED_AXES
                    .into_iter()
                    .filter(|axis| {
                        opened
                            .device
                            .supported_absolute_axes()
                            .is_some_and(|abs| abs.contains(*axis))
                    })
                    .collect();
                info!("Found controller '{}' at {} (mapping '{}')", id, opened.path, mapping);
                PadSlot {
                    index,
                    id,
                    path: opened.path,
                    mapping,
                    axes,
                    device: opened.device,
                }
            })
            .collect();
        Ok(())
    }
}

impl GamepadSource for EvdevGamepads {
    fn gamepads(&mut self) -> Vec<GamepadSnapshot> {
        if self.pads.is_empty() {
            self.polls_since_scan += 1;
            if self.polls_since_scan >= RESCAN_INTERVAL_POLLS {
                if let Err(e) = self.rescan() {
                    warn!("Controller rescan failed: {}", e);
                }
            }
        }

        let mut snapshots = Vec::with_capacity(self.pads.len());
        self.pads.retain(|slot| match slot.read() {
            Ok(raw) => {
                snapshots.push(raw.to_snapshot(slot.index, &slot.id, slot.mapping));
                true
            }
            Err(e) => {
                warn!("Controller '{}' at {} went away: {}", slot.id, slot.path, e);
                false
            }
        });
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stick_reading(value: i32) -> AxisReading {
        AxisReading::new(value, 0, 255)
    }

    fn state(keys: &[Key], axes: &[(AbsoluteAxisType, AxisReading)]) -> RawPadState {
        let mut set = AttributeSet::<Key>::new();
        for key in keys {
            set.insert(*key);
        }
        RawPadState {
            keys: set,
            axes: axes.to_vec(),
        }
    }

    #[test]
    fn test_axis_reading_centered() {
        assert_eq!(stick_reading(0).centered(), -1.0);
        assert_eq!(stick_reading(255).centered(), 1.0);
        assert!(stick_reading(128).centered().abs() < 0.01);
        assert!(AxisReading::new(0, -32768, 32767).centered().abs() < 0.001);
    }

    #[test]
    fn test_axis_reading_degenerate_range() {
        assert_eq!(AxisReading::new(5, 10, 10).centered(), 0.0);
        assert_eq!(AxisReading::new(5, 10, 0).unit(), 0.0);
    }

    #[test]
    fn test_axis_reading_out_of_range_is_clamped() {
        assert_eq!(stick_reading(300).unit(), 1.0);
        assert_eq!(stick_reading(-20).unit(), 0.0);
    }

    #[test]
    fn test_snapshot_at_rest() {
        let raw = state(
            &[],
            &[
                (AbsoluteAxisType::ABS_X, stick_reading(128)),
                (AbsoluteAxisType::ABS_Y, stick_reading(128)),
            ],
        );
        let pad = raw.to_snapshot(0, "Wireless Controller", STANDARD_MAPPING);
        assert!(pad.is_standard());
        assert!(pad.axes.iter().all(|a| a.abs() < 0.01));
        assert!(pad.buttons.iter().all(|b| !b.pressed));
    }

    #[test]
    fn test_face_buttons_map_to_standard_slots() {
        let raw = state(&[Key::BTN_SOUTH, Key::BTN_NORTH, Key::BTN_MODE], &[]);
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        assert!(pad.is_pressed(buttons::PRIMARY));
        assert!(pad.is_pressed(buttons::QUATERNARY));
        assert!(pad.is_pressed(buttons::HOME));
        assert!(!pad.is_pressed(buttons::SECONDARY));
    }

    #[test]
    fn test_sticks_map_to_standard_axes() {
        let raw = state(
            &[],
            &[
                (AbsoluteAxisType::ABS_X, stick_reading(255)),
                (AbsoluteAxisType::ABS_Y, stick_reading(0)),
                (AbsoluteAxisType::ABS_RX, stick_reading(0)),
                (AbsoluteAxisType::ABS_RY, stick_reading(255)),
            ],
        );
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        assert_eq!(pad.axis(axes::LEFT_X), 1.0);
        assert_eq!(pad.axis(axes::LEFT_Y), -1.0);
        assert_eq!(pad.axis(axes::RIGHT_X), -1.0);
        assert_eq!(pad.axis(axes::RIGHT_Y), 1.0);
    }

    #[test]
    fn test_hat_maps_to_dpad_buttons() {
        let hat = |v| AxisReading::new(v, -1, 1);
        let raw = state(
            &[],
            &[
                (AbsoluteAxisType::ABS_HAT0X, hat(1)),
                (AbsoluteAxisType::ABS_HAT0Y, hat(-1)),
            ],
        );
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        assert!(pad.is_pressed(buttons::DPAD_RIGHT));
        assert!(pad.is_pressed(buttons::DPAD_UP));
        assert!(!pad.is_pressed(buttons::DPAD_LEFT));
        assert!(!pad.is_pressed(buttons::DPAD_DOWN));
    }

    #[test]
    fn test_dpad_keys_map_to_dpad_buttons() {
        let raw = state(&[Key::BTN_DPAD_LEFT, Key::BTN_DPAD_DOWN], &[]);
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        assert!(pad.is_pressed(buttons::DPAD_LEFT));
        assert!(pad.is_pressed(buttons::DPAD_DOWN));
    }

    #[test]
    fn test_analog_trigger() {
        let raw = state(
            &[],
            &[
                (AbsoluteAxisType::ABS_Z, stick_reading(51)),
                (AbsoluteAxisType::ABS_RZ, stick_reading(255)),
            ],
        );
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        let left = pad.buttons[buttons::LEFT_TRIGGER];
        let right = pad.buttons[buttons::RIGHT_TRIGGER];
        assert!(!left.pressed);
        assert!((left.value - 0.2).abs() < 0.001);
        assert!(right.pressed);
        assert_eq!(right.value, 1.0);
    }

    #[test]
    fn test_digital_trigger_without_axis() {
        let raw = state(&[Key::BTN_TL2], &[]);
        let pad = raw.to_snapshot(0, "Pad", STANDARD_MAPPING);
        assert_eq!(pad.buttons[buttons::LEFT_TRIGGER], ButtonState::PRESSED);
    }

    #[test]
    fn test_snapshot_carries_identity() {
        let pad = RawPadState::default().to_snapshot(3, "Flight Stick", "");
        assert_eq!(pad.index, 3);
        assert_eq!(pad.id, "Flight Stick");
        assert!(!pad.is_standard());
        assert!(pad.connected);
    }

    #[test]
    fn test_open_in_empty_dir_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut gamepads = EvdevGamepads::open_in(dir.path()).unwrap();
        assert!(gamepads.is_empty());
        assert!(gamepads.gamepads().is_empty());
    }

    #[test]
    fn test_rescan_keeps_polling_without_devices() {
        let dir = tempfile::tempdir().unwrap();
        let mut gamepads = EvdevGamepads::open_in(dir.path()).unwrap();
        for _ in 0..(RESCAN_INTERVAL_POLLS * 2 + 1) {
            assert!(gamepads.gamepads().is_empty());
        }
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_poll_real_controller() {
        let mut gamepads = EvdevGamepads::open().expect("/dev/input not readable");
        let pads = gamepads.gamepads();
        assert!(!pads.is_empty(), "Connect a controller to run this test");
        println!("Primary controller: {:?}", pads[0]);
    }
}
