//! # Evdev Keyboard Backend
//!
//! Feeds [`KeyInput`] events from Linux keyboards.
//!
//! Each poll reads the held-key bitmap of every open keyboard, merges them,
//! and diffs the result against the previous poll. Only keys in
//! [`KEY_CODES`] are tracked; each is reported with its browser-style
//! `code` so it goes through the same normalization as any other feed.
//!
//! State polling cannot observe auto-repeat, so every key-down produced here
//! is a fresh press. Focus is unknown at this level: events leave
//! `target_is_editable` unset for the caller to fill in.
//!
//! A keyboard that fails a state query is dropped. Any keys it was holding
//! are released on that same poll.

use evdev::{Device, Key};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{normalize_key, KeyEvent, KeyInput, KeyPhase, KeySource, Modifiers};
use crate::device::{scan_devices, OpenedDevice, INPUT_DIR, RESCAN_INTERVAL_POLLS};
use crate::error::{InputError, Result};

/// Tracked evdev keys and their browser-style codes.
pub const KEY_CODES: [(Key, &str); 82] = [
    (Key::KEY_A, "KeyA"),
    (Key::KEY_B, "KeyB"),
    (Key::KEY_C, "KeyC"),
    (Key::KEY_D, "KeyD"),
    (Key::KEY_E, "KeyE"),
    (Key::KEY_F, "KeyF"),
    (Key::KEY_G, "KeyG"),
    (Key::KEY_H, "KeyH"),
    (Key::KEY_I, "KeyI"),
    (Key::KEY_J, "KeyJ"),
    (Key::KEY_K, "KeyK"),
    (Key::KEY_L, "KeyL"),
    (Key::KEY_M, "KeyM"),
    (Key::KEY_N, "KeyN"),
    (Key::KEY_O, "KeyO"),
    (Key::KEY_P, "KeyP"),
    (Key::KEY_Q, "KeyQ"),
    (Key::KEY_R, "KeyR"),
    (Key::KEY_S, "KeyS"),
    (Key::KEY_T, "KeyT"),
    (Key::KEY_U, "KeyU"),
    (Key::KEY_V, "KeyV"),
    (Key::KEY_W, "KeyW"),
    (Key::KEY_X, "KeyX"),
    (Key::KEY_Y, "KeyY"),
    (Key::KEY_Z, "KeyZ"),
    (Key::KEY_UP, "ArrowUp"),
    (Key::KEY_DOWN, "ArrowDown"),
    (Key::KEY_LEFT, "ArrowLeft"),
    (Key::KEY_RIGHT, "ArrowRight"),
    (Key::KEY_0, "Digit0"),
    (Key::KEY_1, "Digit1"),
    (Key::KEY_2, "Digit2"),
    (Key::KEY_3, "Digit3"),
    (Key::KEY_4, "Digit4"),
    (Key::KEY_5, "Digit5"),
    (Key::KEY_6, "Digit6"),
    (Key::KEY_7, "Digit7"),
    (Key::KEY_8, "Digit8"),
    (Key::KEY_9, "Digit9"),
    (Key::KEY_F1, "F1"),
    (Key::KEY_F2, "F2"),
    (Key::KEY_F3, "F3"),
    (Key::KEY_F4, "F4"),
    (Key::KEY_F5, "F5"),
    (Key::KEY_F6, "F6"),
    (Key::KEY_F7, "F7"),
    (Key::KEY_F8, "F8"),
    (Key::KEY_F9, "F9"),
    (Key::KEY_F10, "F10"),
    (Key::KEY_F11, "F11"),
    (Key::KEY_F12, "F12"),
    (Key::KEY_ESC, "Escape"),
    (Key::KEY_ENTER, "Enter"),
    (Key::KEY_BACKSPACE, "Backspace"),
    (Key::KEY_GRAVE, "Backquote"),
    (Key::KEY_MINUS, "Minus"),
    (Key::KEY_EQUAL, "Equal"),
    (Key::KEY_LEFTBRACE, "BracketLeft"),
    (Key::KEY_RIGHTBRACE, "BracketRight"),
    (Key::KEY_BACKSLASH, "Backslash"),
    (Key::KEY_SEMICOLON, "Semicolon"),
    (Key::KEY_APOSTROPHE, "Quote"),
    (Key::KEY_COMMA, "Comma"),
    (Key::KEY_DOT, "Period"),
    (Key::KEY_SLASH, "Slash"),
    (Key::KEY_INSERT, "Insert"),
    (Key::KEY_DELETE, "Delete"),
    (Key::KEY_HOME, "Home"),
    (Key::KEY_END, "End"),
    (Key::KEY_PAGEUP, "PageUp"),
    (Key::KEY_PAGEDOWN, "PageDown"),
    (Key::KEY_SPACE, "Space"),
    (Key::KEY_TAB, "Tab"),
    (Key::KEY_LEFTSHIFT, "ShiftLeft"),
    (Key::KEY_RIGHTSHIFT, "ShiftRight"),
    (Key::KEY_LEFTCTRL, "ControlLeft"),
    (Key::KEY_RIGHTCTRL, "ControlRight"),
    (Key::KEY_LEFTALT, "AltLeft"),
    (Key::KEY_RIGHTALT, "AltRight"),
    (Key::KEY_LEFTMETA, "MetaLeft"),
    (Key::KEY_RIGHTMETA, "MetaRight"),
];

/// Held flags, one per [`KEY_CODES`] entry.
pub type HeldKeys = [bool; KEY_CODES.len()];

/// Samples the held flags for every tracked key.
#[must_use]
pub fn held_keys<F>(is_down: F) -> HeldKeys
where
    F: Fn(Key) -> bool,
{
    let mut held = [false; KEY_CODES.len()];
    for (slot, (key, _)) in held.iter_mut().zip(KEY_CODES) {
        *slot = is_down(key);
    }
    held
}

/// Modifier flags implied by a held-key sample.
#[must_use]
pub fn modifiers_of(held: &HeldKeys) -> Modifiers {
    let down = |key: Key| {
        KEY_CODES
            .iter()
            .zip(held)
            .any(|((tracked, _), is_held)| *tracked == key && *is_held)
    };
    Modifiers {
        shift: down(Key::KEY_LEFTSHIFT) || down(Key::KEY_RIGHTSHIFT),
        ctrl: down(Key::KEY_LEFTCTRL) || down(Key::KEY_RIGHTCTRL),
        alt: down(Key::KEY_LEFTALT) || down(Key::KEY_RIGHTALT),
        meta: down(Key::KEY_LEFTMETA) || down(Key::KEY_RIGHTMETA),
    }
}

/// Key events that turn `previous` into `current`.
///
/// Releases come before presses. Every event carries the modifier state of
/// `current`.
#[must_use]
pub fn key_transitions(previous: &HeldKeys, current: &HeldKeys) -> Vec<KeyInput> {
    let modifiers = modifiers_of(current);
    let event = |phase, code: &str| KeyInput {
        phase,
        event: KeyEvent::new(code).with_modifiers(modifiers),
    };

    let mut events = Vec::new();
    for (i, (_, code)) in KEY_CODES.iter().enumerate() {
        if previous[i] && !current[i] {
            events.push(event(KeyPhase::Up, *code));
        }
    }
    for (i, (_, code)) in KEY_CODES.iter().enumerate() {
        if !previous[i] && current[i] {
            events.push(event(KeyPhase::Down, *code));
        }
    }
    events
}

/// True if some tracked key normalizes to the same token as `raw`.
#[must_use]
pub fn can_emit(raw: &str) -> bool {
    let token = normalize_key(raw);
    KEY_CODES.iter().any(|(_, code)| normalize_key(code) == token)
}

/// Fails if `toggle_key` can never be produced by this backend.
pub fn check_toggle_key(toggle_key: &str) -> Result<()> {
    if can_emit(toggle_key) {
        Ok(())
    } else {
        Err(InputError::Device(format!(
            "toggle key {:?} is not reported by the evdev keyboard backend",
            toggle_key
        )))
    }
}

/// True for devices that look like a full keyboard.
#[must_use]
pub fn is_keyboard(device: &Device) -> bool {
    device.supported_keys().is_some_and(|keys| {
        keys.contains(Key::KEY_W) && keys.contains(Key::KEY_SPACE) && keys.contains(Key::KEY_LEFTSHIFT)
    })
}

/// Polled evdev keyboards.
pub struct EvdevKeyboard {
    dir: PathBuf,
    devices: Vec<OpenedDevice>,
    held: HeldKeys,
    polls_since_scan: u32,
}

impl std::fmt::Debug for EvdevKeyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvdevKeyboard")
            .field("dir", &self.dir)
            .field("devices", &self.devices)
            .finish_non_exhaustive()
    }
}

impl EvdevKeyboard {
    /// Opens every keyboard under `/dev/input`.
    ///
    /// # Errors
    ///
    /// - `Device`: `/dev/input` is missing or unreadable
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use skyline_input::keyboard::evdev::EvdevKeyboard;
    /// use skyline_input::keyboard::KeySource;
    ///
    /// let mut keyboard = EvdevKeyboard::open()?;
    /// for input in keyboard.poll_keys() {
    ///     println!("{:?} {}", input.phase, input.event.code);
    /// }
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        Self::open_in(Path::new(INPUT_DIR))
    }

    /// Opens every keyboard under `dir`.
    pub fn open_in(dir: &Path) -> Result<Self> {
        let mut keyboard = Self {
            dir: dir.to_path_buf(),
            devices: Vec::new(),
            held: [false; KEY_CODES.len()],
            polls_since_scan: 0,
        };
        keyboard.rescan()?;
        Ok(keyboard)
    }

    /// Number of open keyboards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    fn rescan(&mut self) -> Result<()> {
        self.polls_since_scan = 0;
        self.devices = scan_devices(&self.dir, is_keyboard)?;
        for opened in &self.devices {
            info!(
                "Found keyboard '{}' at {}",
                opened.device.name().unwrap_or("unnamed"),
                opened.path
            );
        }
        Ok(())
    }
}

impl KeySource for EvdevKeyboard {
    fn poll_keys(&mut self) -> Vec<KeyInput> {
        if self.devices.is_empty() {
            self.polls_since_scan += 1;
            if self.polls_since_scan >= RESCAN_INTERVAL_POLLS {
                if let Err(e) = self.rescan() {
                    warn!("Keyboard rescan failed: {}", e);
                }
            }
        }

        let mut current = [false; KEY_CODES.len()];
        self.devices.retain(|opened| match opened.device.get_key_state() {
            Ok(state) => {
                let sample = held_keys(|key| state.contains(key));
                for (merged, held) in current.iter_mut().zip(sample) {
                    *merged |= held;
                }
                true
            }
            Err(e) => {
                warn!("Keyboard at {} went away: {}", opened.path, e);
                false
            }
        });

        let events = key_transitions(&self.held, &current);
        self.held = current;
        events
    }
}
