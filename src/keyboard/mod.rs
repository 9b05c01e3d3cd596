//! # Keyboard Input Module
//!
//! Live set of held flight keys, fed by raw key-down / key-up events.
//!
//! ## Normalization
//!
//! Raw identifiers (browser-style `code` values like `KeyW` or `ShiftLeft`,
//! or `key` values like `" "`) are reduced to lower-case tokens. Left and
//! right variants of shift, control and alt collapse into one token each, and
//! the space bar becomes `space`:
//!
//! | Raw | Token |
//! |-----|-------|
//! | `KeyW`, `w`, `W` | `w` |
//! | `ShiftLeft`, `ShiftRight`, `Shift` | `shift` |
//! | `ControlLeft`, `ControlRight`, `Control` | `control` |
//! | `AltLeft`, `AltRight`, `Alt` | `alt` |
//! | `Space`, `" "` | `space` |
//! | `ArrowUp` | `arrowup` |
//!
//! Only tokens in [`FlightKey`] are ever stored.

pub mod evdev;

use std::collections::HashSet;

/// Canonical lower-case token for a raw key identifier.
///
/// # Examples
///
/// ```
/// use skyline_input::keyboard::normalize_key;
///
/// assert_eq!(normalize_key("KeyW"), "w");
/// assert_eq!(normalize_key("ShiftRight"), "shift");
/// assert_eq!(normalize_key(" "), "space");
/// assert_eq!(normalize_key("ArrowLeft"), "arrowleft");
/// assert_eq!(normalize_key("Digit3"), "3");
/// ```
#[must_use]
pub fn normalize_key(raw: &str) -> String {
    match raw {
        "ShiftLeft" | "ShiftRight" | "Shift" => return "shift".to_string(),
        "ControlLeft" | "ControlRight" | "Control" => return "control".to_string(),
        "AltLeft" | "AltRight" | "Alt" => return "alt".to_string(),
        "Space" | " " | "Spacebar" => return "space".to_string(),
        _ => {}
    }

    for prefix in ["Key", "Digit"] {
        if let Some(rest) = raw.strip_prefix(prefix) {
            let mut chars = rest.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if c.is_ascii_alphanumeric() {
                    return c.to_ascii_lowercase().to_string();
                }
            }
        }
    }

    raw.to_lowercase()
}

/// Keys the flight controller consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightKey {
    W,
    A,
    S,
    D,
    E,
    Q,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Control,
    Shift,
    Alt,
}

impl FlightKey {
    /// Every consumed key.
    pub const ALL: [FlightKey; 14] = [
        Self::W,
        Self::A,
        Self::S,
        Self::D,
        Self::E,
        Self::Q,
        Self::ArrowUp,
        Self::ArrowDown,
        Self::ArrowLeft,
        Self::ArrowRight,
        Self::Space,
        Self::Control,
        Self::Shift,
        Self::Alt,
    ];

    /// Looks up a normalized token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.token() == token)
    }

    /// Normalizes a raw identifier and looks it up.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        Self::from_token(&normalize_key(raw))
    }

    /// The normalized token for this key.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
            Self::E => "e",
            Self::Q => "q",
            Self::ArrowUp => "arrowup",
            Self::ArrowDown => "arrowdown",
            Self::ArrowLeft => "arrowleft",
            Self::ArrowRight => "arrowright",
            Self::Space => "space",
            Self::Control => "control",
            Self::Shift => "shift",
            Self::Alt => "alt",
        }
    }
}

/// Modifier state carried by a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    #[must_use]
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// A raw key-down or key-up event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Raw identifier (`KeyW`, `ShiftLeft`, ...).
    pub code: String,
    /// True for auto-repeat key-downs.
    pub repeat: bool,
    pub modifiers: Modifiers,
    /// Focus is inside a text-input-like element.
    pub target_is_editable: bool,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            repeat: false,
            modifiers: Modifiers::default(),
            target_is_editable: false,
        }
    }

    /// Marks the event as an auto-repeat.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Marks the event as typed into a text field.
    #[must_use]
    pub fn in_editable(mut self) -> Self {
        self.target_is_editable = true;
        self
    }

    /// Normalized token of [`code`](Self::code).
    #[must_use]
    pub fn token(&self) -> String {
        normalize_key(&self.code)
    }
}

/// Direction of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPhase {
    Down,
    Up,
}

/// A timestamp-free keyboard event as produced by a [`KeySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    pub phase: KeyPhase,
    pub event: KeyEvent,
}

/// Platform keyboard feed.
pub trait KeySource {
    /// Returns key events observed since the previous poll, in order.
    fn poll_keys(&mut self) -> Vec<KeyInput>;
}

/// How a key event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyDisposition {
    /// The held set changed.
    pub transition: bool,
    /// The platform's default action should be suppressed.
    pub prevent_default: bool,
}

/// Held state of every [`FlightKey`].
///
/// # Examples
///
/// ```
/// use skyline_input::keyboard::{FlightKey, KeyEvent, KeyboardInputState};
///
/// let mut keys = KeyboardInputState::new();
///
/// let down = keys.key_down(&KeyEvent::new("KeyW"));
/// assert!(down.transition && down.prevent_default);
/// assert!(keys.is_held(FlightKey::W));
///
/// // Auto-repeat is not a new transition.
/// assert!(!keys.key_down(&KeyEvent::new("KeyW").repeated()).transition);
///
/// keys.key_up(&KeyEvent::new("KeyW"));
/// assert!(!keys.is_held(FlightKey::W));
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyboardInputState {
    held: HashSet<FlightKey>,
}

impl KeyboardInputState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a key-down.
    ///
    /// Keys typed into text fields are neither recorded nor suppressed.
    pub fn key_down(&mut self, event: &KeyEvent) -> KeyDisposition {
        let Some(key) = FlightKey::from_raw(&event.code) else {
            return KeyDisposition::default();
        };
        if event.target_is_editable {
            return KeyDisposition::default();
        }

        let transition = !event.repeat && self.held.insert(key);
        KeyDisposition {
            transition,
            prevent_default: true,
        }
    }

    /// Handles a key-up. Clears the key regardless of modifier state.
    pub fn key_up(&mut self, event: &KeyEvent) -> KeyDisposition {
        let Some(key) = FlightKey::from_raw(&event.code) else {
            return KeyDisposition::default();
        };
        KeyDisposition {
            transition: self.held.remove(&key),
            prevent_default: !event.target_is_editable,
        }
    }

    #[must_use]
    pub fn is_held(&self, key: FlightKey) -> bool {
        self.held.contains(&key)
    }

    /// True if any of `keys` is held.
    #[must_use]
    pub fn any_held(&self, keys: &[FlightKey]) -> bool {
        keys.iter().any(|key| self.is_held(*key))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    /// Number of held keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.held.len()
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        self.held.clear();
    }
}
