//! # Synthetic Events
//!
//! Pointer and mouse events built by the virtual pointer. Field values match
//! what native hardware dispatch produces for a primary-button mouse press,
//! so UI listeners cannot tell the difference.

/// `pointerId` carried by every synthetic pointer event.
pub const SYNTHETIC_POINTER_ID: i32 = 1;

/// `pointerType` carried by every synthetic pointer event.
pub const SYNTHETIC_POINTER_TYPE: &str = "mouse";

/// `button` value of the primary (left) mouse button.
pub const PRIMARY_BUTTON: i16 = 0;

/// Bit set in `buttons` while the primary button is held.
pub const PRIMARY_BUTTON_MASK: u16 = 1;

/// The kinds of event the activation sequence emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticEventKind {
    PointerDown,
    MouseDown,
    PointerUp,
    MouseUp,
    Click,
}

impl SyntheticEventKind {
    /// DOM event type name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PointerDown => "pointerdown",
            Self::MouseDown => "mousedown",
            Self::PointerUp => "pointerup",
            Self::MouseUp => "mouseup",
            Self::Click => "click",
        }
    }

    /// True for the `pointer*` family, which carries pointer details.
    #[must_use]
    pub fn is_pointer_event(self) -> bool {
        matches!(self, Self::PointerDown | Self::PointerUp)
    }

    /// True while the button is logically held (the `*down` events).
    #[must_use]
    pub fn is_press(self) -> bool {
        matches!(self, Self::PointerDown | Self::MouseDown)
    }
}

/// Pointer-specific fields of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerDetails {
    pub pointer_id: i32,
    pub pointer_type: &'static str,
    pub is_primary: bool,
}

/// A programmatically constructed pointer or mouse event.
///
/// # Examples
///
/// ```
/// use skyline_input::ui::event::{SyntheticEvent, SyntheticEventKind};
///
/// let down = SyntheticEvent::new(SyntheticEventKind::PointerDown, 120.0, 48.0);
/// assert!(down.bubbles);
/// assert_eq!(down.button, 0);
/// assert_eq!(down.buttons, 1);
/// assert!(down.pointer.unwrap().is_primary);
///
/// let click = SyntheticEvent::new(SyntheticEventKind::Click, 120.0, 48.0);
/// assert_eq!(click.buttons, 0);
/// assert!(click.pointer.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEvent {
    pub kind: SyntheticEventKind,
    pub bubbles: bool,
    pub cancelable: bool,
    pub client_x: f32,
    pub client_y: f32,
    pub button: i16,
    pub buttons: u16,
    pub pointer: Option<PointerDetails>,
}

impl SyntheticEvent {
    /// Builds an event of `kind` at client coordinates `(x, y)`.
    #[must_use]
    pub fn new(kind: SyntheticEventKind, x: f32, y: f32) -> Self {
        let pointer = kind.is_pointer_event().then_some(PointerDetails {
            pointer_id: SYNTHETIC_POINTER_ID,
            pointer_type: SYNTHETIC_POINTER_TYPE,
            is_primary: true,
        });

        Self {
            kind,
            bubbles: true,
            cancelable: true,
            client_x: x,
            client_y: y,
            button: PRIMARY_BUTTON,
            buttons: if kind.is_press() { PRIMARY_BUTTON_MASK } else { 0 },
            pointer,
        }
    }

    /// DOM event type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}
