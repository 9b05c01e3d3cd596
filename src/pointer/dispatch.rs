//! # Synthetic Activation
//!
//! Emits the fixed event sequence a physical primary-button click produces:
//!
//! `focus (no scroll) → pointerdown → mousedown → pointerup → mouseup → click`
//!
//! The sequence is all-or-nothing. A disabled form control receives none of
//! it.

use tracing::debug;

use super::PointerPosition;
use crate::ui::{Document, ElementId, FocusOptions, SyntheticEvent, SyntheticEventKind};

/// Events emitted after focus, in order.
pub const ACTIVATION_SEQUENCE: [SyntheticEventKind; 5] = [
    SyntheticEventKind::PointerDown,
    SyntheticEventKind::MouseDown,
    SyntheticEventKind::PointerUp,
    SyntheticEventKind::MouseUp,
    SyntheticEventKind::Click,
];

/// Result of an activation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Full sequence dispatched to the target.
    Dispatched(ElementId),
    /// Target is a disabled control; nothing was dispatched.
    Disabled(ElementId),
    /// Nothing activatable under the pointer.
    NoTarget,
}

/// Focuses `target` and dispatches the activation sequence at `position`.
pub fn activate<D: Document + ?Sized>(
    document: &mut D,
    target: ElementId,
    position: PointerPosition,
) -> Activation {
    if document.is_interactive_disabled(target) {
        debug!("Skipping activation of disabled control #{}", target.0);
        return Activation::Disabled(target);
    }

    document.focus(
        target,
        FocusOptions {
            prevent_scroll: true,
        },
    );
    for kind in ACTIVATION_SEQUENCE {
        document.dispatch(target, &SyntheticEvent::new(kind, position.x, position.y));
    }

    Activation::Dispatched(target)
}
