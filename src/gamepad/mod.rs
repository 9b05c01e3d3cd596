//! # Gamepad Module
//!
//! Controller input for the virtual pointer.
//!
//! This module handles:
//! - Per-frame snapshots in the standard gamepad layout
//! - Primary-controller selection from the platform device list
//! - Stick deadzone filtering
//! - Linux evdev polling

pub mod deadzone;
pub mod evdev;
pub mod sampler;
pub mod snapshot;

pub use deadzone::{apply_deadzone, DeadzoneFilter};
pub use sampler::{select_primary, GamepadSampler, GamepadSource};
pub use snapshot::{ButtonState, GamepadSnapshot};
