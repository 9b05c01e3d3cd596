//! # Gamepad Sampler Module
//!
//! Resolves the single primary controller from the platform's device list.
//!
//! The sampler runs once per animation frame. It never blocks and never
//! retries: an empty list simply yields `None`.
//!
//! ## Selection Policy
//!
//! 1. First connected device reporting the `"standard"` mapping
//! 2. Otherwise the first connected device of any mapping
//! 3. Otherwise none

use super::snapshot::GamepadSnapshot;

/// Platform gamepad query.
///
/// Returns a possibly-empty, ordered list of device snapshots. Slots for
/// devices that have gone away may be reported with `connected == false`.
#[cfg_attr(test, mockall::automock)]
pub trait GamepadSource {
    /// Returns the current state of every known device.
    fn gamepads(&mut self) -> Vec<GamepadSnapshot>;
}

/// Picks the primary device out of a platform device list.
///
/// # Examples
///
/// ```
/// use skyline_input::gamepad::sampler::select_primary;
/// use skyline_input::gamepad::snapshot::GamepadSnapshot;
///
/// let pads = vec![
///     GamepadSnapshot::unmapped(0, "Flight Stick", 3, 8),
///     GamepadSnapshot::standard(1, "Wireless Controller"),
/// ];
/// let primary = select_primary(&pads).unwrap();
/// assert_eq!(primary.id, "Wireless Controller");
///
/// assert!(select_primary(&[]).is_none());
/// ```
#[must_use]
pub fn select_primary(pads: &[GamepadSnapshot]) -> Option<&GamepadSnapshot> {
    primary_position(pads).map(|position| &pads[position])
}

fn primary_position(pads: &[GamepadSnapshot]) -> Option<usize> {
    pads.iter()
        .position(|pad| pad.connected && pad.is_standard())
        .or_else(|| pads.iter().position(|pad| pad.connected))
}

/// Samples the primary controller from a [`GamepadSource`].
#[derive(Debug, Default, Clone, Copy)]
pub struct GamepadSampler;

impl GamepadSampler {
    /// Creates a new sampler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Queries the source and returns the primary device, if any.
    pub fn sample<S: GamepadSource + ?Sized>(&self, source: &mut S) -> Option<GamepadSnapshot> {
        let pads = source.gamepads();
        let position = primary_position(&pads)?;
        pads.into_iter().nth(position)
    }
}
