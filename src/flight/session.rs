//! # Flight Session
//!
//! Enabled/disabled state for free flight, switched by a single toggle key.
//!
//! The toggle is edge-triggered: only a fresh press flips it. Auto-repeat,
//! presses while the toggle key is already held, presses with any modifier
//! held and presses typed into a text field are all ignored. Every transition
//! notifies each registered [`SessionObserver`] exactly once.
//!
//! While disabled the session records no flight keys, and the velocity model
//! runs its decay path so the camera glides to a stop.

use tracing::info;

use super::camera::CameraRig;
use super::velocity::{FlightTuning, FlightVelocityModel};
use crate::config::FlightConfig;
use crate::frame::{FrameStep, FrameTime};
use crate::keyboard::{normalize_key, KeyDisposition, KeyEvent, KeyboardInputState};

/// Default toggle key.
pub const DEFAULT_TOGGLE_KEY: &str = "KeyF";

/// Lifecycle notifications for flight mode.
#[cfg_attr(test, mockall::automock)]
pub trait SessionObserver {
    fn on_enabled(&mut self);
    fn on_disabled(&mut self);
}

/// Free-flight controller: toggle state, held keys, velocity and camera.
///
/// # Examples
///
/// ```
/// use skyline_input::flight::camera::CameraRig;
/// use skyline_input::flight::session::FlightSession;
/// use skyline_input::flight::velocity::FlightTuning;
/// use skyline_input::keyboard::KeyEvent;
///
/// let mut session = FlightSession::new(FlightTuning::default(), "KeyF", CameraRig::default());
/// assert!(!session.is_enabled());
///
/// session.key_down(&KeyEvent::new("KeyF"));
/// session.key_up(&KeyEvent::new("KeyF"));
/// assert!(session.is_enabled());
///
/// let start = session.camera().position;
/// session.key_down(&KeyEvent::new("KeyW"));
/// session.frame(0.016);
/// assert_ne!(session.camera().position, start);
/// ```
pub struct FlightSession {
    enabled: bool,
    toggle: String,
    toggle_held: bool,
    keys: KeyboardInputState,
    model: FlightVelocityModel,
    camera: CameraRig,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl std::fmt::Debug for FlightSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightSession")
            .field("enabled", &self.enabled)
            .field("toggle", &self.toggle)
            .field("keys", &self.keys)
            .field("model", &self.model)
            .field("camera", &self.camera)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl FlightSession {
    /// Creates a disabled session. `toggle_key` is a raw key code (`KeyF`) or token (`f`).
    #[must_use]
    pub fn new(tuning: FlightTuning, toggle_key: &str, camera: CameraRig) -> Self {
        Self {
            enabled: false,
            toggle: normalize_key(toggle_key),
            toggle_held: false,
            keys: KeyboardInputState::new(),
            model: FlightVelocityModel::new(tuning),
            camera,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_config(config: &FlightConfig, camera: CameraRig) -> Self {
        Self::new(FlightTuning::from_config(config), &config.toggle_key, camera)
    }

    /// Registers an observer for enable/disable transitions.
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether the renderer should draw the flight overlay.
    #[must_use]
    pub fn overlay_visible(&self) -> bool {
        self.enabled
    }

    /// Normalized toggle token.
    #[must_use]
    pub fn toggle_token(&self) -> &str {
        &self.toggle
    }

    #[must_use]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    #[must_use]
    pub fn keys(&self) -> &KeyboardInputState {
        &self.keys
    }

    #[must_use]
    pub fn model(&self) -> &FlightVelocityModel {
        &self.model
    }

    /// Updates the projection aspect ratio after a resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    /// Handles a key-down.
    pub fn key_down(&mut self, event: &KeyEvent) -> KeyDisposition {
        if event.token() == self.toggle {
            return self.toggle_down(event);
        }
        if !self.enabled {
            return KeyDisposition::default();
        }
        self.keys.key_down(event)
    }

    /// Handles a key-up.
    pub fn key_up(&mut self, event: &KeyEvent) -> KeyDisposition {
        if event.token() == self.toggle {
            self.toggle_held = false;
            return KeyDisposition::default();
        }
        self.keys.key_up(event)
    }

    fn toggle_down(&mut self, event: &KeyEvent) -> KeyDisposition {
        if event.repeat || event.modifiers.any() || event.target_is_editable || self.toggle_held {
            return KeyDisposition::default();
        }
        self.toggle_held = true;
        self.set_enabled(!self.enabled);
        KeyDisposition {
            transition: true,
            prevent_default: true,
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            info!("Flight mode enabled");
            for observer in &mut self.observers {
                observer.on_enabled();
            }
        } else {
            self.keys.clear();
            info!(
                "Flight mode disabled (coasting at {:.2} u/s)",
                self.model.velocity().length()
            );
            for observer in &mut self.observers {
                observer.on_disabled();
            }
        }
    }

    /// Releases every held key and the toggle latch without changing state.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.toggle_held = false;
    }

    /// Advances one frame of `dt` seconds.
    pub fn frame(&mut self, dt: f32) {
        if self.enabled {
            self.model.step(&self.keys, &mut self.camera, dt);
        } else {
            self.model.decay(&mut self.camera, dt);
        }
    }
}

impl FrameStep for FlightSession {
    fn on_frame(&mut self, time: &FrameTime) {
        self.frame(time.delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::{FlightKey, Modifiers};
    use glam::Vec3;

    fn session() -> FlightSession {
        FlightSession::new(
            FlightTuning::default(),
            DEFAULT_TOGGLE_KEY,
            CameraRig::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO),
        )
    }

    fn tap(session: &mut FlightSession, code: &str) -> KeyDisposition {
        let down = session.key_down(&KeyEvent::new(code));
        session.key_up(&KeyEvent::new(code));
        down
    }

    #[test]
    fn test_starts_disabled() {
        let session = session();
        assert!(!session.is_enabled());
        assert!(!session.overlay_visible());
        assert_eq!(session.toggle_token(), "f");
    }

    #[test]
    fn test_toggle_press_flips_state() {
        let mut session = session();
        let result = tap(&mut session, "KeyF");
        assert!(result.transition && result.prevent_default);
        assert!(session.is_enabled());
        assert!(session.overlay_visible());

        tap(&mut session, "KeyF");
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_repeat_does_not_toggle() {
        let mut session = session();
        session.key_down(&KeyEvent::new("KeyF"));
        session.key_down(&KeyEvent::new("KeyF").repeated());
        assert!(session.is_enabled());

        // Held without repeat flag is still the same press.
        session.key_down(&KeyEvent::new("KeyF"));
        assert!(session.is_enabled());
    }

    #[test]
    fn test_modified_toggle_is_ignored() {
        let mut session = session();
        for modifiers in [
            Modifiers { ctrl: true, ..Modifiers::default() },
            Modifiers { alt: true, ..Modifiers::default() },
            Modifiers { meta: true, ..Modifiers::default() },
            Modifiers { shift: true, ..Modifiers::default() },
        ] {
            let result = session.key_down(&KeyEvent::new("KeyF").with_modifiers(modifiers));
            assert_eq!(result, KeyDisposition::default());
            session.key_up(&KeyEvent::new("KeyF"));
        }
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_toggle_in_text_field_is_ignored() {
        let mut session = session();
        session.key_down(&KeyEvent::new("KeyF").in_editable());
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_observers_notified_once_per_transition() {
        let mut observer = MockSessionObserver::new();
        observer.expect_on_enabled().times(2).return_const(());
        observer.expect_on_disabled().times(1).return_const(());

        let mut session = session();
        session.add_observer(Box::new(observer));

        tap(&mut session, "KeyF");
        session.key_down(&KeyEvent::new("KeyF").repeated());
        tap(&mut session, "KeyF");
        tap(&mut session, "KeyF");
        assert!(session.is_enabled());
    }

    #[test]
    fn test_every_observer_is_notified() {
        let mut first = MockSessionObserver::new();
        first.expect_on_enabled().times(1).return_const(());
        let mut second = MockSessionObserver::new();
        second.expect_on_enabled().times(1).return_const(());

        let mut session = session();
        session.add_observer(Box::new(first));
        session.add_observer(Box::new(second));
        tap(&mut session, "KeyF");
    }

    #[test]
    fn test_keys_ignored_while_disabled() {
        let mut session = session();
        let result = session.key_down(&KeyEvent::new("KeyW"));
        assert_eq!(result, KeyDisposition::default());
        assert!(session.keys().is_empty());
    }

    #[test]
    fn test_disabling_clears_keys() {
        let mut session = session();
        tap(&mut session, "KeyF");
        session.key_down(&KeyEvent::new("KeyW"));
        session.key_down(&KeyEvent::new("ShiftLeft"));
        assert!(session.keys().is_held(FlightKey::W));

        tap(&mut session, "KeyF");
        assert!(session.keys().is_empty());
    }

    #[test]
    fn test_disable_mid_motion_coasts_to_stop() {
        let mut session = session();
        tap(&mut session, "KeyF");
        session.key_down(&KeyEvent::new("KeyW"));
        for _ in 0..20 {
            session.frame(0.016);
        }
        tap(&mut session, "KeyF");

        let at_disable = session.camera().position;
        session.frame(0.016);
        assert!(session.camera().position.z < at_disable.z);

        for _ in 0..500 {
            session.frame(0.016);
        }
        assert!(!session.model().is_moving());
    }

    #[test]
    fn test_frame_while_disabled_and_idle_is_noop() {
        let mut session = session();
        let start = *session.camera();
        session.frame(0.016);
        assert_eq!(*session.camera(), start);
    }

    #[test]
    fn test_on_frame_uses_delta() {
        let mut session = session();
        tap(&mut session, "KeyF");
        session.key_down(&KeyEvent::new("KeyE"));
        session.on_frame(&FrameTime {
            now: std::time::Duration::from_millis(16),
            delta: 0.016,
            frame: 1,
        });
        assert!(session.camera().position.y > 0.0);
    }

    #[test]
    fn test_custom_toggle_key() {
        let mut session = FlightSession::new(FlightTuning::default(), "KeyG", CameraRig::default());
        tap(&mut session, "KeyF");
        assert!(!session.is_enabled());
        tap(&mut session, "KeyG");
        assert!(session.is_enabled());
    }

    #[test]
    fn test_release_all() {
        let mut session = session();
        tap(&mut session, "KeyF");
        session.key_down(&KeyEvent::new("KeyA"));
        session.key_down(&KeyEvent::new("KeyF"));
        session.release_all();
        assert!(session.keys().is_empty());
        assert!(session.is_enabled());

        // The latch is cleared, so the next press toggles.
        session.key_down(&KeyEvent::new("KeyF"));
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_set_aspect_rejects_invalid() {
        let mut session = session();
        session.set_aspect(2.0);
        assert_eq!(session.camera().aspect, 2.0);
        session.set_aspect(0.0);
        session.set_aspect(f32::NAN);
        assert_eq!(session.camera().aspect, 2.0);
    }
}
