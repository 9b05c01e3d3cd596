//! # Flight Velocity Model
//!
//! Turns held keys and the camera orientation into a target velocity, eases
//! the current velocity toward it, and displaces the camera.
//!
//! ## Key Bindings
//!
//! | Axis | +1 | -1 |
//! |------|----|----|
//! | Depth | W / ArrowUp | S / ArrowDown |
//! | Lateral | D / ArrowRight | A / ArrowLeft |
//! | Vertical | E / Space | Q / Control |
//!
//! Shift multiplies speed by the boost factor and Alt by the slow factor;
//! holding both applies both.
//!
//! ## Smoothing
//!
//! Each enabled frame moves velocity a fraction `1 - e^(-r·dt)` of the way to
//! the target, so holding a key from rest reaches `T·(1 - e^(-r·t))` after
//! `t` seconds regardless of frame rate. While disabled, velocity decays
//! linearly per frame by `decay_rate·dt` and snaps to zero below
//! [`STOP_THRESHOLD`].

use glam::Vec3;

use super::camera::{CameraRig, DEGENERATE_EPSILON};
use crate::config::FlightConfig;
use crate::keyboard::{FlightKey, KeyboardInputState};

/// Default cruise speed, world units per second.
pub const DEFAULT_BASE_SPEED: f32 = 14.0;
/// Default shift multiplier.
pub const DEFAULT_BOOST_MULTIPLIER: f32 = 3.0;
/// Default alt multiplier.
pub const DEFAULT_SLOW_MULTIPLIER: f32 = 0.3;
/// Default smoothing rate, per second.
pub const DEFAULT_RESPONSIVENESS: f32 = 10.0;
/// Default decay rate while disabled, per second.
pub const DEFAULT_DECAY_RATE: f32 = 6.0;
/// Speeds below this are treated as stopped.
pub const STOP_THRESHOLD: f32 = 1e-3;

/// Speed and smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTuning {
    pub base_speed: f32,
    pub boost_multiplier: f32,
    pub slow_multiplier: f32,
    pub responsiveness: f32,
    pub decay_rate: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            base_speed: DEFAULT_BASE_SPEED,
            boost_multiplier: DEFAULT_BOOST_MULTIPLIER,
            slow_multiplier: DEFAULT_SLOW_MULTIPLIER,
            responsiveness: DEFAULT_RESPONSIVENESS,
            decay_rate: DEFAULT_DECAY_RATE,
        }
    }
}

impl FlightTuning {
    #[must_use]
    pub fn from_config(config: &FlightConfig) -> Self {
        Self {
            base_speed: config.base_speed,
            boost_multiplier: config.boost_multiplier,
            slow_multiplier: config.slow_multiplier,
            responsiveness: config.responsiveness,
            decay_rate: config.decay_rate,
        }
    }

    /// Speed for the current modifier keys.
    #[must_use]
    pub fn speed(&self, keys: &KeyboardInputState) -> f32 {
        let mut speed = self.base_speed;
        if keys.is_held(FlightKey::Shift) {
            speed *= self.boost_multiplier;
        }
        if keys.is_held(FlightKey::Alt) {
            speed *= self.slow_multiplier;
        }
        speed
    }
}

/// Normalized movement intent in camera terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlightIntent {
    pub depth: f32,
    pub lateral: f32,
    pub vertical: f32,
}

impl FlightIntent {
    /// Reads the held keys. Opposing keys cancel.
    #[must_use]
    pub fn from_keys(keys: &KeyboardInputState) -> Self {
        let axis = |plus: [FlightKey; 2], minus: [FlightKey; 2]| {
            let mut value = 0.0;
            if keys.any_held(&plus) {
                value += 1.0;
            }
            if keys.any_held(&minus) {
                value -= 1.0;
            }
            value
        };

        let raw = Vec3::new(
            axis(
                [FlightKey::D, FlightKey::ArrowRight],
                [FlightKey::A, FlightKey::ArrowLeft],
            ),
            axis([FlightKey::E, FlightKey::Space], [FlightKey::Q, FlightKey::Control]),
            axis(
                [FlightKey::W, FlightKey::ArrowUp],
                [FlightKey::S, FlightKey::ArrowDown],
            ),
        )
        .normalize_or_zero();

        Self {
            lateral: raw.x,
            vertical: raw.y,
            depth: raw.z,
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.depth == 0.0 && self.lateral == 0.0 && self.vertical == 0.0
    }
}

/// Forward and right vectors for movement.
///
/// Right is `forward × up`; looking straight up or down falls back to world X.
#[must_use]
pub fn movement_basis(camera: &CameraRig) -> (Vec3, Vec3) {
    let forward = camera.forward();
    let right = forward.cross(Vec3::Y);
    let right = if right.length_squared() < DEGENERATE_EPSILON {
        Vec3::X
    } else {
        right.normalize()
    };
    (forward, right)
}

/// Smoothed free-flight velocity.
///
/// # Examples
///
/// ```
/// use glam::Vec3;
/// use skyline_input::flight::camera::CameraRig;
/// use skyline_input::flight::velocity::{FlightTuning, FlightVelocityModel};
/// use skyline_input::keyboard::{KeyEvent, KeyboardInputState};
///
/// let mut camera = CameraRig::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
/// let mut keys = KeyboardInputState::new();
/// keys.key_down(&KeyEvent::new("KeyW"));
///
/// let mut model = FlightVelocityModel::new(FlightTuning::default());
/// model.step(&keys, &mut camera, 0.016);
///
/// assert!(camera.position.z < 10.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FlightVelocityModel {
    tuning: FlightTuning,
    velocity: Vec3,
    target: Vec3,
}

impl FlightVelocityModel {
    #[must_use]
    pub fn new(tuning: FlightTuning) -> Self {
        Self {
            tuning,
            velocity: Vec3::ZERO,
            target: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn tuning(&self) -> &FlightTuning {
        &self.tuning
    }

    /// Current velocity, world units per second.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Target velocity of the latest enabled frame.
    #[must_use]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.velocity != Vec3::ZERO
    }

    /// Velocity the held keys ask for.
    #[must_use]
    pub fn target_velocity(&self, keys: &KeyboardInputState, camera: &CameraRig) -> Vec3 {
        let intent = FlightIntent::from_keys(keys);
        if intent.is_idle() {
            return Vec3::ZERO;
        }

        let (forward, right) = movement_basis(camera);
        let direction =
            forward * intent.depth + right * intent.lateral + Vec3::Y * intent.vertical;
        direction.normalize_or_zero() * self.tuning.speed(keys)
    }

    /// Enabled frame: ease toward the key target and move the camera.
    pub fn step(&mut self, keys: &KeyboardInputState, camera: &mut CameraRig, dt: f32) {
        self.target = self.target_velocity(keys, camera);

        let alpha = 1.0 - (-self.tuning.responsiveness * dt).exp();
        self.velocity += (self.target - self.velocity) * alpha;

        if self.target == Vec3::ZERO && self.velocity.length() < STOP_THRESHOLD {
            self.velocity = Vec3::ZERO;
            return;
        }
        camera.translate(self.velocity * dt);
    }

    /// Disabled frame: bleed off remaining velocity.
    pub fn decay(&mut self, camera: &mut CameraRig, dt: f32) {
        self.target = Vec3::ZERO;
        if self.velocity == Vec3::ZERO {
            return;
        }

        self.velocity *= (1.0 - self.tuning.decay_rate * dt).max(0.0);
        if self.velocity.length() < STOP_THRESHOLD {
            self.velocity = Vec3::ZERO;
            return;
        }
        camera.translate(self.velocity * dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::KeyEvent;

    fn keys_down(codes: &[&str]) -> KeyboardInputState {
        let mut keys = KeyboardInputState::new();
        for code in codes {
            keys.key_down(&KeyEvent::new(*code));
        }
        keys
    }

    fn facing_neg_z() -> CameraRig {
        CameraRig::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_intent_opposing_keys_cancel() {
        let intent = FlightIntent::from_keys(&keys_down(&["KeyW", "KeyS"]));
        assert!(intent.is_idle());
    }

    #[test]
    fn test_intent_is_normalized() {
        let intent = FlightIntent::from_keys(&keys_down(&["KeyW", "KeyD"]));
        let len = (intent.depth.powi(2) + intent.lateral.powi(2)).sqrt();
        assert!((len - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_arrows_match_letters() {
        let letters = FlightIntent::from_keys(&keys_down(&["KeyW", "KeyA"]));
        let arrows = FlightIntent::from_keys(&keys_down(&["ArrowUp", "ArrowLeft"]));
        assert_eq!(letters, arrows);
    }

    #[test]
    fn test_target_follows_camera() {
        let model = FlightVelocityModel::new(FlightTuning::default());
        let camera = facing_neg_z();

        let forward = model.target_velocity(&keys_down(&["KeyW"]), &camera);
        assert!(approx(forward, Vec3::new(0.0, 0.0, -DEFAULT_BASE_SPEED)));

        // forward × up for a -Z camera is +X
        let right = model.target_velocity(&keys_down(&["KeyD"]), &camera);
        assert!(approx(right, Vec3::new(DEFAULT_BASE_SPEED, 0.0, 0.0)));

        let up = model.target_velocity(&keys_down(&["Space"]), &camera);
        assert!(approx(up, Vec3::new(0.0, DEFAULT_BASE_SPEED, 0.0)));

        let down = model.target_velocity(&keys_down(&["ControlLeft"]), &camera);
        assert!(approx(down, Vec3::new(0.0, -DEFAULT_BASE_SPEED, 0.0)));
    }

    #[test]
    fn test_combined_target_is_renormalized() {
        let model = FlightVelocityModel::new(FlightTuning::default());
        let target = model.target_velocity(&keys_down(&["KeyW", "KeyD", "KeyE"]), &facing_neg_z());
        assert!((target.length() - DEFAULT_BASE_SPEED).abs() < 1e-3);
    }

    #[test]
    fn test_boost_and_slow_compound() {
        let model = FlightVelocityModel::new(FlightTuning::default());
        let camera = facing_neg_z();

        let boosted = model.target_velocity(&keys_down(&["KeyW", "ShiftLeft"]), &camera);
        assert!((boosted.length() - 42.0).abs() < 1e-3);

        let slowed = model.target_velocity(&keys_down(&["KeyW", "AltRight"]), &camera);
        assert!((slowed.length() - 4.2).abs() < 1e-3);

        let both = model.target_velocity(&keys_down(&["KeyW", "ShiftRight", "AltLeft"]), &camera);
        assert!((both.length() - 14.0 * 3.0 * 0.3).abs() < 1e-3);
    }

    #[test]
    fn test_modifiers_alone_do_not_move() {
        let model = FlightVelocityModel::new(FlightTuning::default());
        let target = model.target_velocity(&keys_down(&["ShiftLeft", "AltLeft"]), &facing_neg_z());
        assert_eq!(target, Vec3::ZERO);
    }

    #[test]
    fn test_degenerate_basis_uses_world_x() {
        let camera = CameraRig::looking_at(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO);
        let (forward, right) = movement_basis(&camera);
        assert!(approx(forward, Vec3::NEG_Y));
        assert_eq!(right, Vec3::X);

        let model = FlightVelocityModel::new(FlightTuning::default());
        let strafe = model.target_velocity(&keys_down(&["KeyD"]), &camera);
        assert!(approx(strafe, Vec3::new(DEFAULT_BASE_SPEED, 0.0, 0.0)));
    }

    #[test]
    fn test_exponential_convergence() {
        let tuning = FlightTuning::default();
        let mut model = FlightVelocityModel::new(tuning);
        let mut camera = facing_neg_z();
        let keys = keys_down(&["KeyW"]);

        let dt = 0.01;
        let steps = 50;
        for _ in 0..steps {
            model.step(&keys, &mut camera, dt);
        }

        let t = dt * steps as f32;
        let expected = DEFAULT_BASE_SPEED * (1.0 - (-tuning.responsiveness * t).exp());
        assert!((model.velocity().length() - expected).abs() < 1e-2);
        assert!(model.velocity().z < 0.0);
    }

    #[test]
    fn test_convergence_is_frame_rate_independent() {
        let keys = keys_down(&["KeyW"]);

        let mut fast = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        for _ in 0..60 {
            fast.step(&keys, &mut camera, 1.0 / 120.0);
        }

        let mut slow = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        for _ in 0..15 {
            slow.step(&keys, &mut camera, 1.0 / 30.0);
        }

        assert!((fast.velocity().length() - slow.velocity().length()).abs() < 1e-2);
    }

    #[test]
    fn test_step_moves_camera_and_target() {
        let mut model = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        model.step(&keys_down(&["KeyW"]), &mut camera, 0.1);

        assert!(camera.position.z < 10.0);
        let target = camera.target.unwrap();
        assert!((target.z - (camera.position.z - 10.0)).abs() < 1e-4);
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut model = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        model.step(&keys_down(&["KeyW"]), &mut camera, 0.0);
        assert_eq!(model.velocity(), Vec3::ZERO);
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_decay_slows_then_snaps_to_zero() {
        let mut model = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        let keys = keys_down(&["KeyW"]);
        for _ in 0..30 {
            model.step(&keys, &mut camera, 0.016);
        }
        let cruising = model.velocity().length();

        model.decay(&mut camera, 0.016);
        let decayed = model.velocity().length();
        assert!((decayed - cruising * (1.0 - 6.0 * 0.016)).abs() < 1e-3);
        assert_eq!(model.target(), Vec3::ZERO);

        for _ in 0..1000 {
            model.decay(&mut camera, 0.016);
        }
        assert_eq!(model.velocity(), Vec3::ZERO);
        assert!(!model.is_moving());

        let parked = camera.position;
        model.decay(&mut camera, 0.016);
        assert_eq!(camera.position, parked);
    }

    #[test]
    fn test_large_decay_step_stops_immediately() {
        let mut model = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        model.step(&keys_down(&["KeyW"]), &mut camera, 0.1);
        let before = camera.position;

        // decay_rate * dt > 1 clamps the factor to zero
        model.decay(&mut camera, 0.5);
        assert_eq!(model.velocity(), Vec3::ZERO);
        assert_eq!(camera.position, before);
    }

    #[test]
    fn test_releasing_keys_eases_to_rest() {
        let mut model = FlightVelocityModel::new(FlightTuning::default());
        let mut camera = facing_neg_z();
        model.step(&keys_down(&["KeyD"]), &mut camera, 0.1);

        let idle = KeyboardInputState::new();
        for _ in 0..200 {
            model.step(&idle, &mut camera, 0.05);
        }
        assert_eq!(model.velocity(), Vec3::ZERO);
    }
}
