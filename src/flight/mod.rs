//! # Flight Module
//!
//! Keyboard-driven free-flight camera.
//!
//! This module handles:
//! - The camera transform handed to the renderer
//! - Key intent to smoothed velocity, with boost and slow modifiers
//! - The enable/disable toggle and its lifecycle notifications

pub mod camera;
pub mod session;
pub mod velocity;

pub use camera::CameraRig;
pub use session::{FlightSession, SessionObserver};
pub use velocity::{FlightTuning, FlightVelocityModel};
