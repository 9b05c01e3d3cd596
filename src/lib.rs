//! # Skyline Input Library
//!
//! Real-time input layer for a 3D city viewer.
//!
//! This library provides a gamepad-driven virtual pointer that clicks into a
//! UI document exactly like a physical mouse, and a keyboard-driven
//! free-flight camera with a single toggle key. The rest of the application
//! sees only the current camera transform and the synthetic pointer events.

pub mod config;
pub mod device;
pub mod error;
pub mod flight;
pub mod frame;
pub mod gamepad;
pub mod keyboard;
pub mod layer;
pub mod pointer;
pub mod ui;
