//! Adapters for the domain ports: a scripted wallet, a logging backend,
//! canned detection models and a still-frame camera.

pub mod fixture_model;
pub mod logging;
pub mod simulated;
pub mod still_camera;
