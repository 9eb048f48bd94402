//! User-facing edges: image acquisition and text rendering of the app.

pub mod image_source;
pub mod render;
