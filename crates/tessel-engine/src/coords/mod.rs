//! Screen and world coordinate helpers.
//!
//! World space is y-up; the camera maps it to wgpu clip space.

mod camera;
mod viewport;

pub use camera::Camera2d;
pub use viewport::Viewport;
