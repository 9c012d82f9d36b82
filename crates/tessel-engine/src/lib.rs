//! Tessel engine crate.
//!
//! A small textured-sprite renderer. The rendering core (vertex formats, geometry
//! buffers, shader programs, textures, sprites) talks to the GPU through the
//! [`gpu::GpuApi`] trait; the runtime maps it onto wgpu and a winit window.

pub mod assets;
pub mod coords;
pub mod core;
pub mod device;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod logging;
pub mod motion;
pub mod shader;
pub mod sprite;
pub mod texture;
pub mod time;
pub mod vertex;
pub mod window;

pub use error::{RenderError, Result};
