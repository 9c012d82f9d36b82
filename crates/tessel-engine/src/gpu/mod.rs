//! GPU resource API.
//!
//! The rendering core talks to the GPU only through [`GpuApi`]: explicit handles,
//! explicit bind/unbind, one indexed draw at a time. Two backends implement it:
//!
//! - [`HeadlessGpu`] records calls and keeps resource contents in memory (tests,
//!   windowless runs)
//! - [`WgpuGpu`] maps the calls onto wgpu and encodes recorded draws at present time
//!
//! All GPU work happens on one thread. [`GpuContext`] is a cheap, `!Send` shared
//! handle to the active backend.

mod context;
mod headless;
pub mod reflect;
mod types;
mod wgpu_backend;

pub use context::GpuContext;
pub use headless::{DrawRecord, GpuCall, HeadlessGpu};
pub use types::{
    AttribPointer, BufferHandle, BufferTarget, BufferUsage, PixelBuffer, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, Topology, UniformLocation,
};
pub use wgpu_backend::{FramePlan, WgpuGpu};

use glam::Mat4;

use crate::error::Result;

/// Low-level GPU resource operations.
///
/// Handles are opaque; a handle is valid from the call that returned it until the
/// matching `delete_*` call. Bind state is explicit: callers bind what they need
/// right before use and unbind afterwards.
pub trait GpuApi {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle>;
    fn delete_shader(&mut self, shader: ShaderHandle);

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle)
    -> Result<ProgramHandle>;
    fn delete_program(&mut self, program: ProgramHandle);

    /// Slot of the named vertex input, or `None` when the program does not use it.
    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32>;
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    fn use_program(&mut self, program: Option<ProgramHandle>);
    /// Sets a matrix uniform on the program currently in use.
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4);

    fn create_buffer(&mut self) -> Result<BufferHandle>;
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);
    /// Replaces the contents of the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()>;
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Creates a single-level RGBA8 texture sampled with nearest filtering.
    fn create_texture(&mut self, pixels: &PixelBuffer) -> Result<TextureHandle>;
    fn bind_texture(&mut self, texture: Option<TextureHandle>);
    fn delete_texture(&mut self, texture: TextureHandle);

    /// Sources attribute `slot` from the bound array buffer.
    fn enable_attribute(&mut self, slot: u32, pointer: AttribPointer);
    fn disable_attribute(&mut self, slot: u32);

    /// Draws `count` `u32` indices from the bound element buffer.
    fn draw_elements(&mut self, topology: Topology, count: u32) -> Result<()>;
}
