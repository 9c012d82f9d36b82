//! Shader programs.
//!
//! Sources are WGSL. A program resolves the fixed vertex semantics
//! (`vertex_position`, `vertex_normal`, `vertex_texcoord`, `vertex_color`) to
//! attribute slots at link time; semantics the shader does not declare stay unset.

mod program;
mod source;

pub use program::{AttributeSlots, ShaderProgram};
pub use source::ShaderSource;
