use std::path::Path;
use std::rc::Rc;

use glam::{Mat4, Vec2};

use crate::error::Result;
use crate::geometry::GeometryBuffer;
use crate::gpu::{BufferUsage, GpuContext, Topology};
use crate::shader::ShaderProgram;
use crate::texture::Texture;
use crate::vertex::VertexFormat;

/// Name of the matrix uniform a sprite shader reads.
pub const MVP_UNIFORM: &str = "mvp";

/// Unit square in local space, `x y u v` per corner. Texture rows start at the top,
/// so v runs opposite to y.
const UNIT_QUAD: [f32; 16] = [
    0.0, 0.0, 0.0, 1.0, //
    1.0, 0.0, 1.0, 1.0, //
    1.0, 1.0, 1.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
];

/// A textured quad placed in the world by position and size.
///
/// Shader and texture are shared; the quad geometry belongs to the sprite.
#[derive(Debug)]
pub struct Sprite {
    position: Vec2,
    size: Vec2,
    model: Mat4,
    shader: Rc<ShaderProgram>,
    texture: Rc<Texture>,
    quad: GeometryBuffer,
}

impl Sprite {
    pub fn new(
        gpu: &GpuContext,
        position: Vec2,
        size: Vec2,
        shader: Rc<ShaderProgram>,
        texture: Rc<Texture>,
    ) -> Result<Self> {
        let mut quad = GeometryBuffer::new(gpu, VertexFormat::XyUv, 4);
        quad.set_topology(Topology::Quads);
        quad.set_usage(BufferUsage::Static);
        quad.push_vertices(&UNIT_QUAD)?;
        quad.index_from_sequential_vertices();
        quad.upload()?;

        Ok(Self {
            position,
            size,
            model: model_matrix(position, size),
            shader,
            texture,
            quad,
        })
    }

    /// Builds a sprite with its own shader (`<name>.vert.wgsl`/`<name>.frag.wgsl`
    /// in `shader_dir`) and texture.
    pub fn load(
        gpu: &GpuContext,
        position: Vec2,
        size: Vec2,
        shader_dir: impl AsRef<Path>,
        shader_name: &str,
        texture_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let shader = Rc::new(ShaderProgram::load(gpu, shader_dir, shader_name)?);
        let texture = Rc::new(Texture::load(gpu, texture_path)?);
        Self::new(gpu, position, size, shader, texture)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        if position == self.position {
            return;
        }
        self.position = position;
        self.model = model_matrix(self.position, self.size);
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, size: Vec2) {
        if size == self.size {
            return;
        }
        self.size = size;
        self.model = model_matrix(self.position, self.size);
    }

    /// Cached local-to-world transform.
    #[inline]
    pub fn model(&self) -> Mat4 {
        self.model
    }

    pub fn shader(&self) -> &Rc<ShaderProgram> {
        &self.shader
    }

    pub fn texture(&self) -> &Rc<Texture> {
        &self.texture
    }

    pub fn geometry(&self) -> &GeometryBuffer {
        &self.quad
    }

    /// Draws the sprite with `mvp = view_projection * model`.
    ///
    /// The program and texture are unbound afterwards, also when the draw fails.
    pub fn render(&self, view_projection: &Mat4) -> Result<()> {
        self.shader.bind();
        if let Some(location) = self.shader.uniform_location(MVP_UNIFORM) {
            self.shader
                .set_uniform_mat4(location, &(*view_projection * self.model));
        }
        self.texture.bind();

        let result = self.quad.bind_and_draw(&self.shader);

        self.texture.unbind();
        self.shader.unbind();
        result
    }
}

/// Scale to `size`, then move to `position`.
fn model_matrix(position: Vec2, size: Vec2) -> Mat4 {
    Mat4::from_translation(position.extend(0.0)) * Mat4::from_scale(size.extend(1.0))
}
