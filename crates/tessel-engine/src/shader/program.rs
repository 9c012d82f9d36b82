use std::path::Path;

use glam::Mat4;

use super::ShaderSource;
use crate::error::Result;
use crate::gpu::{GpuContext, ProgramHandle, ShaderHandle, ShaderStage, UniformLocation};
use crate::vertex::Semantic;

/// Attribute slot per fixed semantic. `None` means the program does not read it.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AttributeSlots {
    pub position: Option<u32>,
    pub normal: Option<u32>,
    pub texcoord: Option<u32>,
    pub color: Option<u32>,
}

impl AttributeSlots {
    fn resolve(mut lookup: impl FnMut(&str) -> Option<u32>) -> Self {
        Self {
            position: lookup(Semantic::Position.attribute_name()),
            normal: lookup(Semantic::Normal.attribute_name()),
            texcoord: lookup(Semantic::TexCoord.attribute_name()),
            color: lookup(Semantic::Color.attribute_name()),
        }
    }

    #[inline]
    pub fn get(&self, semantic: Semantic) -> Option<u32> {
        match semantic {
            Semantic::Position => self.position,
            Semantic::Normal => self.normal,
            Semantic::TexCoord => self.texcoord,
            Semantic::Color => self.color,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Handles {
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    program: ProgramHandle,
}

/// A linked vertex + fragment program.
///
/// Compiled and linked once; never recompiled. Handles are released by
/// [`release`](Self::release) or on drop, exactly once.
#[derive(Debug)]
pub struct ShaderProgram {
    gpu: GpuContext,
    label: String,
    handles: Option<Handles>,
    slots: AttributeSlots,
}

impl ShaderProgram {
    /// Compiles both stages, links them and resolves attribute slots.
    ///
    /// Fails on the first compile or link error. Nothing created before the
    /// failure is left behind.
    pub fn new(gpu: &GpuContext, source: &ShaderSource) -> Result<Self> {
        let (handles, slots) = gpu.with(|api| -> Result<(Handles, AttributeSlots)> {
            let vertex = api.compile_shader(ShaderStage::Vertex, &source.vertex)?;
            let fragment = match api.compile_shader(ShaderStage::Fragment, &source.fragment) {
                Ok(fragment) => fragment,
                Err(err) => {
                    api.delete_shader(vertex);
                    return Err(err);
                }
            };
            let program = match api.link_program(vertex, fragment) {
                Ok(program) => program,
                Err(err) => {
                    api.delete_shader(vertex);
                    api.delete_shader(fragment);
                    return Err(err);
                }
            };

            let slots = AttributeSlots::resolve(|name| api.attribute_location(program, name));
            Ok((Handles { vertex, fragment, program }, slots))
        })?;

        log::debug!("shader program `{}` ready: {slots:?}", source.label);
        Ok(Self {
            gpu: gpu.clone(),
            label: source.label.clone(),
            handles: Some(handles),
            slots,
        })
    }

    /// Loads `<name>.vert.wgsl` / `<name>.frag.wgsl` from `dir` and builds them.
    pub fn load(gpu: &GpuContext, dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        Self::new(gpu, &ShaderSource::load(dir, name)?)
    }

    /// The built-in sprite program.
    pub fn sprite(gpu: &GpuContext) -> Result<Self> {
        Self::new(gpu, &ShaderSource::sprite())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn handle(&self) -> Option<ProgramHandle> {
        self.handles.map(|h| h.program)
    }

    pub fn is_released(&self) -> bool {
        self.handles.is_none()
    }

    #[inline]
    pub fn slots(&self) -> AttributeSlots {
        self.slots
    }

    #[inline]
    pub fn slot(&self, semantic: Semantic) -> Option<u32> {
        self.slots.get(semantic)
    }

    /// Makes this program current.
    pub fn bind(&self) {
        if let Some(h) = self.handles {
            self.gpu.with(|api| api.use_program(Some(h.program)));
        }
    }

    pub fn unbind(&self) {
        self.gpu.with(|api| api.use_program(None));
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        let program = self.handle()?;
        self.gpu.with(|api| api.uniform_location(program, name))
    }

    /// Sets a matrix uniform. The program must be bound.
    pub fn set_uniform_mat4(&self, location: UniformLocation, value: &Mat4) {
        self.gpu.with(|api| api.set_uniform_mat4(location, value));
    }

    /// Releases the program and both stages. Later calls do nothing.
    pub fn release(&mut self) {
        let Some(h) = self.handles.take() else { return };
        let released = self.gpu.try_with(|api| {
            api.delete_program(h.program);
            api.delete_shader(h.vertex);
            api.delete_shader(h.fragment);
        });
        match released {
            Some(()) => log::debug!("released shader program `{}`", self.label),
            None => log::warn!("GPU busy; leaked shader program `{}`", self.label),
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        self.release();
    }
}
