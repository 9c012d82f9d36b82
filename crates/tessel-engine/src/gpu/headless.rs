use std::collections::{BTreeMap, HashMap};

use glam::Mat4;

use super::reflect::{self, ProgramInterface, StageInterface};
use super::{
    AttribPointer, BufferHandle, BufferTarget, BufferUsage, GpuApi, PixelBuffer, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, Topology, UniformLocation,
};
use crate::error::{RenderError, Result};

/// One call made through [`GpuApi`], in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CompileShader(ShaderStage),
    DeleteShader(ShaderHandle),
    LinkProgram(ShaderHandle, ShaderHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniformMat4(UniformLocation),
    CreateBuffer(BufferHandle),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    BufferData { target: BufferTarget, bytes: usize, usage: BufferUsage },
    DeleteBuffer(BufferHandle),
    CreateTexture(TextureHandle),
    BindTexture(Option<TextureHandle>),
    DeleteTexture(TextureHandle),
    EnableAttribute(u32, AttribPointer),
    DisableAttribute(u32),
    DrawElements { topology: Topology, count: u32 },
}

/// Snapshot of the pipeline state at a successful draw.
#[derive(Debug, Clone)]
pub struct DrawRecord {
    pub program: ProgramHandle,
    pub topology: Topology,
    pub count: u32,
    pub texture: Option<TextureHandle>,
    pub vertex_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    /// Enabled attributes, by slot.
    pub attributes: BTreeMap<u32, AttribPointer>,
    /// Matrix uniforms of the program, by binding.
    pub uniforms: BTreeMap<u32, Mat4>,
}

#[derive(Debug, Default)]
struct BufferRecord {
    data: Vec<u8>,
    usage: BufferUsage,
}

/// Backend without a device: validates and records everything it is asked to do.
///
/// Shaders go through the same WGSL front end as the wgpu backend, so compile and
/// link failures are real. Buffer contents are kept so tests can inspect uploads.
#[derive(Debug, Default)]
pub struct HeadlessGpu {
    next_id: u32,

    shaders: HashMap<ShaderHandle, StageInterface>,
    programs: HashMap<ProgramHandle, ProgramInterface>,
    buffers: HashMap<BufferHandle, BufferRecord>,
    textures: HashMap<TextureHandle, (u32, u32)>,

    current_program: Option<ProgramHandle>,
    array_buffer: Option<BufferHandle>,
    element_buffer: Option<BufferHandle>,
    texture: Option<TextureHandle>,
    enabled: BTreeMap<u32, AttribPointer>,
    uniforms: HashMap<ProgramHandle, BTreeMap<u32, Mat4>>,

    buffer_quota: Option<usize>,

    calls: Vec<GpuCall>,
    draws: Vec<DrawRecord>,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context plus a typed handle for inspecting the recorded state.
    pub fn shared() -> (super::GpuContext, std::rc::Rc<std::cell::RefCell<HeadlessGpu>>) {
        let gpu = std::rc::Rc::new(std::cell::RefCell::new(HeadlessGpu::new()));
        (super::GpuContext::from_rc(gpu.clone()), gpu)
    }

    /// Caps the number of live buffers; `create_buffer` fails beyond it.
    pub fn set_buffer_quota(&mut self, quota: Option<usize>) {
        self.buffer_quota = quota;
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn draws(&self) -> &[DrawRecord] {
        &self.draws
    }

    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|b| b.data.as_slice())
    }

    pub fn buffer_usage(&self, buffer: BufferHandle) -> Option<BufferUsage> {
        self.buffers.get(&buffer).map(|b| b.usage)
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).copied()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::Element => self.element_buffer,
        }
    }

    pub fn bound_texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn enabled_attributes(&self) -> &BTreeMap<u32, AttribPointer> {
        &self.enabled
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn bound_slot(&mut self, target: BufferTarget) -> &mut Option<BufferHandle> {
        match target {
            BufferTarget::Array => &mut self.array_buffer,
            BufferTarget::Element => &mut self.element_buffer,
        }
    }
}

impl GpuApi for HeadlessGpu {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        self.calls.push(GpuCall::CompileShader(stage));
        let interface = reflect::compile(stage, source)
            .map_err(|log| RenderError::ShaderCompileFailed { stage, log })?;

        let handle = ShaderHandle(self.alloc());
        log::trace!("headless: compiled {stage} shader {handle:?}");
        self.shaders.insert(handle, interface);
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        self.calls.push(GpuCall::DeleteShader(shader));
        self.shaders.remove(&shader);
    }

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
        self.calls.push(GpuCall::LinkProgram(vertex, fragment));
        let (Some(vs), Some(fs)) = (self.shaders.get(&vertex), self.shaders.get(&fragment)) else {
            return Err(RenderError::ShaderLinkFailed("unknown shader handle".into()));
        };
        let interface = reflect::link(vs, fs).map_err(RenderError::ShaderLinkFailed)?;

        let handle = ProgramHandle(self.alloc());
        log::trace!("headless: linked program {handle:?}");
        self.programs.insert(handle, interface);
        Ok(handle)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push(GpuCall::DeleteProgram(program));
        self.programs.remove(&program);
        self.uniforms.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs.get(&program)?.attribute(name).map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let uniform = self.programs.get(&program)?.uniform(name)?;
        Some(UniformLocation { program, binding: uniform.binding })
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.calls.push(GpuCall::UseProgram(program));
        self.current_program = program.filter(|p| self.programs.contains_key(p));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.calls.push(GpuCall::SetUniformMat4(location));
        if self.current_program != Some(location.program) {
            log::warn!("headless: uniform set on {:?} while it is not in use", location.program);
            return;
        }
        self.uniforms
            .entry(location.program)
            .or_default()
            .insert(location.binding, *value);
    }

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        if let Some(quota) = self.buffer_quota.filter(|&q| self.buffers.len() >= q) {
            return Err(RenderError::gpu(format!("buffer quota of {quota} exhausted")));
        }
        let handle = BufferHandle(self.alloc());
        self.calls.push(GpuCall::CreateBuffer(handle));
        self.buffers.insert(handle, BufferRecord::default());
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        self.calls.push(GpuCall::BindBuffer(target, buffer));
        *self.bound_slot(target) = buffer;
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()> {
        self.calls.push(GpuCall::BufferData { target, bytes: data.len(), usage });
        let Some(handle) = *self.bound_slot(target) else {
            return Err(RenderError::gpu(format!("no buffer bound to {target:?}")));
        };
        let record = self
            .buffers
            .get_mut(&handle)
            .ok_or_else(|| RenderError::gpu(format!("{handle:?} was deleted")))?;
        record.data.clear();
        record.data.extend_from_slice(data);
        record.usage = usage;
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(GpuCall::DeleteBuffer(buffer));
        self.buffers.remove(&buffer);
        for slot in [&mut self.array_buffer, &mut self.element_buffer] {
            if *slot == Some(buffer) {
                *slot = None;
            }
        }
    }

    fn create_texture(&mut self, pixels: &PixelBuffer) -> Result<TextureHandle> {
        if pixels.is_empty() {
            return Err(RenderError::gpu("texture has zero size"));
        }
        let handle = TextureHandle(self.alloc());
        self.calls.push(GpuCall::CreateTexture(handle));
        self.textures.insert(handle, (pixels.width, pixels.height));
        Ok(handle)
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.calls.push(GpuCall::BindTexture(texture));
        self.texture = texture;
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.calls.push(GpuCall::DeleteTexture(texture));
        self.textures.remove(&texture);
        if self.texture == Some(texture) {
            self.texture = None;
        }
    }

    fn enable_attribute(&mut self, slot: u32, pointer: AttribPointer) {
        self.calls.push(GpuCall::EnableAttribute(slot, pointer));
        self.enabled.insert(slot, pointer);
    }

    fn disable_attribute(&mut self, slot: u32) {
        self.calls.push(GpuCall::DisableAttribute(slot));
        self.enabled.remove(&slot);
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) -> Result<()> {
        self.calls.push(GpuCall::DrawElements { topology, count });

        let program = self
            .current_program
            .ok_or_else(|| RenderError::gpu("draw without a program in use"))?;
        let vertex_buffer = self
            .array_buffer
            .ok_or_else(|| RenderError::gpu("draw without an array buffer bound"))?;
        let index_buffer = self
            .element_buffer
            .ok_or_else(|| RenderError::gpu("draw without an element buffer bound"))?;

        let available = self.buffers.get(&index_buffer).map_or(0, |b| b.data.len() / 4);
        if count as usize > available {
            return Err(RenderError::gpu(format!(
                "draw of {count} indices but the element buffer holds {available}"
            )));
        }

        let interface = self
            .programs
            .get(&program)
            .ok_or_else(|| RenderError::gpu(format!("{program:?} was deleted")))?;
        for input in &interface.attributes {
            match self.enabled.get(&input.location) {
                Some(ptr) if ptr.components == input.components => {}
                Some(ptr) => {
                    return Err(RenderError::gpu(format!(
                        "attribute `{}` expects {} components, slot {} provides {}",
                        input.name, input.components, input.location, ptr.components
                    )));
                }
                None => {
                    return Err(RenderError::gpu(format!(
                        "attribute `{}` at slot {} is not enabled",
                        input.name, input.location
                    )));
                }
            }
        }
        if interface.textured && self.texture.is_none() {
            return Err(RenderError::gpu("program samples a texture but none is bound"));
        }

        self.draws.push(DrawRecord {
            program,
            topology,
            count,
            texture: self.texture,
            vertex_buffer,
            index_buffer,
            attributes: self.enabled.clone(),
            uniforms: self.uniforms.get(&program).cloned().unwrap_or_default(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderSource;

    fn sprite_program(gpu: &mut HeadlessGpu) -> ProgramHandle {
        let src = ShaderSource::sprite();
        let vs = gpu.compile_shader(ShaderStage::Vertex, &src.vertex).unwrap();
        let fs = gpu.compile_shader(ShaderStage::Fragment, &src.fragment).unwrap();
        gpu.link_program(vs, fs).unwrap()
    }

    // ── buffers ───────────────────────────────────────────────────────────

    #[test]
    fn buffer_data_goes_to_bound_buffer() {
        let mut gpu = HeadlessGpu::new();
        let buf = gpu.create_buffer().unwrap();
        gpu.bind_buffer(BufferTarget::Array, Some(buf));
        gpu.buffer_data(BufferTarget::Array, &[1, 2, 3, 4], BufferUsage::Static).unwrap();

        assert_eq!(gpu.buffer_contents(buf), Some(&[1u8, 2, 3, 4][..]));
        assert_eq!(gpu.buffer_usage(buf), Some(BufferUsage::Static));
    }

    #[test]
    fn buffer_data_without_binding_fails() {
        let mut gpu = HeadlessGpu::new();
        assert!(gpu.buffer_data(BufferTarget::Element, &[0; 4], BufferUsage::Stream).is_err());
    }

    #[test]
    fn quota_limits_live_buffers() {
        let mut gpu = HeadlessGpu::new();
        gpu.set_buffer_quota(Some(1));
        let first = gpu.create_buffer().unwrap();
        assert!(gpu.create_buffer().is_err());
        gpu.delete_buffer(first);
        assert!(gpu.create_buffer().is_ok());
    }

    #[test]
    fn deleting_bound_buffer_unbinds_it() {
        let mut gpu = HeadlessGpu::new();
        let buf = gpu.create_buffer().unwrap();
        gpu.bind_buffer(BufferTarget::Element, Some(buf));
        gpu.delete_buffer(buf);
        assert_eq!(gpu.bound_buffer(BufferTarget::Element), None);
        assert_eq!(gpu.live_buffers(), 0);
    }

    // ── programs ──────────────────────────────────────────────────────────

    #[test]
    fn sprite_program_resolves_locations() {
        let mut gpu = HeadlessGpu::new();
        let program = sprite_program(&mut gpu);

        assert_eq!(gpu.attribute_location(program, "vertex_position"), Some(0));
        assert_eq!(gpu.attribute_location(program, "vertex_texcoord"), Some(1));
        assert_eq!(gpu.attribute_location(program, "vertex_normal"), None);
        assert!(gpu.uniform_location(program, "mvp").is_some());
        assert!(gpu.uniform_location(program, "model").is_none());
    }

    #[test]
    fn compile_error_records_no_shader() {
        let mut gpu = HeadlessGpu::new();
        let err = gpu.compile_shader(ShaderStage::Vertex, "fn broken(").unwrap_err();
        assert!(matches!(err, RenderError::ShaderCompileFailed { stage: ShaderStage::Vertex, .. }));
        assert_eq!(gpu.live_shaders(), 0);
    }

    #[test]
    fn uniform_ignored_when_program_not_in_use() {
        let mut gpu = HeadlessGpu::new();
        let program = sprite_program(&mut gpu);
        let loc = gpu.uniform_location(program, "mvp").unwrap();
        gpu.set_uniform_mat4(loc, &Mat4::IDENTITY);
        assert!(gpu.uniforms.get(&program).is_none());
    }

    // ── draws ─────────────────────────────────────────────────────────────

    #[test]
    fn draw_requires_program_inputs() {
        let mut gpu = HeadlessGpu::new();
        let program = sprite_program(&mut gpu);
        let vb = gpu.create_buffer().unwrap();
        let ib = gpu.create_buffer().unwrap();
        gpu.bind_buffer(BufferTarget::Array, Some(vb));
        gpu.bind_buffer(BufferTarget::Element, Some(ib));
        gpu.buffer_data(BufferTarget::Element, bytemuck::cast_slice(&[0u32, 1, 2]), BufferUsage::Stream)
            .unwrap();
        gpu.use_program(Some(program));

        gpu.enable_attribute(0, AttribPointer { components: 2, stride: 16, offset: 0 });
        let err = gpu.draw_elements(Topology::Triangles, 3).unwrap_err();
        assert!(err.to_string().contains("vertex_texcoord"), "{err}");

        gpu.enable_attribute(1, AttribPointer { components: 2, stride: 16, offset: 8 });
        let tex = gpu.create_texture(&PixelBuffer::solid(1, 1, [255; 4])).unwrap();
        gpu.bind_texture(Some(tex));
        gpu.draw_elements(Topology::Triangles, 3).unwrap();

        assert_eq!(gpu.draws().len(), 1);
        assert_eq!(gpu.draws()[0].texture, Some(tex));
    }

    #[test]
    fn draw_past_index_data_fails() {
        let mut gpu = HeadlessGpu::new();
        let program = sprite_program(&mut gpu);
        let vb = gpu.create_buffer().unwrap();
        let ib = gpu.create_buffer().unwrap();
        gpu.bind_buffer(BufferTarget::Array, Some(vb));
        gpu.bind_buffer(BufferTarget::Element, Some(ib));
        gpu.use_program(Some(program));

        let err = gpu.draw_elements(Topology::Quads, 4).unwrap_err();
        assert!(matches!(err, RenderError::GpuResourceFailure(_)));
        assert!(gpu.draws().is_empty());
    }
}
