//! wgpu implementation of [`GpuApi`].
//!
//! Resource calls map directly onto wgpu objects. Draw calls are validated and
//! turned into packets (pipeline, bind groups, buffers) immediately, then encoded
//! into the frame's render pass when the runtime presents.

mod frame;
mod pipeline;

use std::collections::{BTreeMap, HashMap};

use glam::Mat4;
use wgpu::util::DeviceExt;

pub use frame::FramePlan;

use self::frame::{lowered_index_count, quads_to_triangles, DrawPacket};
use self::pipeline::{build_pipeline, PipelineKey, ProgramRecord};
use super::reflect::{self, StageInterface, TEXTURE_BINDING, SAMPLER_BINDING};
use super::{
    AttribPointer, BufferHandle, BufferTarget, BufferUsage, GpuApi, PixelBuffer, ProgramHandle,
    ShaderHandle, ShaderStage, TextureHandle, Topology, UniformLocation,
};
use crate::error::{RenderError, Result};

struct ShaderRecord {
    interface: StageInterface,
    module: wgpu::ShaderModule,
}

#[derive(Default)]
struct BufferRecord {
    raw: Option<wgpu::Buffer>,
    /// CPU copy of element data, kept for quad lowering.
    indices: Vec<u32>,
    /// Lowered quad indices: buffer plus the quad index count it was built for.
    quads: Option<(wgpu::Buffer, u32)>,
}

struct TextureRecord {
    view: wgpu::TextureView,
    size: (u32, u32),
}

#[derive(Default)]
struct BindState {
    program: Option<ProgramHandle>,
    array: Option<BufferHandle>,
    element: Option<BufferHandle>,
    texture: Option<TextureHandle>,
    enabled: BTreeMap<u32, AttribPointer>,
}

/// GPU backend over a wgpu device.
///
/// Owns clones of the device and queue; the surface stays with [`crate::device::Gpu`].
/// Draws recorded between two [`take_frame`](Self::take_frame) calls form one frame.
pub struct WgpuGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    target_format: wgpu::TextureFormat,
    sampler: wgpu::Sampler,

    next_id: u32,
    shaders: HashMap<ShaderHandle, ShaderRecord>,
    programs: HashMap<ProgramHandle, ProgramRecord>,
    buffers: HashMap<BufferHandle, BufferRecord>,
    textures: HashMap<TextureHandle, TextureRecord>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,

    state: BindState,
    uniforms: HashMap<ProgramHandle, BTreeMap<u32, Mat4>>,

    frame: FramePlan,
}

impl WgpuGpu {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("tessel nearest sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            target_format,
            sampler,
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            textures: HashMap::new(),
            pipelines: HashMap::new(),
            state: BindState::default(),
            uniforms: HashMap::new(),
            frame: FramePlan::default(),
        }
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    /// Hands over the draws recorded since the previous call.
    pub fn take_frame(&mut self) -> FramePlan {
        std::mem::take(&mut self.frame)
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|t| t.size)
    }

    fn alloc(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn bound(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.state.array,
            BufferTarget::Element => self.state.element,
        }
    }

    fn index_buffer(&mut self, handle: BufferHandle, topology: Topology, count: u32) -> Result<wgpu::Buffer> {
        let record = self
            .buffers
            .get_mut(&handle)
            .ok_or_else(|| RenderError::gpu(format!("{handle:?} was deleted")))?;

        match topology {
            Topology::Triangles => record
                .raw
                .clone()
                .ok_or_else(|| RenderError::gpu("element buffer has no data")),
            Topology::Quads => {
                if let Some((buffer, built_for)) = &record.quads {
                    if *built_for == count {
                        return Ok(buffer.clone());
                    }
                }
                let source = record.indices.get(..count as usize).ok_or_else(|| {
                    RenderError::gpu(format!(
                        "draw of {count} indices but the element buffer holds {}",
                        record.indices.len()
                    ))
                })?;
                let lowered = quads_to_triangles(source);
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("tessel quad indices"),
                    contents: bytemuck::cast_slice(&lowered),
                    usage: wgpu::BufferUsages::INDEX,
                });
                record.quads = Some((buffer.clone(), count));
                Ok(buffer)
            }
        }
    }

    fn uniform_group(&self, program: ProgramHandle, record: &ProgramRecord) -> wgpu::BindGroup {
        let values = self.uniforms.get(&program);
        let buffers: Vec<(u32, wgpu::Buffer)> = record
            .interface
            .uniforms
            .iter()
            .map(|u| {
                let value = values
                    .and_then(|v| v.get(&u.binding))
                    .copied()
                    .unwrap_or(Mat4::IDENTITY);
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("tessel uniform"),
                    contents: bytemuck::cast_slice(&value.to_cols_array()),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                (u.binding, buffer)
            })
            .collect();

        let entries: Vec<wgpu::BindGroupEntry<'_>> = buffers
            .iter()
            .map(|(binding, buffer)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessel uniform bind group"),
            layout: &record.uniform_layout,
            entries: &entries,
        })
    }

    fn texture_group(&self, record: &ProgramRecord) -> Result<wgpu::BindGroup> {
        if !record.interface.textured {
            return Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("tessel empty texture bind group"),
                layout: &record.texture_layout,
                entries: &[],
            }));
        }

        let texture = self
            .state
            .texture
            .and_then(|t| self.textures.get(&t))
            .ok_or_else(|| RenderError::gpu("program samples a texture but none is bound"))?;

        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tessel texture bind group"),
            layout: &record.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: TEXTURE_BINDING,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: SAMPLER_BINDING,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }
}

impl GpuApi for WgpuGpu {
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let interface = reflect::compile(stage, source)
            .map_err(|log| RenderError::ShaderCompileFailed { stage, log })?;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match stage {
                ShaderStage::Vertex => "tessel vertex shader",
                ShaderStage::Fragment => "tessel fragment shader",
            }),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let handle = ShaderHandle(self.alloc());
        log::debug!("compiled {stage} shader {handle:?} (entry `{}`)", interface.entry_point);
        self.shaders.insert(handle, ShaderRecord { interface, module });
        Ok(handle)
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader).is_some() {
            log::trace!("deleted shader {shader:?}");
        }
    }

    fn link_program(&mut self, vertex: ShaderHandle, fragment: ShaderHandle) -> Result<ProgramHandle> {
        let (Some(vs), Some(fs)) = (self.shaders.get(&vertex), self.shaders.get(&fragment)) else {
            return Err(RenderError::ShaderLinkFailed("unknown shader handle".into()));
        };
        let interface = reflect::link(&vs.interface, &fs.interface).map_err(RenderError::ShaderLinkFailed)?;
        let record = ProgramRecord::new(&self.device, interface, vs.module.clone(), fs.module.clone());

        let handle = ProgramHandle(self.alloc());
        log::debug!(
            "linked program {handle:?}: {} attributes, {} uniforms, textured = {}",
            record.interface.attributes.len(),
            record.interface.uniforms.len(),
            record.interface.textured
        );
        self.programs.insert(handle, record);
        Ok(handle)
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
        self.uniforms.remove(&program);
        self.pipelines.retain(|key, _| key.program != program);
        if self.state.program == Some(program) {
            self.state.program = None;
        }
        log::trace!("deleted program {program:?}");
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.programs
            .get(&program)?
            .interface
            .attribute(name)
            .map(|a| a.location)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let uniform = self.programs.get(&program)?.interface.uniform(name)?;
        Some(UniformLocation { program, binding: uniform.binding })
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) {
        self.state.program = program.filter(|p| self.programs.contains_key(p));
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        if self.state.program != Some(location.program) {
            log::warn!("uniform set on {:?} while it is not in use", location.program);
            return;
        }
        self.uniforms
            .entry(location.program)
            .or_default()
            .insert(location.binding, *value);
    }

    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let handle = BufferHandle(self.alloc());
        self.buffers.insert(handle, BufferRecord::default());
        log::trace!("created buffer {handle:?}");
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        match target {
            BufferTarget::Array => self.state.array = buffer,
            BufferTarget::Element => self.state.element = buffer,
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) -> Result<()> {
        let handle = self
            .bound(target)
            .ok_or_else(|| RenderError::gpu(format!("no buffer bound to {target:?}")))?;
        if data.len() % 4 != 0 {
            return Err(RenderError::gpu(format!(
                "buffer data of {} bytes is not 4-byte aligned",
                data.len()
            )));
        }

        let usages = match target {
            BufferTarget::Array => wgpu::BufferUsages::VERTEX,
            BufferTarget::Element => wgpu::BufferUsages::INDEX,
        };
        let raw = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match target {
                BufferTarget::Array => "tessel vertex buffer",
                BufferTarget::Element => "tessel index buffer",
            }),
            contents: data,
            usage: usages,
        });

        let record = self
            .buffers
            .get_mut(&handle)
            .ok_or_else(|| RenderError::gpu(format!("{handle:?} was deleted")))?;
        record.raw = Some(raw);
        record.quads = None;
        record.indices = match target {
            BufferTarget::Element => data
                .chunks_exact(4)
                .map(|c| u32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
            BufferTarget::Array => Vec::new(),
        };
        log::trace!("{handle:?}: {} bytes ({usage:?})", data.len());
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        // Not destroyed explicitly: draws recorded this frame may still hold it.
        self.buffers.remove(&buffer);
        if self.state.array == Some(buffer) {
            self.state.array = None;
        }
        if self.state.element == Some(buffer) {
            self.state.element = None;
        }
        log::trace!("deleted buffer {buffer:?}");
    }

    fn create_texture(&mut self, pixels: &PixelBuffer) -> Result<TextureHandle> {
        if pixels.is_empty() {
            return Err(RenderError::gpu("texture has zero size"));
        }
        let limit = self.device.limits().max_texture_dimension_2d;
        if pixels.width > limit || pixels.height > limit {
            return Err(RenderError::gpu(format!(
                "texture {}x{} exceeds the device limit of {limit}",
                pixels.width, pixels.height
            )));
        }

        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("tessel texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pixels.width * 4),
                rows_per_image: Some(pixels.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle(self.alloc());
        log::debug!("created texture {handle:?} ({}x{})", pixels.width, pixels.height);
        self.textures.insert(
            handle,
            TextureRecord {
                view,
                size: (pixels.width, pixels.height),
            },
        );
        Ok(handle)
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.state.texture = texture;
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
        if self.state.texture == Some(texture) {
            self.state.texture = None;
        }
        log::trace!("deleted texture {texture:?}");
    }

    fn enable_attribute(&mut self, slot: u32, pointer: AttribPointer) {
        self.state.enabled.insert(slot, pointer);
    }

    fn disable_attribute(&mut self, slot: u32) {
        self.state.enabled.remove(&slot);
    }

    fn draw_elements(&mut self, topology: Topology, count: u32) -> Result<()> {
        let program = self
            .state
            .program
            .ok_or_else(|| RenderError::gpu("draw without a program in use"))?;
        let vertex_handle = self
            .state
            .array
            .ok_or_else(|| RenderError::gpu("draw without an array buffer bound"))?;
        let index_handle = self
            .state
            .element
            .ok_or_else(|| RenderError::gpu("draw without an element buffer bound"))?;

        let record = self
            .programs
            .get(&program)
            .ok_or_else(|| RenderError::gpu(format!("{program:?} was deleted")))?;
        let key = PipelineKey::resolve(program, &record.interface, &self.state.enabled)?;

        let lowered = lowered_index_count(topology, count);
        if lowered == 0 {
            // Nothing to rasterize; wgpu rejects empty buffer slices.
            return Ok(());
        }

        let vertex = self
            .buffers
            .get(&vertex_handle)
            .and_then(|b| b.raw.clone())
            .filter(|b| b.size() > 0)
            .ok_or_else(|| RenderError::gpu("array buffer has no data"))?;

        let pipeline = match self.pipelines.get(&key) {
            Some(pipeline) => pipeline.clone(),
            None => {
                let record = self
                    .programs
                    .get(&program)
                    .ok_or_else(|| RenderError::gpu(format!("{program:?} was deleted")))?;
                let pipeline = build_pipeline(&self.device, record, &key, self.target_format)?;
                self.pipelines.insert(key, pipeline.clone());
                pipeline
            }
        };

        let index = self.index_buffer(index_handle, topology, count)?;
        if index.size() < lowered as u64 * 4 {
            return Err(RenderError::gpu(format!(
                "draw of {lowered} indices but the element buffer holds {}",
                index.size() / 4
            )));
        }

        let record = self
            .programs
            .get(&program)
            .ok_or_else(|| RenderError::gpu(format!("{program:?} was deleted")))?;
        let packet = DrawPacket {
            pipeline,
            uniforms: self.uniform_group(program, record),
            textures: self.texture_group(record)?,
            vertex,
            index,
            count: lowered,
        };
        self.frame.push(packet);
        Ok(())
    }
}
