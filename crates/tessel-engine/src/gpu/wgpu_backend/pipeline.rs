use std::num::NonZeroU64;

use crate::error::{RenderError, Result};
use crate::gpu::reflect::{ProgramInterface, SAMPLER_BINDING, TEXTURE_BINDING};
use crate::gpu::{AttribPointer, ProgramHandle};

const MAT4_SIZE: u64 = std::mem::size_of::<[f32; 16]>() as u64;

/// GPU objects owned by a linked program.
pub(super) struct ProgramRecord {
    pub interface: ProgramInterface,
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pub pipeline_layout: wgpu::PipelineLayout,
}

impl ProgramRecord {
    pub fn new(
        device: &wgpu::Device,
        interface: ProgramInterface,
        vertex: wgpu::ShaderModule,
        fragment: wgpu::ShaderModule,
    ) -> Self {
        let uniform_entries: Vec<_> = interface
            .uniforms
            .iter()
            .map(|u| wgpu::BindGroupLayoutEntry {
                binding: u.binding,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(MAT4_SIZE),
                },
                count: None,
            })
            .collect();

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessel uniform bgl"),
            entries: &uniform_entries,
        });

        let texture_entries = if interface.textured {
            vec![
                wgpu::BindGroupLayoutEntry {
                    binding: TEXTURE_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: SAMPLER_BINDING,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ]
        } else {
            Vec::new()
        };

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tessel texture bgl"),
            entries: &texture_entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tessel program layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            immediate_size: 0,
        });

        Self {
            interface,
            vertex,
            fragment,
            uniform_layout,
            texture_layout,
            pipeline_layout,
        }
    }
}

/// Cache key: a pipeline is specific to a program and the vertex layout feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct PipelineKey {
    pub program: ProgramHandle,
    pub stride: u32,
    /// `(slot, pointer)` for every attribute the program consumes, by slot.
    pub attributes: Vec<(u32, AttribPointer)>,
}

impl PipelineKey {
    /// Picks the enabled attributes `program` consumes and checks they share one
    /// interleaved stride and match the declared component counts.
    pub fn resolve(
        program: ProgramHandle,
        interface: &ProgramInterface,
        enabled: &std::collections::BTreeMap<u32, AttribPointer>,
    ) -> Result<Self> {
        let mut attributes = Vec::with_capacity(interface.attributes.len());
        let mut stride = None;

        for input in &interface.attributes {
            let ptr = enabled.get(&input.location).ok_or_else(|| {
                RenderError::gpu(format!(
                    "attribute `{}` at slot {} is not enabled",
                    input.name, input.location
                ))
            })?;
            if ptr.components != input.components {
                return Err(RenderError::gpu(format!(
                    "attribute `{}` expects {} components, slot {} provides {}",
                    input.name, input.components, input.location, ptr.components
                )));
            }
            match stride {
                None => stride = Some(ptr.stride),
                Some(s) if s != ptr.stride => {
                    return Err(RenderError::gpu("attributes must share one interleaved stride"));
                }
                Some(_) => {}
            }
            attributes.push((input.location, *ptr));
        }

        Ok(Self {
            program,
            stride: stride.unwrap_or(0),
            attributes,
        })
    }
}

fn vertex_format(components: u32) -> Result<wgpu::VertexFormat> {
    Ok(match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        4 => wgpu::VertexFormat::Float32x4,
        n => return Err(RenderError::gpu(format!("unsupported attribute width {n}"))),
    })
}

pub(super) fn build_pipeline(
    device: &wgpu::Device,
    program: &ProgramRecord,
    key: &PipelineKey,
    target_format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline> {
    let attributes = key
        .attributes
        .iter()
        .map(|(slot, ptr)| {
            Ok(wgpu::VertexAttribute {
                format: vertex_format(ptr.components)?,
                offset: ptr.offset as u64,
                shader_location: *slot,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let buffers = [wgpu::VertexBufferLayout {
        array_stride: key.stride as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &attributes,
    }];

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("tessel program pipeline"),
        layout: Some(&program.pipeline_layout),

        vertex: wgpu::VertexState {
            module: &program.vertex,
            entry_point: Some(&program.interface.vertex_entry),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &program.fragment,
            entry_point: Some(&program.interface.fragment_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        // Quads are lowered to triangle lists before they get here.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    });

    if let Some(err) = pollster::block_on(scope.pop()) {
        return Err(RenderError::gpu(format!("pipeline creation failed: {err}")));
    }

    log::debug!(
        "built pipeline for {:?} (stride {}, {} attributes)",
        key.program,
        key.stride,
        key.attributes.len()
    );
    Ok(pipeline)
}
