use crate::gpu::Topology;

/// One validated draw, ready to encode.
pub(super) struct DrawPacket {
    pub pipeline: wgpu::RenderPipeline,
    pub uniforms: wgpu::BindGroup,
    pub textures: wgpu::BindGroup,
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub count: u32,
}

/// Draws recorded since the last present, in submission order.
#[derive(Default)]
pub struct FramePlan {
    packets: Vec<DrawPacket>,
}

impl FramePlan {
    pub(super) fn push(&mut self, packet: DrawPacket) {
        self.packets.push(packet);
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Encodes every recorded draw into `pass`.
    pub fn encode(&self, pass: &mut wgpu::RenderPass<'_>) {
        for packet in &self.packets {
            pass.set_pipeline(&packet.pipeline);
            pass.set_bind_group(0, &packet.uniforms, &[]);
            pass.set_bind_group(1, &packet.textures, &[]);
            pass.set_vertex_buffer(0, packet.vertex.slice(..));
            pass.set_index_buffer(packet.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..packet.count, 0, 0..1);
        }
    }
}

/// Expands `a b c d` quads into `a b c  a c d` triangles. A trailing partial quad
/// is dropped.
pub(super) fn quads_to_triangles(indices: &[u32]) -> Vec<u32> {
    indices
        .chunks_exact(4)
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect()
}

/// Indices actually rasterized for a draw of `count` indices. Quads become two
/// triangles each and a trailing partial quad contributes nothing.
pub(super) fn lowered_index_count(topology: Topology, count: u32) -> u32 {
    match topology {
        Topology::Triangles => count,
        Topology::Quads => count / 4 * 6,
    }
}
