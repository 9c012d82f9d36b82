use crate::error::{RenderError, Result};
use crate::gpu::{
    AttribPointer, BufferHandle, BufferTarget, BufferUsage, GpuApi, GpuContext, Topology,
};
use crate::shader::ShaderProgram;
use crate::vertex::{VertexFormat, FIXED_SLOTS};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct GpuBuffers {
    vertex: BufferHandle,
    index: BufferHandle,
}

/// Format-driven vertex/index staging with a GPU mirror.
///
/// Capacity is counted in vertices: the vertex store holds `capacity` vertices of
/// the current format and the index store holds `capacity` indices. Appends that
/// fail leave the staged data untouched.
///
/// GPU buffers exist only between [`upload`](Self::upload) and
/// [`release`](Self::release) (or drop).
#[derive(Debug)]
pub struct GeometryBuffer {
    gpu: GpuContext,
    format: VertexFormat,
    capacity: usize,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    usage: BufferUsage,
    topology: Topology,
    buffers: Option<GpuBuffers>,
}

impl GeometryBuffer {
    pub fn new(gpu: &GpuContext, format: VertexFormat, capacity: usize) -> Self {
        Self {
            gpu: gpu.clone(),
            format,
            capacity,
            vertices: Vec::with_capacity(capacity * format.attribute_count()),
            indices: Vec::with_capacity(capacity),
            usage: BufferUsage::default(),
            topology: Topology::default(),
            buffers: None,
        }
    }

    // ── staging ───────────────────────────────────────────────────────────

    /// Resets both cursors. GPU contents are left as they are.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Switches format and clears staged data; capacity stays `capacity` vertices.
    pub fn set_format(&mut self, format: VertexFormat) {
        self.clear();
        self.format = format;
        let floats = self.capacity * format.attribute_count();
        self.vertices.reserve_exact(floats);
        self.vertices.shrink_to(floats);
    }

    /// Appends one vertex whose values follow the format's channel order.
    pub fn push_vertex(&mut self, values: &[f32]) -> Result<()> {
        let expected = self.format.attribute_count();
        if values.len() != expected {
            return Err(self.mismatch(values.len()));
        }
        self.ensure_vertex_room(1)?;
        self.vertices.extend_from_slice(values);
        Ok(())
    }

    /// Appends several vertices at once: all of them or none.
    pub fn push_vertices(&mut self, values: &[f32]) -> Result<()> {
        let per_vertex = self.format.attribute_count();
        if values.len() % per_vertex != 0 {
            return Err(self.mismatch(values.len()));
        }
        self.ensure_vertex_room(values.len() / per_vertex)?;
        self.vertices.extend_from_slice(values);
        Ok(())
    }

    /// Replaces all staged data after validating it against format and capacity.
    pub fn set_data(&mut self, vertices: &[f32], indices: &[u32]) -> Result<()> {
        let per_vertex = self.format.attribute_count();
        if vertices.len() % per_vertex != 0 {
            return Err(self.mismatch(vertices.len()));
        }
        let count = vertices.len() / per_vertex;
        if count > self.capacity {
            return Err(RenderError::CapacityExceeded {
                what: "vertex",
                capacity: self.capacity,
                requested: count,
            });
        }
        if indices.len() > self.capacity {
            return Err(RenderError::CapacityExceeded {
                what: "index",
                capacity: self.capacity,
                requested: indices.len(),
            });
        }

        self.clear();
        self.vertices.extend_from_slice(vertices);
        self.indices.extend_from_slice(indices);
        Ok(())
    }

    /// Rewrites the index list as `0..vertex_count`.
    pub fn index_from_sequential_vertices(&mut self) {
        let count = self.vertex_count() as u32;
        self.indices.clear();
        self.indices.extend(0..count);
    }

    /// Appends one triangle.
    pub fn add_index(&mut self, a: u32, b: u32, c: u32) -> Result<()> {
        self.add_indices(&[a, b, c])
    }

    /// Appends explicit indices: all of them or none.
    pub fn add_indices(&mut self, indices: &[u32]) -> Result<()> {
        let requested = self.indices.len() + indices.len();
        if requested > self.capacity {
            return Err(RenderError::CapacityExceeded {
                what: "index",
                capacity: self.capacity,
                requested,
            });
        }
        self.indices.extend_from_slice(indices);
        Ok(())
    }

    fn mismatch(&self, got: usize) -> RenderError {
        RenderError::FormatMismatch {
            format: self.format,
            expected: self.format.attribute_count(),
            got,
        }
    }

    fn ensure_vertex_room(&self, extra: usize) -> Result<()> {
        let requested = self.vertex_count() + extra;
        if requested > self.capacity {
            return Err(RenderError::CapacityExceeded {
                what: "vertex",
                capacity: self.capacity,
                requested,
            });
        }
        Ok(())
    }

    // ── GPU lifecycle ─────────────────────────────────────────────────────

    /// Creates the GPU buffers and copies staged data into them.
    ///
    /// Does nothing when already loaded. On failure every buffer created so far is
    /// deleted and the buffer stays unloaded.
    pub fn upload(&mut self) -> Result<()> {
        if self.buffers.is_some() {
            return Ok(());
        }

        let buffers = self.gpu.with(|api| -> Result<GpuBuffers> {
            let vertex = api.create_buffer()?;
            let index = match api.create_buffer() {
                Ok(index) => index,
                Err(err) => {
                    api.delete_buffer(vertex);
                    return Err(err);
                }
            };
            let buffers = GpuBuffers { vertex, index };
            if let Err(err) = write_buffers(api, buffers, &self.vertices, &self.indices, self.usage) {
                api.delete_buffer(vertex);
                api.delete_buffer(index);
                return Err(err);
            }
            Ok(buffers)
        })?;

        log::debug!(
            "uploaded {} geometry: {} vertices, {} indices",
            self.format,
            self.vertex_count(),
            self.indices.len()
        );
        self.buffers = Some(buffers);
        Ok(())
    }

    /// Copies the current staged data into the existing GPU buffers. Does nothing
    /// when not loaded.
    ///
    /// A failed write can leave the vertex and index buffers from different
    /// generations, so both are released and the buffer ends up unloaded.
    pub fn reupload(&mut self) -> Result<()> {
        let Some(buffers) = self.buffers else { return Ok(()) };
        let written = self
            .gpu
            .with(|api| write_buffers(api, buffers, &self.vertices, &self.indices, self.usage));
        if let Err(err) = written {
            log::warn!("geometry reupload failed, releasing GPU buffers: {err}");
            self.release();
            return Err(err);
        }
        Ok(())
    }

    /// Deletes the GPU buffers; staged data is kept. Idempotent.
    pub fn release(&mut self) {
        let Some(buffers) = self.buffers.take() else { return };
        let released = self.gpu.try_with(|api| {
            api.delete_buffer(buffers.vertex);
            api.delete_buffer(buffers.index);
        });
        if released.is_none() {
            log::warn!("GPU busy; leaked geometry buffers {buffers:?}");
        }
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Binds every channel of the format to `shader`'s slot for its semantic and
    /// draws all staged indices. Channels the shader does not read are skipped.
    ///
    /// `shader` must be the bound program. Attribute slots and buffer bindings are
    /// cleared afterwards, also when the draw fails. Does nothing when not loaded.
    pub fn bind_and_draw(&self, shader: &ShaderProgram) -> Result<()> {
        let Some(buffers) = self.buffers else { return Ok(()) };
        let stride = self.format.stride() as u32;
        let count = self.indices.len() as u32;

        self.gpu.with(|api| {
            api.bind_buffer(BufferTarget::Array, Some(buffers.vertex));

            let mut enabled = Vec::with_capacity(self.format.channels().len());
            for entry in self.format.layout() {
                let Some(slot) = shader.slot(entry.channel.semantic()) else { continue };
                api.enable_attribute(
                    slot,
                    AttribPointer {
                        components: entry.components as u32,
                        stride,
                        offset: entry.offset as u32,
                    },
                );
                enabled.push(slot);
            }

            api.bind_buffer(BufferTarget::Element, Some(buffers.index));
            let result = api.draw_elements(self.topology, count);

            for slot in 0..FIXED_SLOTS {
                api.disable_attribute(slot);
            }
            for slot in enabled.into_iter().filter(|s| *s >= FIXED_SLOTS) {
                api.disable_attribute(slot);
            }
            api.bind_buffer(BufferTarget::Array, None);
            api.bind_buffer(BufferTarget::Element, None);

            result
        })
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn format(&self) -> VertexFormat {
        self.format
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.format.stride()
    }

    #[inline]
    pub fn attribute_count(&self) -> usize {
        self.format.attribute_count()
    }

    /// Maximum number of vertices (and of indices).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Floats written so far.
    #[inline]
    pub fn vertex_cursor(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_cursor(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.format.attribute_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.buffers.is_some()
    }

    pub fn vertex_handle(&self) -> Option<BufferHandle> {
        self.buffers.map(|b| b.vertex)
    }

    pub fn index_handle(&self) -> Option<BufferHandle> {
        self.buffers.map(|b| b.index)
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Takes effect on the next upload.
    pub fn set_usage(&mut self, usage: BufferUsage) {
        self.usage = usage;
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn set_topology(&mut self, topology: Topology) {
        self.topology = topology;
    }
}

impl Drop for GeometryBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

fn write_buffers(
    api: &mut dyn GpuApi,
    buffers: GpuBuffers,
    vertices: &[f32],
    indices: &[u32],
    usage: BufferUsage,
) -> Result<()> {
    api.bind_buffer(BufferTarget::Array, Some(buffers.vertex));
    let result = api
        .buffer_data(BufferTarget::Array, bytemuck::cast_slice(vertices), usage)
        .and_then(|()| {
            api.bind_buffer(BufferTarget::Element, Some(buffers.index));
            api.buffer_data(BufferTarget::Element, bytemuck::cast_slice(indices), usage)
        });
    api.bind_buffer(BufferTarget::Array, None);
    api.bind_buffer(BufferTarget::Element, None);
    result
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::gpu::{GpuCall, HeadlessGpu};

    fn setup(format: VertexFormat, capacity: usize) -> (GeometryBuffer, Rc<RefCell<HeadlessGpu>>) {
        let (gpu, state) = HeadlessGpu::shared();
        (GeometryBuffer::new(&gpu, format, capacity), state)
    }

    fn unit_quad(buf: &mut GeometryBuffer) {
        buf.push_vertex(&[0.0, 0.0, 1.0, 1.0]).unwrap();
        buf.push_vertex(&[1.0, 0.0, 0.0, 1.0]).unwrap();
        buf.push_vertex(&[1.0, 1.0, 0.0, 0.0]).unwrap();
        buf.push_vertex(&[0.0, 1.0, 1.0, 0.0]).unwrap();
    }

    // ── append ────────────────────────────────────────────────────────────

    #[test]
    fn wrong_value_count_is_format_mismatch() {
        let (mut buf, _) = setup(VertexFormat::XyzNormalUv, 8);
        buf.push_vertex(&[0.0; 8]).unwrap();

        for bad in [0, 3, 7, 9, 12] {
            let err = buf.push_vertex(&vec![1.0; bad]).unwrap_err();
            assert!(
                matches!(err, RenderError::FormatMismatch { expected: 8, got, .. } if got == bad),
                "{err}"
            );
        }
        assert_eq!(buf.vertex_cursor(), 8);
    }

    #[test]
    fn append_past_capacity_fails_cleanly() {
        let (mut buf, _) = setup(VertexFormat::Xy, 2);
        buf.push_vertex(&[0.0, 0.0]).unwrap();
        buf.push_vertex(&[1.0, 0.0]).unwrap();

        let err = buf.push_vertex(&[2.0, 0.0]).unwrap_err();
        assert!(matches!(err, RenderError::CapacityExceeded { what: "vertex", capacity: 2, requested: 3 }));
        assert_eq!(buf.vertices(), &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn cursors_track_successful_appends() {
        let (mut buf, _) = setup(VertexFormat::XyzUvColor, 16);
        for i in 0..5 {
            buf.push_vertex(&[i as f32; 9]).unwrap();
        }
        let _ = buf.push_vertex(&[0.0; 4]);
        buf.add_index(0, 1, 2).unwrap();
        buf.add_index(2, 3, 4).unwrap();

        assert_eq!(buf.vertex_cursor(), 5 * 9);
        assert_eq!(buf.vertex_count(), 5);
        assert_eq!(buf.index_cursor(), 6);
        assert_eq!(buf.triangle_count(), 2);
    }

    #[test]
    fn push_vertices_is_atomic() {
        let (mut buf, _) = setup(VertexFormat::Xy, 3);
        buf.push_vertices(&[0.0, 0.0, 1.0, 1.0]).unwrap();

        assert!(buf.push_vertices(&[2.0, 2.0, 3.0, 3.0]).is_err());
        assert!(matches!(
            buf.push_vertices(&[2.0, 2.0, 3.0]),
            Err(RenderError::FormatMismatch { .. })
        ));
        assert_eq!(buf.vertex_count(), 2);

        buf.push_vertices(&[2.0, 2.0]).unwrap();
        assert_eq!(buf.vertex_count(), 3);
    }

    #[test]
    fn index_overflow_leaves_indices() {
        let (mut buf, _) = setup(VertexFormat::Xy, 4);
        buf.add_index(0, 1, 2).unwrap();
        let err = buf.add_index(2, 3, 0).unwrap_err();
        assert!(matches!(err, RenderError::CapacityExceeded { what: "index", .. }));
        assert_eq!(buf.indices(), &[0, 1, 2]);
    }

    #[test]
    fn set_data_validates_then_replaces() {
        let (mut buf, _) = setup(VertexFormat::XyColor, 3);
        buf.push_vertex(&[9.0; 6]).unwrap();

        assert!(buf.set_data(&[0.0; 7], &[]).is_err());
        assert!(buf.set_data(&[0.0; 24], &[0, 1, 2]).is_err());
        assert!(buf.set_data(&[0.0; 12], &[0, 1, 0, 1]).is_err());
        assert_eq!(buf.vertices(), &[9.0; 6]);

        buf.set_data(&[1.0; 12], &[1, 0]).unwrap();
        assert_eq!(buf.vertex_count(), 2);
        assert_eq!(buf.indices(), &[1, 0]);
    }

    // ── indices / format ──────────────────────────────────────────────────

    #[test]
    fn sequential_indices_cover_written_vertices() {
        let (mut buf, _) = setup(VertexFormat::Xyz, 10);
        buf.add_index(7, 7, 7).unwrap();
        for _ in 0..6 {
            buf.push_vertex(&[0.0; 3]).unwrap();
        }
        buf.index_from_sequential_vertices();
        assert_eq!(buf.indices(), &[0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn set_format_clears_and_keeps_vertex_capacity() {
        let (mut buf, _) = setup(VertexFormat::Xy, 2);
        buf.push_vertex(&[0.0, 0.0]).unwrap();
        assert!(buf.add_index(0, 0, 0).is_err());
        buf.add_indices(&[0]).unwrap();

        buf.set_format(VertexFormat::XyzNormalUvColor);
        assert_eq!(buf.vertex_cursor(), 0);
        assert_eq!(buf.index_cursor(), 0);
        assert_eq!(buf.stride(), 48);

        buf.push_vertex(&[0.0; 12]).unwrap();
        buf.push_vertex(&[1.0; 12]).unwrap();
        assert!(buf.push_vertex(&[2.0; 12]).is_err());
    }

    #[test]
    fn clear_keeps_gpu_state() {
        let (mut buf, state) = setup(VertexFormat::Xy, 4);
        buf.push_vertex(&[1.0, 2.0]).unwrap();
        buf.upload().unwrap();
        let calls = state.borrow().calls().len();

        buf.clear();
        assert!(buf.is_loaded());
        assert_eq!(buf.vertex_cursor(), 0);
        assert_eq!(state.borrow().calls().len(), calls);
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn unit_quad_end_to_end() {
        let (mut buf, state) = setup(VertexFormat::XyUv, 4);
        unit_quad(&mut buf);
        buf.index_from_sequential_vertices();
        buf.upload().unwrap();

        assert_eq!(buf.vertex_cursor(), 16);
        assert_eq!(buf.index_cursor(), 4);
        assert!(buf.is_loaded());

        let gpu = state.borrow();
        let vb = gpu.buffer_contents(buf.vertex_handle().unwrap()).unwrap();
        let ib = gpu.buffer_contents(buf.index_handle().unwrap()).unwrap();
        assert_eq!(vb.len(), 64);
        assert_eq!(ib, bytemuck::cast_slice::<u32, u8>(&[0, 1, 2, 3]));
        assert_eq!(gpu.bound_buffer(BufferTarget::Array), None);
        assert_eq!(gpu.bound_buffer(BufferTarget::Element), None);
    }

    #[test]
    fn upload_is_idempotent() {
        let (mut buf, state) = setup(VertexFormat::Xy, 1);
        buf.upload().unwrap();
        let handles = (buf.vertex_handle(), buf.index_handle());
        buf.upload().unwrap();

        assert_eq!((buf.vertex_handle(), buf.index_handle()), handles);
        assert_eq!(state.borrow().live_buffers(), 2);
    }

    #[test]
    fn failed_upload_leaks_nothing() {
        let (mut buf, state) = setup(VertexFormat::Xy, 1);
        state.borrow_mut().set_buffer_quota(Some(1));

        let err = buf.upload().unwrap_err();
        assert!(matches!(err, RenderError::GpuResourceFailure(_)));
        assert!(!buf.is_loaded());
        assert_eq!(state.borrow().live_buffers(), 0);
    }

    #[test]
    fn failed_reupload_releases_both_buffers() {
        let (mut buf, state) = setup(VertexFormat::XyUv, 4);
        unit_quad(&mut buf);
        buf.index_from_sequential_vertices();
        buf.upload().unwrap();

        let index = buf.index_handle().unwrap();
        // Vertex write succeeds, index write hits a deleted buffer.
        state.borrow_mut().delete_buffer(index);

        let err = buf.reupload().unwrap_err();
        assert!(matches!(err, RenderError::GpuResourceFailure(_)), "{err}");
        assert!(!buf.is_loaded());
        assert_eq!(buf.vertex_handle(), None);
        assert_eq!(state.borrow().live_buffers(), 0);
        assert_eq!(buf.vertex_count(), 4);
    }

    #[test]
    fn release_twice_keeps_staged_data() {
        let (mut buf, state) = setup(VertexFormat::XyUv, 4);
        unit_quad(&mut buf);
        buf.index_from_sequential_vertices();
        buf.upload().unwrap();

        buf.release();
        buf.release();
        assert!(!buf.is_loaded());
        assert_eq!(buf.vertex_cursor(), 16);
        assert_eq!(buf.index_cursor(), 4);
        assert_eq!(state.borrow().live_buffers(), 0);
    }

    #[test]
    fn reupload_requires_loaded() {
        let (mut buf, state) = setup(VertexFormat::Xy, 2);
        buf.push_vertex(&[1.0, 1.0]).unwrap();
        buf.reupload().unwrap();
        assert!(state.borrow().calls().is_empty());

        buf.upload().unwrap();
        buf.clear();
        buf.push_vertex(&[5.0, 6.0]).unwrap();
        buf.set_usage(BufferUsage::Dynamic);
        buf.reupload().unwrap();

        let gpu = state.borrow();
        let vb = buf.vertex_handle().unwrap();
        assert_eq!(gpu.buffer_contents(vb).unwrap(), bytemuck::cast_slice::<f32, u8>(&[5.0, 6.0]));
        assert_eq!(gpu.buffer_usage(vb), Some(BufferUsage::Dynamic));
    }

    #[test]
    fn drop_releases_gpu_buffers() {
        let (mut buf, state) = setup(VertexFormat::Xy, 1);
        buf.upload().unwrap();
        drop(buf);
        assert_eq!(state.borrow().live_buffers(), 0);
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_when_unloaded_is_noop() {
        let (gpu, state) = HeadlessGpu::shared();
        let shader = ShaderProgram::sprite(&gpu).unwrap();
        let buf = GeometryBuffer::new(&gpu, VertexFormat::XyUv, 4);
        state.borrow_mut().clear_calls();

        buf.bind_and_draw(&shader).unwrap();
        assert!(state.borrow().calls().is_empty());
    }

    #[test]
    fn draw_binds_prefix_sum_offsets_and_skips_absent_slots() {
        let (gpu, state) = HeadlessGpu::shared();
        let shader = ShaderProgram::sprite(&gpu).unwrap();
        let mut buf = GeometryBuffer::new(&gpu, VertexFormat::XyUvColor, 3);
        buf.push_vertices(&[0.0; 24]).unwrap();
        buf.index_from_sequential_vertices();
        buf.upload().unwrap();

        shader.bind();
        let tex = crate::texture::Texture::from_pixels(&gpu, &crate::gpu::PixelBuffer::solid(1, 1, [0; 4]))
            .unwrap();
        tex.bind();
        state.borrow_mut().clear_calls();
        buf.bind_and_draw(&shader).unwrap();

        let gpu_state = state.borrow();
        let enables: Vec<_> = gpu_state
            .calls()
            .iter()
            .filter_map(|c| match c {
                GpuCall::EnableAttribute(slot, ptr) => Some((*slot, *ptr)),
                _ => None,
            })
            .collect();
        assert_eq!(
            enables,
            vec![
                (0, AttribPointer { components: 2, stride: 32, offset: 0 }),
                (1, AttribPointer { components: 2, stride: 32, offset: 8 }),
            ]
        );

        let draw = &gpu_state.draws()[0];
        assert_eq!(draw.count, 3);
        assert_eq!(draw.topology, Topology::Triangles);
        assert!(gpu_state.enabled_attributes().is_empty());
    }

    #[test]
    fn slots_cleared_even_when_draw_fails() {
        let (gpu, state) = HeadlessGpu::shared();
        let shader = ShaderProgram::sprite(&gpu).unwrap();
        let mut buf = GeometryBuffer::new(&gpu, VertexFormat::Xy, 4);
        buf.push_vertex(&[0.0, 0.0]).unwrap();
        buf.index_from_sequential_vertices();
        buf.upload().unwrap();
        shader.bind();

        // XY has no texcoord channel, so the sprite program cannot draw it.
        assert!(buf.bind_and_draw(&shader).is_err());

        let gpu_state = state.borrow();
        let disables = gpu_state
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::DisableAttribute(_)))
            .count();
        assert_eq!(disables, 4);
        assert!(gpu_state.enabled_attributes().is_empty());
        assert_eq!(gpu_state.bound_buffer(BufferTarget::Array), None);
        assert_eq!(gpu_state.bound_buffer(BufferTarget::Element), None);
    }

    #[test]
    fn draw_with_no_indices_is_empty_draw() {
        let (gpu, state) = HeadlessGpu::shared();
        let shader = ShaderProgram::sprite(&gpu).unwrap();
        let tex = crate::texture::Texture::from_pixels(&gpu, &crate::gpu::PixelBuffer::solid(1, 1, [0; 4]))
            .unwrap();
        let mut buf = GeometryBuffer::new(&gpu, VertexFormat::XyUv, 4);
        buf.set_topology(Topology::Quads);
        buf.upload().unwrap();

        shader.bind();
        tex.bind();
        buf.bind_and_draw(&shader).unwrap();
        let gpu_state = state.borrow();
        assert_eq!(gpu_state.draws()[0].count, 0);
        assert_eq!(gpu_state.draws()[0].topology, Topology::Quads);
    }
}
