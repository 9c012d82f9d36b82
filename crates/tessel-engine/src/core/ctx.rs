use crate::coords::Viewport;
use crate::gpu::GpuContext;
use crate::time::FrameTime;

/// Passed to [`App::on_load`](super::App::on_load).
pub struct LoadCtx<'a> {
    pub gpu: &'a GpuContext,
    pub viewport: Viewport,
}

/// Passed to [`App::on_render`](super::App::on_render) once per frame.
pub struct FrameCtx<'a> {
    pub gpu: &'a GpuContext,
    pub viewport: Viewport,
    pub time: FrameTime,
}
