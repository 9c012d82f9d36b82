use winit::event::WindowEvent;

use super::ctx::{FrameCtx, LoadCtx};
use crate::coords::Viewport;
use crate::time::FrameTime;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
///
/// Call order: `on_load` once, then `on_update` followed by `on_render` for every
/// frame until exit.
pub trait App {
    /// Creates GPU resources. An error aborts the runtime.
    fn on_load(&mut self, ctx: &mut LoadCtx<'_>) -> anyhow::Result<()>;

    /// Advances the simulation by `time.dt` seconds.
    fn on_update(&mut self, time: FrameTime) -> AppControl {
        let _ = time;
        AppControl::Continue
    }

    /// Records draws for the current frame. The runtime presents afterwards.
    fn on_render(&mut self, ctx: &mut FrameCtx<'_>) -> anyhow::Result<()>;

    fn on_resize(&mut self, viewport: Viewport) {
        let _ = viewport;
    }

    /// Raw window events, before the runtime handles them.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }
}
