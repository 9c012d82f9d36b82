use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::coords::Viewport;
use crate::core::{App, AppControl, FrameCtx, LoadCtx};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::gpu::{GpuContext, WgpuGpu};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Background every frame is cleared to.
    pub clear_color: wgpu::Color,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "tessel".to_string(),
            initial_size: LogicalSize::new(800.0, 800.0),
            clear_color: wgpu::Color {
                r: 0.392,
                g: 0.584,
                b: 0.929,
                a: 1.0,
            },
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until the window closes, Escape is
    /// pressed or a callback asks to exit.
    ///
    /// Errors from window/GPU setup and from `on_load`/`on_render` end the loop and
    /// are returned here.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// The window plus the resource backend the app's [`GpuContext`] drives.
struct WindowSlot {
    entry: WindowEntry,
    backend: Rc<RefCell<WgpuGpu>>,
    context: GpuContext,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    slot: Option<WindowSlot>,
    failure: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            slot: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn create_slot(&self, event_loop: &ActiveEventLoop) -> Result<WindowSlot> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;
        log::info!("window `{}` created ({:?})", self.config.title, window.inner_size());

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let backend = entry.with_gpu(|gpu| {
            WgpuGpu::new(gpu.device().clone(), gpu.queue().clone(), gpu.surface_format())
        });
        let backend = Rc::new(RefCell::new(backend));
        let context = GpuContext::from_rc(backend.clone());

        Ok(WindowSlot {
            entry,
            backend,
            context,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let Some(slot) = self.slot.as_mut() else { return };
        slot.entry.with_gpu_mut(|gpu| gpu.resize(size));
        slot.entry.with_clock_mut(|clock| clock.reset());
        self.app.on_resize(Viewport::from(size));
        slot.entry.with_window(|w| w.request_redraw());
    }

    /// Update, render and present one frame.
    fn redraw(&mut self) -> Result<AppControl> {
        let Some(slot) = self.slot.as_mut() else {
            return Ok(AppControl::Continue);
        };
        let app = &mut self.app;
        let clear = self.config.clear_color;

        slot.entry.with_mut(|fields| -> Result<AppControl> {
            let time = fields.clock.tick();
            if app.on_update(time) == AppControl::Exit {
                return Ok(AppControl::Exit);
            }

            let viewport = Viewport::from(fields.gpu.size());
            if !viewport.is_valid() {
                return Ok(AppControl::Continue);
            }

            let mut ctx = FrameCtx {
                gpu: &slot.context,
                viewport,
                time,
            };
            let rendered = app.on_render(&mut ctx);
            let plan = slot.backend.borrow_mut().take_frame();
            rendered.context("frame render failed")?;

            let mut frame = match fields.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    return match fields.gpu.handle_surface_error(err) {
                        SurfaceErrorAction::Fatal => Err(anyhow::anyhow!("surface is unusable")),
                        _ => Ok(AppControl::Continue),
                    };
                }
            };

            {
                let mut pass = frame.begin_pass(clear);
                plan.encode(&mut pass);
            }

            fields.window.pre_present_notify();
            fields.gpu.submit(frame);
            log::trace!("frame {} presented with {} draws", time.frame_index, plan.len());
            Ok(AppControl::Continue)
        })
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.slot.is_some() {
            return;
        }

        let slot = match self.create_slot(event_loop) {
            Ok(slot) => slot,
            Err(err) => return self.fail(event_loop, err),
        };

        let mut ctx = LoadCtx {
            gpu: &slot.context,
            viewport: Viewport::from(slot.entry.borrow_gpu().size()),
        };
        let loaded = self.app.on_load(&mut ctx).context("scene failed to load");
        slot.backend.borrow_mut().take_frame();
        self.slot = Some(slot);

        match loaded {
            Ok(()) => {
                if let Some(slot) = &self.slot {
                    slot.entry.with_window(|w| w.request_redraw());
                }
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: the scene animates every frame.
        if let Some(slot) = &self.slot {
            slot.entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.app.on_window_event(&event) == AppControl::Exit {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput { event: key, .. }
                if key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                log::info!("escape pressed; exiting");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => self.resize(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self
                    .slot
                    .as_ref()
                    .map(|slot| slot.entry.with_window(|w| w.inner_size()));
                if let Some(size) = size {
                    self.resize(size);
                }
            }

            WindowEvent::RedrawRequested => match self.redraw() {
                Ok(AppControl::Continue) => {}
                Ok(AppControl::Exit) => event_loop.exit(),
                Err(err) => self.fail(event_loop, err),
            },

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        log::debug!("event loop exiting");
    }
}
