use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Vec2;
use tessel_engine::coords::Camera2d;
use tessel_engine::core::{App, AppControl, FrameCtx, LoadCtx};
use tessel_engine::gpu::GpuContext;
use tessel_engine::motion::PingPong;
use tessel_engine::shader::ShaderProgram;
use tessel_engine::sprite::Sprite;
use tessel_engine::texture::Texture;
use tessel_engine::time::FrameTime;

use crate::config::DemoConfig;

const KITTY_START: Vec2 = Vec2::new(0.0, 0.7);
const KITTY_SIZE: Vec2 = Vec2::new(0.3, 0.3);

struct Sprites {
    background: Sprite,
    kitty: Sprite,
}

/// Full-view background with a sprite bouncing along the top.
pub struct SpriteScene {
    config: DemoConfig,
    camera: Camera2d,
    motion: PingPong,
    sprites: Option<Sprites>,
}

impl SpriteScene {
    pub fn new(config: DemoConfig) -> Self {
        let motion = PingPong::new(config.velocity);
        Self {
            config,
            camera: Camera2d::default(),
            motion,
            sprites: None,
        }
    }

    fn load_sprites(&self, gpu: &GpuContext) -> Result<Sprites> {
        let shader = match &self.config.shader_dir {
            Some(dir) => ShaderProgram::load(gpu, dir, "sprite")
                .with_context(|| format!("loading sprite shader from {}", dir.display()))?,
            None => ShaderProgram::sprite(gpu).context("building built-in sprite shader")?,
        };
        let shader = Rc::new(shader);

        let texture = |name: &str| -> Result<Rc<Texture>> {
            let path = self.config.assets_dir.join(name);
            let texture = Texture::load(gpu, &path)
                .with_context(|| format!("loading texture {}", path.display()))?;
            Ok(Rc::new(texture))
        };

        Ok(Sprites {
            background: Sprite::new(gpu, Vec2::ZERO, Vec2::ONE, shader.clone(), texture("background.png")?)?,
            kitty: Sprite::new(gpu, KITTY_START, KITTY_SIZE, shader, texture("kitty.png")?)?,
        })
    }
}

impl App for SpriteScene {
    fn on_load(&mut self, ctx: &mut LoadCtx<'_>) -> Result<()> {
        self.sprites = Some(self.load_sprites(ctx.gpu)?);
        log::info!("scene loaded ({}x{})", ctx.viewport.width, ctx.viewport.height);
        Ok(())
    }

    fn on_update(&mut self, time: FrameTime) -> AppControl {
        if let Some(sprites) = &mut self.sprites {
            self.motion.apply(&mut sprites.kitty, time.dt);
        }
        AppControl::Continue
    }

    fn on_render(&mut self, _ctx: &mut FrameCtx<'_>) -> Result<()> {
        let Some(sprites) = &self.sprites else { return Ok(()) };
        let view_projection = self.camera.view_projection();

        // Painter's order: background first.
        sprites.background.render(&view_projection)?;
        sprites.kitty.render(&view_projection)?;
        Ok(())
    }
}
