use std::path::Path;

use crate::assets;
use crate::error::Result;
use crate::gpu::{GpuContext, PixelBuffer, TextureHandle};

/// A 2D RGBA texture sampled with nearest filtering.
#[derive(Debug)]
pub struct Texture {
    gpu: GpuContext,
    handle: Option<TextureHandle>,
    width: u32,
    height: u32,
}

impl Texture {
    pub fn from_pixels(gpu: &GpuContext, pixels: &PixelBuffer) -> Result<Self> {
        let handle = gpu.with(|api| api.create_texture(pixels))?;
        Ok(Self {
            gpu: gpu.clone(),
            handle: Some(handle),
            width: pixels.width,
            height: pixels.height,
        })
    }

    /// Decodes an image file and uploads it.
    pub fn load(gpu: &GpuContext, path: impl AsRef<Path>) -> Result<Self> {
        let pixels = assets::load_image(path.as_ref())?;
        let texture = Self::from_pixels(gpu, &pixels)?;
        log::info!(
            "loaded texture {} ({}x{})",
            path.as_ref().display(),
            texture.width,
            texture.height
        );
        Ok(texture)
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    pub fn bind(&self) {
        if let Some(handle) = self.handle {
            self.gpu.with(|api| api.bind_texture(Some(handle)));
        }
    }

    pub fn unbind(&self) {
        self.gpu.with(|api| api.bind_texture(None));
    }

    /// Frees the GPU texture. Later calls do nothing.
    pub fn release(&mut self) {
        let Some(handle) = self.handle.take() else { return };
        if self.gpu.try_with(|api| api.delete_texture(handle)).is_none() {
            log::warn!("GPU busy; leaked texture {handle:?}");
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.release();
    }
}
