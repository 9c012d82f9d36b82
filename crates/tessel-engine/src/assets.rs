//! File-backed asset loading.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{RenderError, Result};
use crate::gpu::PixelBuffer;

/// Decodes an image file into tightly packed RGBA8 pixels, top row first.
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| io_error(path, e))?;

    let image = image::load_from_memory(&bytes).map_err(|e| RenderError::AssetDecodeFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("decoded {} ({width}x{height})", path.display());
    Ok(PixelBuffer::new(width, height, rgba.into_raw()))
}

/// Reads a UTF-8 text asset.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, err: io::Error) -> RenderError {
    match err.kind() {
        io::ErrorKind::NotFound => RenderError::AssetNotFound(PathBuf::from(path)),
        _ => RenderError::AssetDecodeFailed {
            path: path.to_path_buf(),
            reason: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tessel-assets-{}-{name}", std::process::id()))
    }

    #[test]
    fn png_decodes_to_rgba() {
        let path = scratch("two.png");
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        img.save(&path).unwrap();

        let px = load_image(&path).unwrap();
        assert_eq!((px.width, px.height), (2, 1));
        assert_eq!(px.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(px.pixel(1, 0), Some([0, 0, 255, 128]));

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = scratch("nope.png");
        assert!(matches!(load_image(&path), Err(RenderError::AssetNotFound(p)) if p == path));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let path = scratch("garbage.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let err = load_image(&path).unwrap_err();
        assert!(matches!(err, RenderError::AssetDecodeFailed { .. }), "{err}");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn invalid_utf8_text_fails_to_decode() {
        let path = scratch("bad.wgsl");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(read_text(&path), Err(RenderError::AssetDecodeFailed { .. })));
        std::fs::remove_file(path).ok();
    }
}
