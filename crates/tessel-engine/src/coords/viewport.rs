use winit::dpi::PhysicalSize;

/// Drawable size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// `false` for minimized windows and other degenerate sizes.
    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

impl From<PhysicalSize<u32>> for Viewport {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width as f32, size.height as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_sizes_are_invalid() {
        assert!(Viewport::new(800.0, 400.0).is_valid());
        assert!(!Viewport::new(0.0, 400.0).is_valid());
        assert!(!Viewport::new(f32::NAN, 1.0).is_valid());
    }

    #[test]
    fn from_physical_size() {
        let vp = Viewport::from(PhysicalSize::new(1024u32, 768u32));
        assert_eq!(vp, Viewport::new(1024.0, 768.0));
        assert!(!Viewport::from(PhysicalSize::new(0u32, 0u32)).is_valid());
    }
}
