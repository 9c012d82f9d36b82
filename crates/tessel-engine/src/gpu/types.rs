use core::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Opaque GPU buffer handle.
    BufferHandle
);
handle!(
    /// Opaque compiled shader stage handle.
    ShaderHandle
);
handle!(
    /// Opaque linked program handle.
    ProgramHandle
);
handle!(
    /// Opaque texture handle.
    TextureHandle
);

/// Uniform slot of a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub program: ProgramHandle,
    pub binding: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Buffer binding point.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// `u32` index data.
    Element,
}

/// Update-frequency hint passed along with buffer contents.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    /// Rewritten roughly every frame.
    #[default]
    Stream,
    /// Written once.
    Static,
    /// Rewritten occasionally.
    Dynamic,
}

/// How indices are assembled into primitives.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Topology {
    #[default]
    Triangles,
    /// Four indices per quad, wound `a b c d`.
    Quads,
}

impl Topology {
    pub const fn indices_per_primitive(self) -> u32 {
        match self {
            Topology::Triangles => 3,
            Topology::Quads => 4,
        }
    }
}

/// Interleaved `f32` attribute source inside the bound array buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct AttribPointer {
    pub components: u32,
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// Byte offset of the first component.
    pub offset: u32,
}

/// Decoded image: tightly packed RGBA8 rows, top row first.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), width as usize * height as usize * 4);
        Self { width, height, rgba }
    }

    /// Single-color image.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        Self::new(width, height, rgba.repeat(count))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let p = self.rgba.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_fills_every_pixel() {
        let px = PixelBuffer::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(px.rgba.len(), 24);
        assert_eq!(px.pixel(2, 1), Some([1, 2, 3, 4]));
        assert_eq!(px.pixel(3, 0), None);
    }

    #[test]
    fn quads_take_four_indices() {
        assert_eq!(Topology::Quads.indices_per_primitive(), 4);
        assert_eq!(Topology::default(), Topology::Triangles);
        assert_eq!(BufferUsage::default(), BufferUsage::Stream);
    }
}
