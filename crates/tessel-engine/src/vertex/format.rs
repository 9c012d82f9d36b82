use core::fmt;

/// Size of one vertex component in bytes. All channels are `f32`.
pub const COMPONENT_SIZE: usize = std::mem::size_of::<f32>();

/// A single attribute channel of a vertex.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Channel {
    Position2,
    Position3,
    Normal,
    TexCoord,
    Color,
}

impl Channel {
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            Channel::Position2 => 2,
            Channel::Position3 => 3,
            Channel::Normal => 3,
            Channel::TexCoord => 2,
            Channel::Color => 4,
        }
    }

    #[inline]
    pub const fn byte_size(self) -> usize {
        self.components() * COMPONENT_SIZE
    }

    #[inline]
    pub const fn semantic(self) -> Semantic {
        match self {
            Channel::Position2 | Channel::Position3 => Semantic::Position,
            Channel::Normal => Semantic::Normal,
            Channel::TexCoord => Semantic::TexCoord,
            Channel::Color => Semantic::Color,
        }
    }
}

/// Attribute meaning a shader program resolves to a slot by name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Semantic {
    Position,
    Normal,
    TexCoord,
    Color,
}

impl Semantic {
    /// Every semantic, in slot-table order.
    pub const ALL: [Semantic; 4] = [
        Semantic::Position,
        Semantic::Normal,
        Semantic::TexCoord,
        Semantic::Color,
    ];

    /// Shader input name this semantic is looked up by.
    #[inline]
    pub const fn attribute_name(self) -> &'static str {
        match self {
            Semantic::Position => "vertex_position",
            Semantic::Normal => "vertex_normal",
            Semantic::TexCoord => "vertex_texcoord",
            Semantic::Color => "vertex_color",
        }
    }
}

/// Number of fixed attribute slots cleared after every draw.
pub const FIXED_SLOTS: u32 = Semantic::ALL.len() as u32;

/// Closed catalog of vertex layouts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Xy,
    XyColor,
    XyUv,
    XyUvColor,
    Xyz,
    XyzColor,
    XyzUv,
    XyzUvColor,
    XyzNormalUv,
    XyzNormalUvColor,
}

use Channel::*;

const XY: &[Channel] = &[Position2];
const XY_COLOR: &[Channel] = &[Position2, Color];
const XY_UV: &[Channel] = &[Position2, TexCoord];
const XY_UV_COLOR: &[Channel] = &[Position2, TexCoord, Color];
const XYZ: &[Channel] = &[Position3];
const XYZ_COLOR: &[Channel] = &[Position3, Color];
const XYZ_UV: &[Channel] = &[Position3, TexCoord];
const XYZ_UV_COLOR: &[Channel] = &[Position3, TexCoord, Color];
const XYZ_NORMAL_UV: &[Channel] = &[Position3, Normal, TexCoord];
const XYZ_NORMAL_UV_COLOR: &[Channel] = &[Position3, Normal, TexCoord, Color];

impl VertexFormat {
    pub const ALL: [VertexFormat; 10] = [
        VertexFormat::Xy,
        VertexFormat::XyColor,
        VertexFormat::XyUv,
        VertexFormat::XyUvColor,
        VertexFormat::Xyz,
        VertexFormat::XyzColor,
        VertexFormat::XyzUv,
        VertexFormat::XyzUvColor,
        VertexFormat::XyzNormalUv,
        VertexFormat::XyzNormalUvColor,
    ];

    /// Ordered channel list of this format.
    pub const fn channels(self) -> &'static [Channel] {
        match self {
            VertexFormat::Xy => XY,
            VertexFormat::XyColor => XY_COLOR,
            VertexFormat::XyUv => XY_UV,
            VertexFormat::XyUvColor => XY_UV_COLOR,
            VertexFormat::Xyz => XYZ,
            VertexFormat::XyzColor => XYZ_COLOR,
            VertexFormat::XyzUv => XYZ_UV,
            VertexFormat::XyzUvColor => XYZ_UV_COLOR,
            VertexFormat::XyzNormalUv => XYZ_NORMAL_UV,
            VertexFormat::XyzNormalUvColor => XYZ_NORMAL_UV_COLOR,
        }
    }

    /// Floats per vertex.
    pub fn attribute_count(self) -> usize {
        self.channels().iter().map(|c| c.components()).sum()
    }

    /// Bytes per vertex.
    #[inline]
    pub fn stride(self) -> usize {
        self.attribute_count() * COMPONENT_SIZE
    }

    /// Channels with their byte offset inside one vertex.
    pub fn layout(self) -> impl Iterator<Item = ChannelLayout> {
        self.channels().iter().scan(0usize, |offset, &channel| {
            let entry = ChannelLayout {
                channel,
                components: channel.components(),
                offset: *offset,
            };
            *offset += channel.byte_size();
            Some(entry)
        })
    }

    pub const fn name(self) -> &'static str {
        match self {
            VertexFormat::Xy => "XY",
            VertexFormat::XyColor => "XY_COLOR",
            VertexFormat::XyUv => "XY_UV",
            VertexFormat::XyUvColor => "XY_UV_COLOR",
            VertexFormat::Xyz => "XYZ",
            VertexFormat::XyzColor => "XYZ_COLOR",
            VertexFormat::XyzUv => "XYZ_UV",
            VertexFormat::XyzUvColor => "XYZ_UV_COLOR",
            VertexFormat::XyzNormalUv => "XYZ_NORMAL_UV",
            VertexFormat::XyzNormalUvColor => "XYZ_NORMAL_UV_COLOR",
        }
    }
}

impl fmt::Display for VertexFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of [`VertexFormat::layout`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelLayout {
    pub channel: Channel,
    pub components: usize,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
}
