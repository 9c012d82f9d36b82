//! Vertex layout catalog.
//!
//! Every format is a declarative channel table; strides and byte offsets are
//! derived from it. Channels are tightly packed `f32` components in table order.

mod format;

pub use format::{
    Channel, ChannelLayout, Semantic, VertexFormat, COMPONENT_SIZE, FIXED_SLOTS,
};
