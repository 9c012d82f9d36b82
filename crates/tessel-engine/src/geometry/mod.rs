//! Vertex/index staging and upload.

mod buffer;

pub use buffer::GeometryBuffer;
