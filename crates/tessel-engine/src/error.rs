use std::path::PathBuf;

use crate::gpu::ShaderStage;
use crate::vertex::VertexFormat;

/// Failure taxonomy of the rendering core.
///
/// Construction-time failures (shaders, textures, GPU buffers) abort object creation.
/// Append failures (`FormatMismatch`, `CapacityExceeded`) are local: the staged
/// geometry is left exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("vertex data does not match format {format}: expected {expected} floats, got {got}")]
    FormatMismatch {
        format: VertexFormat,
        expected: usize,
        got: usize,
    },

    #[error("{what} capacity exceeded: capacity {capacity}, requested {requested}")]
    CapacityExceeded {
        what: &'static str,
        capacity: usize,
        requested: usize,
    },

    #[error("{stage} shader failed to compile:\n{log}")]
    ShaderCompileFailed { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {0}")]
    ShaderLinkFailed(String),

    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    #[error("failed to decode asset {}: {reason}", path.display())]
    AssetDecodeFailed { path: PathBuf, reason: String },

    #[error("GPU resource failure: {0}")]
    GpuResourceFailure(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl RenderError {
    pub(crate) fn gpu(msg: impl Into<String>) -> Self {
        Self::GpuResourceFailure(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_failure_carries_diagnostic() {
        let err = RenderError::ShaderCompileFailed {
            stage: ShaderStage::Fragment,
            log: "expected ';'".into(),
        };
        let text = err.to_string();
        assert!(text.starts_with("fragment shader"));
        assert!(text.contains("expected ';'"));
    }

    #[test]
    fn mismatch_names_format() {
        let err = RenderError::FormatMismatch {
            format: VertexFormat::XyUv,
            expected: 4,
            got: 3,
        };
        assert_eq!(
            err.to_string(),
            "vertex data does not match format XY_UV: expected 4 floats, got 3"
        );
    }

    #[test]
    fn not_found_shows_path() {
        let err = RenderError::AssetNotFound(PathBuf::from("assets/missing.png"));
        assert!(err.to_string().ends_with("assets/missing.png"));
    }
}
