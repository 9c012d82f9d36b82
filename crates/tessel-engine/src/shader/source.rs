use std::path::Path;

use crate::assets;
use crate::error::Result;

/// WGSL source text for a vertex + fragment pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: String,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSource {
    pub fn new(label: impl Into<String>, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Built-in textured sprite shader (`XY_UV` vertices, `mvp` uniform).
    pub fn sprite() -> Self {
        Self::new(
            "sprite",
            include_str!("shaders/sprite.vert.wgsl"),
            include_str!("shaders/sprite.frag.wgsl"),
        )
    }

    /// Reads `<dir>/<name>.vert.wgsl` and `<dir>/<name>.frag.wgsl`.
    pub fn load(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let vertex = assets::read_text(dir.join(format!("{name}.vert.wgsl")))?;
        let fragment = assets::read_text(dir.join(format!("{name}.frag.wgsl")))?;
        log::debug!("loaded shader sources `{name}` from {}", dir.display());
        Ok(Self::new(name, vertex, fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;

    fn scratch_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("tessel-shader-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_reads_both_stages() {
        let dir = scratch_dir("both");
        std::fs::write(dir.join("flat.vert.wgsl"), "// vs").unwrap();
        std::fs::write(dir.join("flat.frag.wgsl"), "// fs").unwrap();

        let src = ShaderSource::load(&dir, "flat").unwrap();
        assert_eq!(src.label, "flat");
        assert_eq!(src.vertex, "// vs");
        assert_eq!(src.fragment, "// fs");

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn missing_stage_is_not_found() {
        let dir = scratch_dir("missing");
        std::fs::write(dir.join("half.vert.wgsl"), "// vs").unwrap();

        match ShaderSource::load(&dir, "half") {
            Err(RenderError::AssetNotFound(path)) => {
                assert!(path.ends_with("half.frag.wgsl"));
            }
            other => panic!("expected AssetNotFound, got {other:?}"),
        }

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn builtin_sprite_names_its_inputs() {
        let src = ShaderSource::sprite();
        assert!(src.vertex.contains("vertex_position"));
        assert!(src.vertex.contains("vertex_texcoord"));
        assert!(src.fragment.contains("textureSample"));
    }
}
