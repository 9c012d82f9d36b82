//! WGSL front end shared by both backends.
//!
//! "Compiling" a stage parses and validates it with naga and extracts its
//! interface; "linking" checks that two stage interfaces fit together and follow
//! the binding convention every backend understands:
//!
//! - group 0: `mat4x4<f32>` uniforms, any binding
//! - group 1: binding 0 is a `texture_2d`, binding 1 its sampler

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, ImageDimension, Module, Scalar, Type, TypeInner, VectorSize};

use super::ShaderStage;

pub const UNIFORM_GROUP: u32 = 0;
pub const TEXTURE_GROUP: u32 = 1;
pub const TEXTURE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;

/// A location-bound stage input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInput {
    pub name: String,
    pub location: u32,
    /// Scalar components (1 for scalars, 2..=4 for vectors).
    pub components: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    Mat4Uniform,
    OtherUniform,
    Texture2d,
    OtherTexture,
    Sampler,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    pub kind: ResourceKind,
}

/// Interface of one validated shader stage.
#[derive(Debug, Clone)]
pub struct StageInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<StageInput>,
    pub outputs: Vec<u32>,
    pub resources: Vec<Resource>,
}

/// Interface of a linked vertex + fragment pair.
#[derive(Debug, Clone)]
pub struct ProgramInterface {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Vertex attributes, sorted by location.
    pub attributes: Vec<StageInput>,
    /// Group 0 matrix uniforms, sorted by binding.
    pub uniforms: Vec<Resource>,
    /// `true` if group 1 carries a texture + sampler pair.
    pub textured: bool,
}

impl ProgramInterface {
    pub fn attribute(&self, name: &str) -> Option<&StageInput> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn uniform(&self, name: &str) -> Option<&Resource> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}

/// Parses and validates one stage. Errors carry the formatted diagnostic.
pub fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };

    let mut entry_points = module.entry_points.iter().filter(|ep| ep.stage == wanted);
    let ep = entry_points
        .next()
        .ok_or_else(|| format!("no @{stage} entry point found"))?;
    if entry_points.next().is_some() {
        log::debug!("multiple @{stage} entry points; using `{}`", ep.name);
    }

    let mut inputs = Vec::new();
    for arg in &ep.function.arguments {
        collect_locations(&module, arg.name.as_deref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }
    inputs.sort_by_key(|i| i.location);

    let mut outputs = Vec::new();
    if let Some(result) = &ep.function.result {
        collect_locations(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }
    let mut outputs: Vec<u32> = outputs.into_iter().map(|o| o.location).collect();
    outputs.sort_unstable();

    Ok(StageInterface {
        stage,
        entry_point: ep.name.clone(),
        inputs,
        outputs,
        resources: collect_resources(&module),
    })
}

/// Checks that `vertex` feeds `fragment` and that resources follow the binding
/// convention.
pub fn link(vertex: &StageInterface, fragment: &StageInterface) -> Result<ProgramInterface, String> {
    if vertex.stage != ShaderStage::Vertex || fragment.stage != ShaderStage::Fragment {
        return Err(format!(
            "expected a vertex and a fragment stage, got {} and {}",
            vertex.stage, fragment.stage
        ));
    }

    for input in &fragment.inputs {
        if !vertex.outputs.contains(&input.location) {
            return Err(format!(
                "fragment input `{}` at @location({}) is not written by the vertex stage",
                input.name, input.location
            ));
        }
    }

    let mut resources: Vec<Resource> = Vec::new();
    for res in vertex.resources.iter().chain(&fragment.resources) {
        match resources
            .iter()
            .find(|r| r.group == res.group && r.binding == res.binding)
        {
            Some(existing) if existing.kind != res.kind => {
                return Err(format!(
                    "@group({}) @binding({}) is declared with different types in the two stages",
                    res.group, res.binding
                ));
            }
            Some(_) => {}
            None => resources.push(res.clone()),
        }
    }

    let mut uniforms = Vec::new();
    let mut texture = false;
    let mut sampler = false;
    for res in resources {
        match (res.group, res.binding, res.kind) {
            (UNIFORM_GROUP, _, ResourceKind::Mat4Uniform) => uniforms.push(res),
            (TEXTURE_GROUP, TEXTURE_BINDING, ResourceKind::Texture2d) => texture = true,
            (TEXTURE_GROUP, SAMPLER_BINDING, ResourceKind::Sampler) => sampler = true,
            _ => {
                return Err(format!(
                    "unsupported resource `{}` at @group({}) @binding({}) ({:?})",
                    res.name, res.group, res.binding, res.kind
                ));
            }
        }
    }
    if texture != sampler {
        return Err("a texture_2d at @group(1) @binding(0) needs a sampler at @binding(1)".into());
    }
    uniforms.sort_by_key(|u| u.binding);

    Ok(ProgramInterface {
        vertex_entry: vertex.entry_point.clone(),
        fragment_entry: fragment.entry_point.clone(),
        attributes: vertex.inputs.clone(),
        uniforms,
        textured: texture,
    })
}

fn collect_locations(
    module: &Module,
    name: Option<&str>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<StageInput>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(StageInput {
            name: name.unwrap_or_default().to_string(),
            location: *location,
            components: components(&module.types[ty].inner),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(
                        module,
                        member.name.as_deref(),
                        member.ty,
                        member.binding.as_ref(),
                        out,
                    );
                }
            }
        }
    }
}

fn components(inner: &TypeInner) -> u32 {
    match inner {
        TypeInner::Scalar(_) => 1,
        TypeInner::Vector { size, .. } => *size as u32,
        _ => 0,
    }
}

fn collect_resources(module: &Module) -> Vec<Resource> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            let kind = match (var.space, &module.types[var.ty].inner) {
                (
                    AddressSpace::Uniform,
                    TypeInner::Matrix {
                        columns: VectorSize::Quad,
                        rows: VectorSize::Quad,
                        scalar,
                    },
                ) if *scalar == Scalar::F32 => ResourceKind::Mat4Uniform,
                (AddressSpace::Uniform, _) => ResourceKind::OtherUniform,
                (
                    AddressSpace::Handle,
                    TypeInner::Image {
                        dim: ImageDimension::D2,
                        arrayed: false,
                        ..
                    },
                ) => ResourceKind::Texture2d,
                (AddressSpace::Handle, TypeInner::Image { .. }) => ResourceKind::OtherTexture,
                (AddressSpace::Handle, TypeInner::Sampler { .. }) => ResourceKind::Sampler,
                _ => ResourceKind::Other,
            };
            Some(Resource {
                name: var.name.clone().unwrap_or_default(),
                group: rb.group,
                binding: rb.binding,
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::ShaderSource;

    const VS_COLOR: &str = r#"
struct VsOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) vertex_position: vec3<f32>, @location(3) vertex_color: vec4<f32>) -> VsOut {
    var out: VsOut;
    out.clip = vec4<f32>(vertex_position, 1.0);
    out.color = vertex_color;
    return out;
}
"#;

    const FS_COLOR: &str = r#"
@fragment
fn fs_main(@location(0) color: vec4<f32>) -> @location(0) vec4<f32> {
    return color;
}
"#;

    const FS_NEEDS_UV: &str = r#"
@fragment
fn fs_main(@location(2) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn vertex_inputs_are_reflected() {
        let vs = compile(ShaderStage::Vertex, VS_COLOR).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        assert_eq!(
            vs.inputs,
            vec![
                StageInput { name: "vertex_position".into(), location: 0, components: 3 },
                StageInput { name: "vertex_color".into(), location: 3, components: 4 },
            ]
        );
        assert_eq!(vs.outputs, vec![0]);
    }

    #[test]
    fn syntax_error_yields_diagnostic() {
        let err = compile(ShaderStage::Vertex, "@vertex fn vs_main( -> {").unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_entry_point_is_reported() {
        let err = compile(ShaderStage::Vertex, FS_COLOR).unwrap_err();
        assert!(err.contains("@vertex"), "{err}");
    }

    #[test]
    fn builtin_sprite_shader_resources() {
        let src = ShaderSource::sprite();
        let vs = compile(ShaderStage::Vertex, &src.vertex).unwrap();
        let fs = compile(ShaderStage::Fragment, &src.fragment).unwrap();

        assert!(vs.resources.iter().any(|r| r.name == "mvp" && r.kind == ResourceKind::Mat4Uniform));
        assert!(fs.resources.iter().any(|r| r.kind == ResourceKind::Texture2d));
        assert!(fs.resources.iter().any(|r| r.kind == ResourceKind::Sampler));
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn link_matches_locations() {
        let vs = compile(ShaderStage::Vertex, VS_COLOR).unwrap();
        let fs = compile(ShaderStage::Fragment, FS_COLOR).unwrap();
        let program = link(&vs, &fs).unwrap();
        assert_eq!(program.attribute("vertex_color").map(|a| a.location), Some(3));
        assert!(program.attribute("vertex_texcoord").is_none());
        assert!(!program.textured);
    }

    #[test]
    fn link_rejects_unfed_fragment_input() {
        let vs = compile(ShaderStage::Vertex, VS_COLOR).unwrap();
        let fs = compile(ShaderStage::Fragment, FS_NEEDS_UV).unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("@location(2)"), "{err}");
    }

    #[test]
    fn link_rejects_swapped_stages() {
        let vs = compile(ShaderStage::Vertex, VS_COLOR).unwrap();
        let fs = compile(ShaderStage::Fragment, FS_COLOR).unwrap();
        assert!(link(&fs, &vs).is_err());
    }

    #[test]
    fn link_rejects_uniform_outside_group_zero() {
        let vs_src = r#"
@group(2) @binding(0) var<uniform> mvp: mat4x4<f32>;

@vertex
fn vs_main(@location(0) vertex_position: vec2<f32>) -> @builtin(position) vec4<f32> {
    return mvp * vec4<f32>(vertex_position, 0.0, 1.0);
}
"#;
        let fs_src = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;
        let vs = compile(ShaderStage::Vertex, vs_src).unwrap();
        let fs = compile(ShaderStage::Fragment, fs_src).unwrap();
        let err = link(&vs, &fs).unwrap_err();
        assert!(err.contains("mvp"), "{err}");
    }
}
