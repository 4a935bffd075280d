//! Validates the viewer's WGSL with naga, and checks that the Rust-side
//! vertex layouts match what the shader expects.

use evergreen::viewer::{Vertex, SHADER_SOURCE};
use evergreen::InstanceRaw;

fn validate_wgsl(code: &str) -> Result<naga::Module, String> {
    let module = naga::front::wgsl::parse_str(code).map_err(|e| format!("WGSL parse error: {:?}", e))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(module)
}

#[test]
fn test_shader_validates() {
    if let Err(e) = validate_wgsl(SHADER_SOURCE) {
        panic!("{}", e);
    }
}

#[test]
fn test_shader_entry_points() {
    let module = validate_wgsl(SHADER_SOURCE).unwrap();
    let names: Vec<&str> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"vs_main"));
    assert!(names.contains(&"fs_main"));
}

#[test]
fn test_vertex_layouts() {
    // Two vec3 attributes.
    assert_eq!(std::mem::size_of::<Vertex>(), 24);
    // Four matrix columns plus a color, five vec4 attributes.
    assert_eq!(std::mem::size_of::<InstanceRaw>(), 5 * 16);
}
