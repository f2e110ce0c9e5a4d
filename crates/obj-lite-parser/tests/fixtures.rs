// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixture-scale parses: generated exporter-style files, filesystem and
//! archive resolution.

use approx::assert_relative_eq;
use obj_lite_model::{MeshSource, MeshType, Model, ModelLoader, ParseError, ResourceResolver};
use obj_lite_parser::{
    normalize, parse_str, FsResolver, IndexMode, MemoryResolver, WavefrontParser, ZipResolver,
};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

// =============================================================================
// Fixture Generation
// =============================================================================

const CUBE_POSITIONS: usize = 507;
const CUBE_NORMALS: usize = 942;
const CUBE_TRIANGLES: usize = 1936;

/// Triangle mesh in the layout Blender exports: one object, positions,
/// normals, then `v//n` faces cycling through both pools.
fn cube_fixture() -> String {
    let mut out = String::from("# Blender v2.79 (sub 0) OBJ File\no Cube_Cube.001\n");
    for i in 0..CUBE_POSITIONS {
        let t = i as f32 / CUBE_POSITIONS as f32;
        writeln!(out, "v {:.6} {:.6} {:.6}", t.cos(), t.sin(), t - 0.5).unwrap();
    }
    for i in 0..CUBE_NORMALS {
        let t = i as f32 / CUBE_NORMALS as f32;
        writeln!(out, "vn {:.4} {:.4} 0.0000", t.cos(), t.sin()).unwrap();
    }
    out.push_str("s off\n");
    for k in 0..CUBE_TRIANGLES {
        out.push('f');
        for j in 0..3 {
            let r = 3 * k + j;
            write!(out, " {}//{}", r % CUBE_POSITIONS + 1, r % CUBE_NORMALS + 1).unwrap();
        }
        out.push('\n');
    }
    out
}

/// Append one polyline object whose points are joined by two-point `l`
/// segments; `first` is the 1-based index of the object's first point.
fn push_path(out: &mut String, name: &str, points: usize, first: usize) {
    writeln!(out, "o {name}").unwrap();
    for i in 0..points {
        writeln!(out, "v {}.0 {}.0 0.0", i, i % 3).unwrap();
    }
    for i in 0..points - 1 {
        writeln!(out, "l {} {}", first + i, first + i + 1).unwrap();
    }
}

/// Two curve objects with file-global indices
fn nurbs_fixture() -> String {
    let mut out = String::from("# Blender v2.79 (sub 0) OBJ File\n");
    push_path(&mut out, "NurbsPath.001", 48, 1);
    push_path(&mut out, "NurbsPath", 120, 49);
    out
}

// =============================================================================
// Fixture Properties
// =============================================================================

#[test]
fn test_cube_vertices_follow_references() {
    let model = parse_str(&cube_fixture()).unwrap();
    assert_eq!(model.mesh_count(), 1);

    let mesh = model.mesh("Cube_Cube.001").unwrap();
    assert_eq!(mesh.mesh_type(), MeshType::Polygon);
    assert_eq!(mesh.vertex_count(), CUBE_TRIANGLES * 3);
    assert_ne!(mesh.vertex_count(), CUBE_POSITIONS);
    assert_eq!(mesh.primitive_count(), CUBE_TRIANGLES);
    assert_eq!(mesh.indices().len(), mesh.vertex_count());
    assert_eq!(mesh.triangle_indices().len(), CUBE_TRIANGLES * 3);
    assert!(mesh.vertices().iter().all(|v| v.normal.is_some()));
    assert!(!mesh.has_tex_coords());
}

#[test]
fn test_cube_reaches_first_and_last_declarations() {
    let model = parse_str(&cube_fixture()).unwrap();
    let mesh = model.mesh("Cube_Cube.001").unwrap();
    let first = mesh.vertices()[0];
    assert_relative_eq!(first.position[0], 1.0);
    assert_relative_eq!(first.position[2], -0.5);

    // reference 506 is the last declared position
    let last = mesh.vertices()[CUBE_POSITIONS - 1];
    let t = (CUBE_POSITIONS - 1) as f32 / CUBE_POSITIONS as f32;
    assert_relative_eq!(last.position[1], t.sin(), epsilon = 1e-5);
}

#[test]
fn test_nurbs_paths_are_separate_polylines() {
    let model = parse_str(&nurbs_fixture()).unwrap();
    assert_eq!(model.mesh_names(), vec!["NurbsPath", "NurbsPath.001"]);

    let short = model.mesh("NurbsPath.001").unwrap();
    assert_eq!(short.mesh_type(), MeshType::Polyline);
    assert_eq!(short.vertex_count(), 94);
    assert_eq!(short.line_indices().len(), 94);

    let long = model.mesh("NurbsPath").unwrap();
    assert_eq!(long.mesh_type(), MeshType::Polyline);
    assert_eq!(long.vertex_count(), 238);
    // index 49 is the second object's first point
    assert_eq!(long.vertices()[0].position, [0.0, 0.0, 0.0]);
    assert_eq!(long.vertices()[237].position, [119.0, 2.0, 0.0]);

    assert_eq!(model.vertex_count(), 94 + 238);
}

#[test]
fn test_global_fixture_fails_per_object() {
    let parser = WavefrontParser::new().with_index_mode(IndexMode::PerObject);
    let err = parser
        .parse_str(&nurbs_fixture(), Path::new("nurbs.obj"), &MemoryResolver::new())
        .unwrap_err();
    assert!(matches!(err, ParseError::IndexOutOfRange { .. }));
}

#[test]
fn test_restarting_fixture_parses_per_object() {
    let mut content = String::new();
    push_path(&mut content, "NurbsPath.001", 48, 1);
    push_path(&mut content, "NurbsPath", 120, 1);

    let parser = WavefrontParser::new().with_index_mode(IndexMode::PerObject);
    let model = parser
        .parse_str(&content, Path::new("nurbs.obj"), &MemoryResolver::new())
        .unwrap();
    assert_eq!(model.mesh("NurbsPath").unwrap().vertex_count(), 238);
}

#[test]
fn test_partial_reference_fields() {
    let model = parse_str(
        "o Mixed\nv 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nvt 0.5 0.5\n\
         g normals\nf 1//1 2//1 3//1\ng uvs\nf 1/1 2/1 3/1\n",
    )
    .unwrap();

    let normals = model.mesh("Mixed_normals").unwrap();
    assert!(normals.vertices()[0].normal.is_some());
    assert!(normals.vertices()[0].tex_coord.is_none());

    let uvs = model.mesh("Mixed_uvs").unwrap();
    assert!(uvs.vertices()[0].normal.is_none());
    assert_eq!(uvs.vertices()[0].tex_coord, Some([0.5, 0.5, 0.0]));
}

#[test]
fn test_face_before_vertices_fails() {
    let err = parse_str("f 1 2 3\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::IllegalDirective { state: "Init", .. }
    ));

    let err = parse_str("o A\nf 1 2 3\n").unwrap_err();
    assert!(matches!(
        err,
        ParseError::IndexOutOfRange {
            index: 1,
            available: 0,
            ..
        }
    ));
}

#[test]
fn test_unknown_material_produces_no_model() {
    let mut resolver = MemoryResolver::new();
    resolver.insert("scene.mtl", "newmtl known\n");
    let result = WavefrontParser::new().parse_str(
        "mtllib scene.mtl\no A\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\nusemtl missing_name\n",
        Path::new("scene.obj"),
        &resolver,
    );
    assert!(matches!(
        result,
        Err(ParseError::UnresolvedMaterialReference { .. })
    ));
}

#[test]
fn test_model_serializes() {
    let model = parse_str(&nurbs_fixture()).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    let back: Model = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

// =============================================================================
// Resolution
// =============================================================================

const CRATE_OBJ: &str = "\
mtllib crate.mtl
o Crate
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
usemtl Wood
f 1/1 2/2 3/3 4/4
";

const CRATE_MTL: &str = "\
newmtl Wood
Kd 0.64 0.4 0.2
Tr 0.4
map_Kd wood.png
";

#[test]
fn test_filesystem_library_and_texture() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("crate.obj"), CRATE_OBJ).unwrap();
    std::fs::write(dir.path().join("crate.mtl"), CRATE_MTL).unwrap();

    // textures are checked by default
    let err = obj_lite_parser::load(dir.path().join("crate.obj")).unwrap_err();
    match err {
        ParseError::UnresolvedResource { resource, .. } => {
            assert!(resource.ends_with("wood.png"));
        }
        other => panic!("unexpected error {other:?}"),
    }

    let lenient = WavefrontParser::new().with_texture_verification(false);
    let resolver = FsResolver::default();
    assert!(lenient.load(&dir.path().join("crate.obj"), &resolver).is_ok());

    std::fs::write(dir.path().join("wood.png"), [0u8; 4]).unwrap();
    let model = obj_lite_parser::load(dir.path().join("crate.obj")).unwrap();
    let material = model.mesh("Crate").unwrap().material().unwrap();
    assert_eq!(material.name, "Wood");
    assert_relative_eq!(material.alpha, 0.6);
    assert_eq!(
        material.diffuse_texture.as_deref(),
        Some(dir.path().join("wood.png").as_path())
    );
}

#[test]
fn test_missing_texture_fails_by_default() {
    let mut resolver = MemoryResolver::new();
    resolver.insert("s.mtl", "newmtl m\nmap_Kd nowhere.png\n");
    let content = "mtllib s.mtl\no A\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl m\nf 1 2 3\n";

    let err = WavefrontParser::new()
        .parse_str(content, Path::new("s.obj"), &resolver)
        .unwrap_err();
    assert!(matches!(err, ParseError::UnresolvedResource { .. }));

    let model = WavefrontParser::new()
        .with_texture_verification(false)
        .parse_str(content, Path::new("s.obj"), &resolver)
        .unwrap();
    let material = model.material("m").unwrap();
    assert_eq!(
        material.diffuse_texture.as_deref(),
        Some(Path::new("nowhere.png"))
    );
}

#[test]
fn test_rooted_resolver_relative_ids() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("assets")).unwrap();
    std::fs::write(dir.path().join("assets/crate.obj"), CRATE_OBJ).unwrap();
    std::fs::write(dir.path().join("assets/crate.mtl"), CRATE_MTL).unwrap();
    std::fs::write(dir.path().join("assets/wood.png"), [0u8; 4]).unwrap();

    let resolver = FsResolver::new(dir.path());
    let model = WavefrontParser::new()
        .load(Path::new("assets/crate.obj"), &resolver)
        .unwrap();
    assert!(model.material("Wood").is_some());
}

#[test]
fn test_missing_geometry_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = obj_lite_parser::load(dir.path().join("absent.obj")).unwrap_err();
    assert!(matches!(err, ParseError::UnresolvedResource { .. }));
}

fn crate_archive() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("models/crate.obj", options).unwrap();
    writer
        .write_all(CRATE_OBJ.replace("crate.mtl", "../materials/crate.mtl").as_bytes())
        .unwrap();
    writer.start_file("materials/crate.mtl", options).unwrap();
    writer
        .write_all(CRATE_MTL.replace("wood.png", "../textures/wood.png").as_bytes())
        .unwrap();
    writer.start_file("textures/wood.png", options).unwrap();
    writer.write_all(&[0x89, b'P', b'N', b'G']).unwrap();
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_archive_library_and_texture() {
    let resolver = ZipResolver::new(Cursor::new(crate_archive())).unwrap();
    let model = WavefrontParser::new()
        .load(Path::new("models/crate.obj"), &resolver)
        .unwrap();

    let material = model.material("Wood").unwrap();
    let texture = material.diffuse_texture.as_deref().unwrap();
    assert_eq!(normalize(texture), "textures/wood.png");
    assert!(resolver.exists(texture));

    let mesh = model.mesh("Crate").unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.vertices()[2].tex_coord, Some([1.0, 1.0, 0.0]));
}

#[test]
fn test_archive_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crate.zip");
    std::fs::write(&path, crate_archive()).unwrap();

    let resolver = ZipResolver::from_path(&path).unwrap();
    let model = WavefrontParser::new()
        .load(Path::new("models/crate.obj"), &resolver)
        .unwrap();
    assert_eq!(model.mesh_count(), 1);
}
