//! End-to-end builds over a temporary project directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Read;
use std::path::Path;

use coinpack_3mf::{
    BuildLayout, COIN_PARTS, ColorAttachment, IndexParams, MODEL_PATH, MODEL_SETTINGS_PATH,
    PackageError, PackageOptions, Palette, Preset, ProjectLayout, build_presets, load_parts,
    validate_package, write_package,
};
use coinpack_io::encode_binary_stl;
use coinpack_types::RawTriangle;
use tempfile::TempDir;

/// A unit square split into two triangles, shifted along x.
fn square(offset: f32) -> Vec<RawTriangle> {
    let a = [offset, 0.0, 0.0];
    let b = [offset + 1.0, 0.0, 0.0];
    let c = [offset + 1.0, 1.0, 0.0];
    let d = [offset, 1.0, 0.0];
    vec![RawTriangle::new(a, b, c), RawTriangle::new(a, c, d)]
}

/// Project root with all four part STLs and no palette file.
fn project() -> (TempDir, ProjectLayout) {
    let dir = tempfile::tempdir().unwrap();
    let layout = ProjectLayout::new(dir.path());
    std::fs::create_dir_all(layout.parts_dir()).unwrap();

    for (i, part) in COIN_PARTS.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let offset = i as f32 * 10.0;
        let bytes = encode_binary_stl(&square(offset));
        std::fs::write(layout.parts_dir().join(part.file), bytes).unwrap();
    }
    (dir, layout)
}

fn write_palette(layout: &ProjectLayout, json: &str) {
    std::fs::write(layout.palette_path(), json).unwrap();
}

fn read_member(path: &Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut member = archive.by_name(name).unwrap();
    let mut text = String::new();
    member.read_to_string(&mut text).unwrap();
    text
}

const GOLD_PALETTE: &str = r##"{"palette": [
    {"name": "black", "hex": "000000"},
    {"name": "white", "hex": "#ffffff"},
    {"name": "red", "hex": "#D40000"},
    {"name": "gold", "hex": "#d4af37"}
]}"##;

#[test]
fn items_layout_end_to_end() {
    let (_dir, layout) = project();
    let parts = load_parts(&layout.part_specs(), &IndexParams::default()).unwrap();
    // Four corners per square, none shared between parts.
    let vertices: usize = parts.iter().map(|p| p.mesh().vertices.len()).sum();
    assert_eq!(vertices, 16);

    let outputs = build_presets(&layout, &[Preset::Colored], &IndexParams::default()).unwrap();
    assert_eq!(outputs.len(), 1);
    let output = &outputs[0];
    assert_eq!(output.path, layout.output_dir().join("coin_colored.3mf"));

    let report = &output.report;
    assert!(report.is_ok(), "{report}");
    assert_eq!(report.build_items, 4);
    assert_eq!(report.objects, 4);
    assert_eq!(report.objects_with_mesh, 4);
    assert_eq!(report.triangles, 8);

    let text = report.to_string();
    assert!(text.contains("triangles: 8"));
    assert!(text.contains("objects: 4 with_mesh=4"));
    assert!(text.contains("build items: 4"));
    assert!(text.ends_with("OK"));

    let model = read_member(&output.path, MODEL_PATH);
    assert_eq!(model.matches("<vertex ").count(), 16);
    assert_eq!(model.matches("<triangle ").count(), 8);
}

#[test]
fn assembly_layout_end_to_end() {
    let (_dir, layout) = project();
    let outputs =
        build_presets(&layout, &[Preset::ColoredAssembly], &IndexParams::default()).unwrap();
    let report = &outputs[0].report;

    assert!(report.is_ok(), "{report}");
    assert_eq!(report.build_items, 1);
    assert_eq!(report.build_object_ids, vec!["6".to_string()]);
    assert_eq!(report.components_of("6"), Some(4));
    assert_eq!(report.objects, 5);
    assert_eq!(report.objects_with_mesh, 4);
}

#[test]
fn missing_part_aborts_before_writing() {
    let (_dir, layout) = project();
    let missing = layout.parts_dir().join("coin_inlay_red.stl");
    std::fs::remove_file(&missing).unwrap();
    write_palette(&layout, GOLD_PALETTE);

    let err = build_presets(&layout, &Preset::ALL, &IndexParams::default()).unwrap_err();
    match &err {
        PackageError::MissingInput { paths } => assert_eq!(paths, &vec![missing.clone()]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(&missing.display().to_string()));

    for preset in Preset::ALL {
        assert!(!layout.output_path(preset).exists());
    }
}

#[test]
fn missing_inputs_are_reported_together() {
    let (_dir, layout) = project();
    let base = layout.parts_dir().join("coin_base_60mm.stl");
    let wood = layout.parts_dir().join("coin_inlay_wood.stl");
    std::fs::remove_file(&base).unwrap();
    std::fs::remove_file(&wood).unwrap();

    let err = build_presets(&layout, &[Preset::Project], &IndexParams::default()).unwrap_err();
    let PackageError::MissingInput { paths } = err else {
        panic!("expected MissingInput");
    };
    assert_eq!(paths, vec![base, wood, layout.palette_path()]);
}

#[test]
fn project_preset_uses_palette_file() {
    let (_dir, layout) = project();
    write_palette(&layout, GOLD_PALETTE);

    let outputs = build_presets(&layout, &[Preset::Project], &IndexParams::default()).unwrap();
    let output = &outputs[0];
    assert!(output.report.is_ok(), "{}", output.report);
    assert_eq!(output.path, layout.output_dir().join("coin_project.3mf"));

    let model = read_member(&output.path, MODEL_PATH);
    assert!(model.contains("color=\"#D4AF37\""));
    assert!(!model.contains("#C8A06A"));
    assert!(model.contains("xmlns:BambuStudio=\"http://schemas.bambulab.com/package/2021\""));
    assert!(model.contains("<metadata name=\"BambuStudio:3mfVersion\">1</metadata>"));

    let settings = read_member(&output.path, MODEL_SETTINGS_PATH);
    assert!(settings.contains("<object id=\"6\">"));
    assert_eq!(settings.matches("<part ").count(), 4);
    assert!(settings.contains("<metadata key=\"name\" value=\"inlay_wood\"/>"));
    assert!(settings.contains("<metadata key=\"extruder\" value=\"4\"/>"));
}

#[test]
fn colored_presets_ignore_palette_file() {
    let (_dir, layout) = project();
    write_palette(&layout, GOLD_PALETTE);

    let outputs = build_presets(&layout, &[Preset::Colored], &IndexParams::default()).unwrap();
    let model = read_member(&outputs[0].path, MODEL_PATH);
    assert!(model.contains("color=\"#C8A06A\""));
    assert!(!model.contains("BambuStudio"));
}

#[test]
fn short_palette_fails_without_writing() {
    let (_dir, layout) = project();
    write_palette(
        &layout,
        r##"{"palette": [{"name": "black", "hex": "#000000"}, {"name": "white", "hex": "#FFFFFF"}]}"##,
    );

    let err = build_presets(&layout, &Preset::ALL, &IndexParams::default()).unwrap_err();
    assert!(matches!(
        err,
        PackageError::InvalidPaletteIndex { index: 2, len: 2, .. }
    ));
    for preset in Preset::ALL {
        assert!(!layout.output_path(preset).exists());
    }
}

#[test]
fn all_presets_build_and_rebuild() {
    let (_dir, layout) = project();
    write_palette(&layout, GOLD_PALETTE);

    for _ in 0..2 {
        let outputs = build_presets(&layout, &Preset::ALL, &IndexParams::default()).unwrap();
        assert_eq!(outputs.len(), 3);
        assert!(outputs.iter().all(|o| o.report.is_ok()));
    }

    let entries = std::fs::read_dir(layout.output_dir()).unwrap().count();
    // Three packages plus the parts directory.
    assert_eq!(entries, 4);
}

#[test]
fn object_attachment_round_trips() {
    let (dir, layout) = project();
    let parts = load_parts(&layout.part_specs(), &IndexParams::default()).unwrap();
    let options = PackageOptions::default()
        .with_color_attachment(ColorAttachment::Object)
        .with_build_layout(BuildLayout::Assembly)
        .with_assembly_object_id(50);
    let path = dir.path().join("object_level.3mf");

    write_package(&parts, &Palette::coin_default(), &options, &path).unwrap();
    let report = validate_package(&path).unwrap();

    assert!(report.is_ok(), "{report}");
    assert_eq!(report.triangles_missing, 0);
    assert_eq!(report.build_object_ids, vec!["50".to_string()]);
    let model = read_member(&path, MODEL_PATH);
    assert!(!model.contains("p1="));
}
