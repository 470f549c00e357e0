//! Output formats and output paths.

mod common;

use pretty_assertions::assert_eq;

use common::{fixtures, TestProject};

const TWO_FRAMES: &str = "frames: [a.png, b.png]";

fn project() -> TestProject {
    let project = TestProject::new();
    project
        .frame("a.png", [180, 60, 60])
        .frame_sized("b.png", 48, 64, [60, 60, 180]);
    project
}

#[test]
fn test_webp_export() {
    let project = project();
    let report = project
        .pipeline(&fixtures::grid_config(TWO_FRAMES, "  format: webp"))
        .run()
        .unwrap();

    // the configured sheet.png is written with the format's extension
    assert_eq!(
        report.written,
        vec![project.path("sheet.webp"), project.path("sheet.json")]
    );
    assert!(!project.path("sheet.png").exists());

    let bytes = project.read("sheet.webp");
    common::assert_webp(&bytes);
    let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::WebP)
        .unwrap()
        .to_rgba8();
    assert_eq!(
        decoded.dimensions(),
        (report.sheet_size.width, report.sheet_size.height)
    );
    assert_eq!(project.read_json("sheet.json")["image"], "sheet.webp");
}

#[test]
fn test_json_export_writes_metadata_only() {
    let project = project();
    let report = project
        .pipeline(&fixtures::grid_config(TWO_FRAMES, "  format: json"))
        .run()
        .unwrap();

    assert_eq!(report.written, vec![project.path("sheet.json")]);
    assert!(!project.path("sheet.png").exists());

    let meta = project.read_json("sheet.json");
    assert!(meta.get("image").is_none());
    assert_eq!(meta["frames"].as_array().unwrap().len(), 2);
}

#[test]
fn test_metadata_can_be_disabled() {
    let project = project();
    let report = project
        .pipeline(&fixtures::grid_config(TWO_FRAMES, "  metadata: false"))
        .run()
        .unwrap();
    assert_eq!(report.written, vec![project.path("sheet.png")]);
    assert!(!project.path("sheet.json").exists());
}

#[test]
fn test_optimized_png_matches_sheet() {
    let project = project();
    let pipeline = project.pipeline(&fixtures::grid_config(
        TWO_FRAMES,
        "  optimize: true\n  metadata: false",
    ));
    let build = pipeline.build().unwrap();
    pipeline.export(&build).unwrap();

    let decoded = common::assert_png(&project.read("sheet.png"));
    assert_eq!(decoded, build.sheet);
}

#[test]
fn test_output_override() {
    let project = project();
    let mut pipeline = project.pipeline(&fixtures::grid_config(TWO_FRAMES, "  metadata: false"));
    pipeline.set_output(project.path("dist/sprites/hero.png"));

    let report = pipeline.run().unwrap();
    assert_eq!(report.written, vec![project.path("dist/sprites/hero.png")]);
    common::assert_png(&project.read("dist/sprites/hero.png"));
}

#[test]
fn test_single_column_grid() {
    let project = TestProject::new();
    project
        .frame("a.png", [180, 60, 60])
        .frame("b.png", [60, 60, 180]);
    let pipeline = project.pipeline(
        r#"algorithm: nearest-neighbor
settings: {width: 10, height: 6}
layout: {type: grid, columns: 1}
frames: [a.png, b.png]
export: {metadata: false}
"#,
    );
    let report = pipeline.run().unwrap();
    assert_eq!(
        (report.sheet_size.width, report.sheet_size.height),
        (10, 12)
    );
}
