use assert_cmd::Command;
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use std::path::Path;

fn write_fixture(dir: &Path) {
    let mut source = RgbaImage::from_pixel(4, 4, Rgba([20, 160, 60, 255]));
    let mut mask = GrayImage::new(4, 4);
    for y in 1..=2 {
        for x in 1..=2 {
            source.put_pixel(x, y, Rgba([200, 30, 40, 255]));
            mask.put_pixel(x, y, Luma([7]));
        }
    }
    source
        .save_with_format(dir.join("scene.png"), ImageFormat::Png)
        .unwrap();
    mask.save_with_format(dir.join("mask.png"), ImageFormat::Png)
        .unwrap();
}

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("segsieve 0.3.0\n");
}

#[test]
fn classes_lists_catalog() {
    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.arg("classes");
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("background"))
        .stdout(predicates::str::contains("car"))
        .stdout(predicates::str::contains("tv"));
}

#[test]
fn process_extracts_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.current_dir(dir.path());
    cmd.args([
        "process",
        "scene.png",
        "--mask",
        "mask.png",
        "--out",
        "images",
        "--db",
        "catalog.db",
    ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("2 class(es)"))
        .stdout(predicates::str::contains("background, car"));

    assert!(dir.path().join("images/frames/1.jpeg").is_file());
    assert!(dir
        .path()
        .join("images/objects/car/frame_1_car.jpeg")
        .is_file());
    assert!(dir.path().join("images/detected_objects.json").is_file());
    assert!(dir.path().join("catalog.db").is_file());
}

#[test]
fn process_skips_unreachable_source() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.current_dir(dir.path());
    cmd.args([
        "process",
        "no_such_image.jpeg",
        "--mask",
        "mask.png",
        "--out",
        "images",
        "--db",
        "catalog.db",
    ]);
    // A failed fetch skips the run without failing the process.
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Cannot retrieve image"));

    assert!(!dir.path().join("images/detected_objects.json").exists());
    assert!(!dir.path().join("images/objects").exists());
}

#[test]
fn process_versioned_reports_flag() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    for _ in 0..2 {
        let mut cmd = Command::cargo_bin("segsieve").unwrap();
        cmd.current_dir(dir.path());
        cmd.args([
            "process",
            "scene.png",
            "--mask",
            "mask.png",
            "--out",
            "images",
            "--db",
            "catalog.db",
            "--versioned-reports",
        ]);
        cmd.assert().success();
    }

    // Each CLI invocation is a fresh process, so both runs carry id 1 and
    // the second overwrites the first's versioned report.
    assert!(dir
        .path()
        .join("images/detected_objects_1.json")
        .is_file());
}

#[test]
fn process_rejects_missing_mask() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let mut cmd = Command::cargo_bin("segsieve").unwrap();
    cmd.current_dir(dir.path());
    cmd.args(["process", "scene.png", "--mask", "absent.png"]);
    cmd.assert().failure();
}
