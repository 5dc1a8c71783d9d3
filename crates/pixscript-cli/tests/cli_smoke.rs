//! Runs the built `pixscript` binary against the sample scripts.

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::tempdir;

fn bin() -> Command {
    Command::cargo_bin("pixscript").unwrap()
}

fn script(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../scripts").join(name)
}

#[test]
fn run_prints_script_output() {
    bin().arg("run").arg(script("rgb_corners.txt")).assert().success().stdout("105\n");
}

#[test]
fn run_reports_step_limit() {
    let assert = bin()
        .args(["--max-steps", "100", "run"])
        .arg(script("while_gray.txt"))
        .assert()
        .failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("[R004]"), "{stderr}");
}

#[test]
fn image_writes_pnm() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("gray.pnm");
    bin()
        .args(["--canvas-width", "32", "--canvas-height", "16", "image"])
        .arg(script("while_gray.txt"))
        .arg("--out")
        .arg(&path)
        .assert()
        .success();
    let canvas = pixscript_renderer::pnm::decode(&std::fs::read(&path)?)?;
    assert_eq!((canvas.width(), canvas.height()), (32, 16));
    Ok(())
}

#[test]
fn image_creates_missing_directories() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("nested/out/corners.pnm");
    bin().arg("image").arg(script("rgb_corners.txt")).arg("--out").arg(&path).assert().success();
    assert!(std::fs::read(&path)?.starts_with(b"P6\n"));
    Ok(())
}

#[test]
fn mandelbrot_writes_png() -> Result<(), Box<dyn std::error::Error>> {
    let temp = tempdir()?;
    let path = temp.path().join("mandel.png");
    bin()
        .args(["mandelbrot", "--width", "40", "--height", "30", "--format", "png", "--out"])
        .arg(&path)
        .assert()
        .success();
    assert!(std::fs::read(&path)?.starts_with(b"\x89PNG"));
    Ok(())
}

#[test]
fn partial_viewport_is_rejected() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("unused.pnm");
    bin()
        .args(["mandelbrot", "--center-re", "-0.5", "--out"])
        .arg(&path)
        .assert()
        .failure();
    assert!(!path.exists());
}
