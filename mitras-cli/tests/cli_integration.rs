use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let path =
            std::env::temp_dir().join(format!("mitras_cli_{tag}_{}_{}", std::process::id(), ts));
        fs::create_dir_all(&path).expect("create temp test dir");
        Self { path }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_mitras(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mitras"))
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("run mitras")
}

#[test]
fn eval_expressions_print_analyses() {
    let dir = TestDir::new("eval");
    let output = run_mitras(&["-e", "a=2", "-e", "b=3", "-e", "a+b"], &dir.path);

    assert!(output.status.success(), "process failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0: a=2 => 2 [number, -]"), "got: {stdout}");
    assert!(stdout.contains("2: a+b => 5 [number, -]"), "got: {stdout}");
    assert!(dir.path.join("graph.svg").is_file());
}

#[test]
fn file_input_with_comments() {
    let dir = TestDir::new("file");
    fs::write(
        dir.path.join("input.tex"),
        "% a rotation\nR=\\begin{bmatrix}0&-1\\\\1&0\\end{bmatrix}\n\n\\det(R)\n",
    )
    .expect("write input file");

    let output = run_mitras(&["input.tex", "-o", "out"], &dir.path);
    assert!(output.status.success(), "process failed: {output:?}");
    assert!(dir.path.join("out/graph.svg").is_file(), "output dir is created");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0: % a rotation"), "got: {stdout}");
    assert!(stdout.contains("[matrix, -]"), "got: {stdout}");
    assert!(stdout.contains("2: \\det(R) => 1 [number, det]"), "got: {stdout}");
}

#[test]
fn svg_contains_grid_and_figures() {
    let dir = TestDir::new("svg");
    let output = run_mitras(
        &[
            "-e",
            "\\begin{bmatrix}1\\\\2\\end{bmatrix}",
            "--width",
            "300",
            "--height",
            "200",
            "--background",
            "#ffffff",
        ],
        &dir.path,
    );
    assert!(output.status.success(), "process failed: {output:?}");

    let svg = fs::read_to_string(dir.path.join("graph.svg")).expect("read svg output");
    assert!(svg.contains("<svg"), "expected svg root element");
    assert!(svg.contains("viewBox=\"0 0 300 200\""), "got: {svg}");
    assert!(svg.contains("<rect"), "expected background rect");
    assert!(svg.contains("<text"), "expected axis labels");
    assert!(svg.contains("<path"), "expected rendered paths");
}

#[test]
fn animate_writes_frames() {
    let dir = TestDir::new("animate");
    let output = run_mitras(
        &[
            "-e",
            "\\begin{bmatrix}2&0\\\\0&2\\end{bmatrix}",
            "--animate",
            "0",
            "--frames",
            "3",
        ],
        &dir.path,
    );
    assert!(output.status.success(), "process failed: {output:?}");
    for frame in 0..3 {
        let path = dir.path.join(format!("graph.{frame:03}.svg"));
        assert!(path.is_file(), "missing frame {path:?}");
    }
    assert!(!dir.path.join("graph.003.svg").exists());
}

#[test]
fn unknown_animation_id_fails() {
    let dir = TestDir::new("bad_id");
    let output = run_mitras(&["-e", "1", "--animate", "7"], &dir.path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no expression with id 7"), "got: {stderr}");
}

#[test]
fn missing_input_fails() {
    let dir = TestDir::new("missing");
    let output = run_mitras(&["nope.tex"], &dir.path);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error reading nope.tex"), "got: {stderr}");
}
