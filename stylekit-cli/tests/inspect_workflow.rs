//! Integration tests for the `stylekit` binary.
//!
//! Each test runs the built binary against a temporary config file and a
//! local style document, so no network access is needed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const STYLE: &str = r##"{
    "version": 8,
    "sources": {"osm": {"type": "vector", "tiles": ["https://tiles.example.com/osm/{z}/{x}/{y}.pbf"], "minzoom": 0, "maxzoom": 14}},
    "layers": [
        {"id": "background", "type": "background", "paint": {"background-color": "#102030"}},
        {"id": "water", "type": "fill", "source": "osm", "source-layer": "water"},
        {"id": "roads", "type": "line", "source": "osm", "source-layer": "transportation", "minzoom": 5}
    ]
}"##;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let style = dir.path().join("style.json");
        fs::write(&style, STYLE).expect("Failed to write style");

        let config = format!(
            "[style]\nurl = {}\n\n[cache]\nenabled = true\ndirectory = {}\n\n[logging]\nfile = {}\n",
            style.display(),
            dir.path().join("cache").display(),
            dir.path().join("stylekit.log").display(),
        );
        fs::write(dir.path().join("config.ini"), config).expect("Failed to write config");

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn config_path(&self) -> PathBuf {
        self.path().join("config.ini")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_stylekit"))
            .arg("--config")
            .arg(self.config_path())
            .args(args)
            .env("HOME", self.path())
            .output()
            .expect("Failed to run stylekit")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_inspect_hybrid() {
    let ws = Workspace::new();
    let output = ws.run(&["inspect", "--tile", "6/10/20"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("Pipeline:    hybrid"), "{}", out);
    assert!(out.contains("Zoom range:  [0, 14]"), "{}", out);
    assert!(out.contains("Tile 6/10/20"), "{}", out);
    assert!(out.contains("roads"), "{}", out);
    assert!(ws.path().join("stylekit.log").exists());
}

#[test]
fn test_inspect_paging() {
    let ws = Workspace::new();
    let output = ws.run(&["inspect", "--no-hybrid", "--no-cache"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let out = stdout(&output);
    assert!(out.contains("Pipeline:    paging"), "{}", out);
    assert!(out.contains("Clear color:"), "{}", out);
}

#[test]
fn test_inspect_missing_style_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["inspect", "--style", &ws.path().join("missing.json").display().to_string()]);

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_config_path_and_init() {
    let ws = Workspace::new();
    let target = ws.path().join("fresh").join("config.ini");

    let output = Command::new(env!("CARGO_BIN_EXE_stylekit"))
        .arg("--config")
        .arg(&target)
        .args(["config", "path"])
        .output()
        .expect("Failed to run stylekit");
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), target.display().to_string());

    let output = Command::new(env!("CARGO_BIN_EXE_stylekit"))
        .arg("--config")
        .arg(&target)
        .args(["config", "init"])
        .output()
        .expect("Failed to run stylekit");
    assert!(output.status.success());
    assert!(target.exists());

    // A second init without --force refuses to overwrite.
    let output = Command::new(env!("CARGO_BIN_EXE_stylekit"))
        .arg("--config")
        .arg(&target)
        .args(["config", "init"])
        .output()
        .expect("Failed to run stylekit");
    assert_eq!(output.status.code(), Some(2));
}
