//! End-to-end tests for the `nitroc` binary.
//!
//! Each test writes a `.nitro` source file into a temp directory, runs the
//! compiler on it and inspects the exit status, stderr and written files.
//! The Go toolchain is never invoked.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const APP: &str = r#"
func page(title, children) <main><h1>{title}</h1>{children}</main>
get /users/{id} () { select name from users where id = {id} }
get / () <page title="Home"><p>"welcome"</p></page>
"#;

fn write_source(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("app.nitro");
    fs::write(&path, source).expect("failed to write app.nitro");
    path
}

fn nitroc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nitroc"))
        .args(args)
        .env_remove("NITRO_LOG")
        .env_remove("NITRO_ADDR")
        .env_remove("NITRO_DATABASE_URL")
        .output()
        .expect("failed to invoke nitroc")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn build_writes_main_and_go_mod_next_to_the_input() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), APP);

    let output = nitroc(&["build", file.to_str().unwrap()]);
    assert!(output.status.success(), "build failed: {}", stderr(&output));

    let out = temp.path().join("out");
    let main_go = fs::read_to_string(out.join("main.go")).unwrap();
    assert!(main_go.starts_with("package main\n"));
    assert!(main_go.contains("e.GET(\"/users/:id/\""));
    assert!(main_go.contains("func page(title string, children Component) Component {"));

    let go_mod = fs::read_to_string(out.join("go.mod")).unwrap();
    assert!(go_mod.contains("github.com/labstack/echo/v4 v4.11.4"));
    assert!(go_mod.contains("github.com/lib/pq v1.10.9"));

    assert!(stderr(&output).contains("Compiled:"));
}

#[test]
fn build_honours_out_dir_and_addr() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), APP);
    let out = temp.path().join("generated");

    let output = Command::new(env!("CARGO_BIN_EXE_nitroc"))
        .args(["build", file.to_str().unwrap(), "--out-dir", out.to_str().unwrap()])
        .env("NITRO_ADDR", ":9000")
        .env_remove("NITRO_LOG")
        .output()
        .unwrap();
    assert!(output.status.success(), "build failed: {}", stderr(&output));

    let main_go = fs::read_to_string(out.join("main.go")).unwrap();
    assert!(main_go.contains("e.Start(\":9000\")"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn syntax_error_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), "func broken(1) 2");

    let output = nitroc(&["build", file.to_str().unwrap(), "--no-color"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Parse error"), "stderr: {err}");
    assert!(err.contains("Compilation failed"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn json_diagnostics() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), "func ok() 1\nfunc (");

    let output = nitroc(&["check", file.to_str().unwrap(), "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    let mut lines = err.lines();

    let diagnostic: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(diagnostic["code"], "P0001");
    assert_eq!(diagnostic["severity"], "error");
    assert_eq!(diagnostic["spans"][0]["line"], 2);

    let summary: serde_json::Value = serde_json::from_str(lines.next().unwrap()).unwrap();
    assert_eq!(summary["code"], "C0001");
}

#[test]
fn lowering_errors_have_their_own_codes() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), "func f(u) <p>{u.name}</p>");

    let output = nitroc(&["build", file.to_str().unwrap(), "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    let diagnostic: serde_json::Value = serde_json::from_str(err.lines().next().unwrap()).unwrap();
    assert_eq!(diagnostic["code"], "L0001");
    assert!(diagnostic["message"]
        .as_str()
        .unwrap()
        .contains("internal error in classify pass"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn check_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), APP);

    let output = nitroc(&["check", file.to_str().unwrap()]);
    assert!(output.status.success(), "check failed: {}", stderr(&output));
    assert!(stderr(&output).contains("Checked:"));
    assert!(!temp.path().join("out").exists());
}

#[test]
fn emit_prints_go() {
    let temp = tempfile::tempdir().unwrap();
    let file = write_source(temp.path(), APP);

    let output = nitroc(&["emit", file.to_str().unwrap()]);
    assert!(output.status.success(), "emit failed: {}", stderr(&output));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("package main\n"));
    assert!(stdout.contains("func (db *Database) _query0(arg1 string) []_record1 {"));
}

#[test]
fn missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let missing = temp.path().join("nope.nitro");

    let output = nitroc(&["build", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read"));
}
