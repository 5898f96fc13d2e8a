//! End-to-end tests of the taxic binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn taxic_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_taxic"))
}

fn run(args: &[&str]) -> Output {
    Command::new(taxic_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run taxic")
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── build ──────────────────────────────────────────────────────────────

#[test]
fn build_project_and_emit_summary() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src/model")).unwrap();
    fs::write(project.join("taxi.toml"), "[project]\nname = \"demo\"\nversion = \"0.1.0\"\n").unwrap();
    fs::write(project.join("src/model/person.taxi"), "namespace demo\ntype Person { name : Name }").unwrap();
    fs::write(project.join("src/types.taxi"), "namespace demo\ntype Name inherits String").unwrap();
    let emit = project.join("out.json");

    let output = run(&["build", path_str(project), "--emit", path_str(&emit)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(&emit).unwrap()).unwrap();
    let names: Vec<&str> = summary["types"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["demo.Person", "demo.Name"]);
}

#[test]
fn build_json_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bad.taxi");
    fs::write(&file, "type A { b : Bar }").unwrap();

    let output = run(&["build", "--json", path_str(&file)]);
    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut stream = serde_json::Deserializer::from_str(&stderr).into_iter::<serde_json::Value>();
    let json = stream.next().expect("no JSON object in stderr").unwrap();
    assert_eq!(json["code"], "E0002");
    assert_eq!(json["message"], "Unresolved type: Bar");
    assert_eq!(json["line"], 1);
    assert!(!stderr.contains('\u{1b}'), "unexpected ANSI codes: {stderr:?}");
}

#[test]
fn warnings_fail_when_the_manifest_says_so() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path();
    fs::create_dir_all(project.join("src")).unwrap();
    fs::write(
        project.join("taxi.toml"),
        "[project]\nname = \"strict\"\nversion = \"0.1.0\"\n\n[compiler]\nwarnings_as_errors = true\n",
    )
    .unwrap();
    fs::write(
        project.join("src/a.taxi"),
        "annotation Audit { reason : String }\n@Audit(who = 'me') type A",
    )
    .unwrap();

    let output = run(&["build", "--no-color", path_str(project)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Warning"), "{stderr}");
}

#[test]
fn build_missing_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&["build", path_str(&dir.path().join("missing"))]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"), "{stderr}");
}

// ── check ──────────────────────────────────────────────────────────────

#[test]
fn check_compiles_files_together() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.taxi");
    let b = dir.path().join("b.taxi");
    fs::write(&a, "type extension Person { @Deprecated name }").unwrap();
    fs::write(&b, "type Person { name : String }").unwrap();

    let output = run(&["check", path_str(&a), path_str(&b)]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
}

#[test]
fn check_reports_redefinition() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.taxi");
    let b = dir.path().join("b.taxi");
    fs::write(&a, "type Person").unwrap();
    fs::write(&b, "type Person").unwrap();

    let output = run(&["check", "--no-color", path_str(&a), path_str(&b)]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Attempt to redefine type Person"), "{stderr}");
    assert!(stderr.contains("[E0003]"), "{stderr}");
}
