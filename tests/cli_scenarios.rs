//! Exercises the `mc-core` binary's file-loading path end to end: write a
//! JSON module to a real temporary file, run the compiled binary against
//! it, and check what it prints.

use std::io::Write;
use std::process::Command;

const MODULE_JSON: &str = r#"{
  "variables": ["x"],
  "formula": {
    "id": 0,
    "ty": "Bool",
    "kind": {
      "Assign": {
        "lhs": "x",
        "rhs": { "id": 1, "ty": "Bool", "kind": { "BoolLit": true } }
      }
    }
  }
}"#;

#[test]
fn mc_core_loads_a_module_from_disk_and_reports_its_transition() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MODULE_JSON.as_bytes()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_mc-core"))
        .arg(file.path())
        .output()
        .expect("mc-core should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 transition(s) found"), "stdout: {stdout}");
    assert!(stdout.contains("Next_0"), "stdout: {stdout}");
}
