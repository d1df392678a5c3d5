//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

pub const TEAM: &str = "1234";
pub const ROBOT: &str = "Ares";

/// A small BOM as a plain JSON part list
pub const PART_LIST: &str = r#"[
    {"name": "Shaft", "quantity": 5, "process1": "Lathe", "process1_qty": 2, "process2": "Mill"},
    {"name": "Bracket", "quantity": 10, "pre_process": "Laser", "pre_process_qty": 10,
     "process1": "Brake", "process1_qty": 10},
    {"name": "Plate", "quantity": 4, "pre_process": "Laser", "process1": "CNC"},
    {"name": "Bolt", "quantity": 20},
    {"name": "Gear", "quantity": "N/A", "process1": "CNC"}
]"#;

/// Helper to get an rbt command isolated from the user's environment
pub fn rbt() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("rbt"));
    for var in ["RBT_TEAM", "RBT_ROBOT", "RBT_SYSTEM", "RBT_STATE", "RBT_REMOTE", "RBT_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper to run rbt inside a project directory with its own global config
pub fn rbt_in(tmp: &TempDir) -> Command {
    let mut cmd = rbt();
    cmd.current_dir(tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".xdg-config"))
        .env("XDG_DATA_HOME", tmp.path().join(".xdg-data"));
    cmd
}

/// Helper to create a project with team, robot and a remote directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    rbt_in(&tmp)
        .args(["init", "--team", TEAM, "--robot", ROBOT, "--remote", "remote"])
        .assert()
        .success();
    tmp
}

/// Helper to create a project and import [`PART_LIST`] into it
pub fn setup_project_with_bom() -> TempDir {
    let tmp = setup_test_project();
    import_json(&tmp, "parts.json", PART_LIST);
    tmp
}

/// Write a file into the project and import it
pub fn import_json(tmp: &TempDir, file: &str, content: &str) {
    fs::write(tmp.path().join(file), content).unwrap();
    rbt_in(tmp).args(["import", file]).assert().success();
}

/// Run a command and parse its JSON output
pub fn json_output(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = rbt_in(tmp)
        .args(args)
        .args(["--output", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Names in a JSON part array
pub fn names(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

/// Path of the remote team file
pub fn remote_bom(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join("remote").join(TEAM).join("bom.json")
}

pub fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}
