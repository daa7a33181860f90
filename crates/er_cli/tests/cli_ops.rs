use std::path::Path;
use std::process::Command;

use er_core::slot::VERSION_CURRENT;
use er_core::{Platform, SaveContainer};

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_eldenring-se"))
        .args(args)
        .output()
        .expect("failed to run eldenring-se CLI")
}

fn write_fixture(path: &Path) {
    let mut save = SaveContainer::create(Platform::Pc);
    save.common_mut().steam_id = 0x0110_0001_0000_0001;
    save.rebuild_common();
    let slot = save.slot_mut(0);
    slot.version = VERSION_CURRENT;
    slot.name = "Ranni".to_string();
    slot.level = 58;
    slot.playtime_seconds = 5_400;
    slot.steam_id = 0x0110_0001_0000_0001;
    save.rebuild_and_checksum(0).expect("rebuild failed");
    save.save_to(path).expect("failed to write fixture");
}

#[test]
fn list_shows_active_and_empty_slots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("ER0000.sl2");
    write_fixture(&save_path);

    let output = run_cli(&["list", save_path.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("slot 0: Ranni (level 58, 1h 30m)"), "stdout: {stdout}");
    assert!(stdout.contains("slot 1: <empty>"));
}

#[test]
fn list_json_is_machine_readable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("ER0000.sl2");
    write_fixture(&save_path);

    let output = run_cli(&["list", save_path.to_str().unwrap(), "--json"]);
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("invalid JSON output");
    assert_eq!(value["slots"][0]["name"], "Ranni");
    assert_eq!(value["slots"][0]["level"], 58);
    assert_eq!(value["slots"][1]["active"], false);
}

#[test]
fn copy_then_check_round_trips_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("ER0000.sl2");
    write_fixture(&save_path);

    let output = run_cli(&["copy", save_path.to_str().unwrap(), "0", "1"]);
    assert!(output.status.success());

    let output = run_cli(&["check", save_path.to_str().unwrap()]);
    assert!(output.status.success());

    let save = SaveContainer::load(&save_path).expect("reload failed");
    assert_eq!(save.slot(1).name, "Ranni");
    assert!(save.common().active[1]);
}

#[test]
fn copy_from_empty_slot_fails_with_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("ER0000.sl2");
    write_fixture(&save_path);

    let output = run_cli(&["copy", save_path.to_str().unwrap(), "5", "6"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("slot 5 is empty"), "stderr: {stderr}");
}

#[test]
fn export_import_cycle_through_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save_path = dir.path().join("ER0000.sl2");
    let erc_path = dir.path().join("ranni.erc");
    write_fixture(&save_path);

    let output = run_cli(&[
        "export",
        save_path.to_str().unwrap(),
        "0",
        erc_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(erc_path.exists());

    let output = run_cli(&[
        "import",
        save_path.to_str().unwrap(),
        "9",
        erc_path.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let save = SaveContainer::load(&save_path).expect("reload failed");
    assert_eq!(save.slot(9).name, "Ranni");
}
