use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn gaudi(config_dir: &std::path::Path, data_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gaudi"));
    command
        .env("GAUDI_CONFIG_DIR", config_dir)
        .env("GAUDI_DATA_DIR", data_dir)
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn defaults_install_writes_show_and_tour() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let data_dir = root.path().join("data");

    let dry_run = gaudi(&config_dir, &data_dir)
        .args(["defaults", "install", "--dry-run"])
        .output()
        .expect("failed to run gaudi defaults install --dry-run");
    assert!(dry_run.status.success());
    assert!(String::from_utf8_lossy(&dry_run.stdout).contains("would be installed"));
    assert!(!config_dir.join("show.toml").exists());

    let status = gaudi(&config_dir, &data_dir)
        .args(["defaults", "install"])
        .status()
        .expect("failed to run gaudi defaults install");
    assert!(status.success());
    assert!(config_dir.join("show.toml").is_file());
    assert!(data_dir.join("scripts/tour.gaudi").is_file());

    let again = gaudi(&config_dir, &data_dir)
        .args(["defaults", "install"])
        .output()
        .expect("failed to rerun gaudi defaults install");
    assert!(again.status.success());
    assert!(String::from_utf8_lossy(&again.stdout).contains("already installed"));
}

#[test]
fn defaults_where_reports_overrides() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let data_dir = root.path().join("data");

    let output = gaudi(&config_dir, &data_dir)
        .args(["defaults", "where"])
        .output()
        .expect("failed to run gaudi defaults where");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&config_dir.display().to_string()));
    assert!(stdout.contains("bundled show in use"));
}

#[test]
fn defaults_print_matches_check() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let data_dir = root.path().join("data");

    let printed = gaudi(&config_dir, &data_dir)
        .args(["defaults", "print"])
        .output()
        .expect("failed to run gaudi defaults print");
    assert!(printed.status.success());
    let show = root.path().join("printed.toml");
    fs::write(&show, &printed.stdout).unwrap();

    let check = gaudi(&config_dir, &data_dir)
        .arg("check")
        .arg("--config")
        .arg(&show)
        .output()
        .expect("failed to run gaudi check");
    assert!(check.status.success());
    let stdout = String::from_utf8_lossy(&check.stdout);
    assert!(stdout.contains("Panels: 10"));
    assert!(stdout.contains("intro"));
}

#[test]
fn check_rejects_invalid_show() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("show.toml"),
        "version = 1\n[[panels]]\nname = \"a\"\n[[panels]]\nname = \"a\"\n",
    )
    .unwrap();

    let output = gaudi(&config_dir, &root.path().join("data"))
        .arg("check")
        .output()
        .expect("failed to run gaudi check");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("declared more than once"));
}
