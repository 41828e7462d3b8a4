#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::Path;
use tempfile::TempDir;

/// Fresh configuration home; removed when the returned guard is dropped.
pub fn setup_home() -> TempDir {
    tempfile::tempdir().expect("create temp home")
}

/// geoattend bound to `home`, so the user's real config is never touched.
pub fn geo(home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("geoattend");
    cmd.env("GEOATTEND_HOME", home)
        .env_remove("RUST_LOG")
        .env_remove("LOG_FORMAT");
    cmd
}

/// Add an event through the CLI and return its id.
pub fn add_event(home: &Path, at: &str, name: &str, lat: &str, lon: &str, radius: &str) -> String {
    let out = geo(home)
        .args([
            "--at", at, "event", "add", name, "--lat", lat, "--lon", lon, "--radius", radius,
        ])
        .output()
        .expect("run event add");
    assert!(out.status.success(), "event add failed: {:?}", out);

    let stdout = String::from_utf8_lossy(&out.stdout);
    stdout
        .lines()
        .find(|l| l.contains("with id"))
        .and_then(|l| l.split_whitespace().last())
        .map(str::to_string)
        .expect("id in event add output")
}

/// The usual fixture: "Office" at 45.0, 7.0 with a 100 m fence.
pub fn add_office(home: &Path) -> String {
    add_event(home, "2025-06-01 08:00", "Office", "45.0", "7.0", "100")
}

/// Read a storage slot written under the default data directory.
pub fn read_slot(home: &Path, slot: &str) -> serde_json::Value {
    let path = home.join("data").join(format!("{slot}.json"));
    let content = std::fs::read_to_string(&path).expect("read slot");
    serde_json::from_str(&content).expect("parse slot")
}
