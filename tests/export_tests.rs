use predicates::str::contains;
use std::fs;

mod common;
use common::{add_office, geo, setup_home};

fn visit(home: &std::path::Path) {
    geo(home)
        .args(["--at", "2025-06-01 09:00", "fix", "45.0", "7.0"])
        .assert()
        .success();
    geo(home)
        .args(["--at", "2025-06-01 09:20", "fix", "45.01", "7.0"])
        .assert()
        .success();
}

#[test]
fn test_export_csv() {
    let home = setup_home();
    let id = add_office(home.path());
    visit(home.path());

    let out = home.path().join("out/attendance.csv");
    geo(home.path())
        .args(["export", "--format", "csv", "--file", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("CSV export completed"));

    let content = fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with("event_id,name,latitude"));
    let row = lines.next().unwrap();
    assert!(row.starts_with(&format!("{id},Office,")));
    assert!(row.contains(",20,"));
}

#[test]
fn test_export_json() {
    let home = setup_home();
    add_office(home.path());
    visit(home.path());

    let out = home.path().join("attendance.json");
    geo(home.path())
        .args(["export", "--format", "json", "--file", out.to_str().unwrap()])
        .assert()
        .success();

    let rows: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(rows[0]["name"], "Office");
    assert_eq!(rows[0]["total_minutes"], 20);
    assert_eq!(rows[0]["is_at_event"], false);
    assert_eq!(rows[0]["exited_at"], "2025-06-01T09:20:00+00:00");
}

#[test]
fn test_export_refuses_overwrite_without_force() {
    let home = setup_home();
    add_office(home.path());

    let out = home.path().join("attendance.csv");
    fs::write(&out, "keep me").unwrap();

    geo(home.path())
        .args(["export", "--file", out.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains("already exists"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "keep me");

    geo(home.path())
        .args(["export", "--file", out.to_str().unwrap(), "--force"])
        .assert()
        .success();
    assert!(fs::read_to_string(&out).unwrap().contains("Office"));
}

#[test]
fn test_export_without_events() {
    let home = setup_home();
    let out = home.path().join("nothing.csv");

    geo(home.path())
        .args(["export", "--file", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("No events to export"));
    assert!(!out.exists());
}
