use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{add_office, geo, setup_home};

#[test]
fn test_status_after_exit_shows_total() {
    let home = setup_home();
    add_office(home.path());

    geo(home.path())
        .args(["--at", "2025-06-01 09:00", "fix", "45.0", "7.0"])
        .assert()
        .success();
    geo(home.path())
        .args(["--at", "2025-06-01 09:05", "fix", "45.01", "7.0"])
        .assert()
        .success();

    geo(home.path())
        .args(["--at", "2025-06-01 12:00", "status"])
        .assert()
        .success()
        .stdout(contains("Office"))
        .stdout(contains("outside"))
        .stdout(contains("00h 05m"));
}

#[test]
fn test_status_projects_open_session() {
    let home = setup_home();
    add_office(home.path());

    geo(home.path())
        .args(["--at", "2025-06-01 09:00", "fix", "45.0", "7.0"])
        .assert()
        .success();

    // inside since 09:00, nothing stored yet, but the live total counts it
    geo(home.path())
        .args(["--at", "2025-06-01 10:30", "status"])
        .assert()
        .success()
        .stdout(contains("inside"))
        .stdout(contains("01h 30m"));
}

#[test]
fn test_status_from_position_shows_distance() {
    let home = setup_home();
    add_office(home.path());

    geo(home.path())
        .args(["--at", "2025-06-01 09:00", "status", "--lat", "45.01", "--lon", "7.0"])
        .assert()
        .success()
        .stdout(contains("1.1km"))
        .stdout(contains("outside"));
}

#[test]
fn test_status_single_event() {
    let home = setup_home();
    let id = add_office(home.path());
    common::add_event(home.path(), "2025-06-01 08:00", "Gym", "45.1", "7.1", "50");

    geo(home.path())
        .args(["--at", "2025-06-01 09:00", "status", "--event", &id])
        .assert()
        .success()
        .stdout(contains("Office").and(contains("Gym").not()));
}

#[test]
fn test_status_unknown_event_fails() {
    let home = setup_home();
    add_office(home.path());

    geo(home.path())
        .args(["status", "--event", "999"])
        .assert()
        .failure()
        .stderr(contains("Event not found: 999"));
}

#[test]
fn test_status_without_events() {
    let home = setup_home();
    geo(home.path())
        .args(["status"])
        .assert()
        .success()
        .stdout(contains("No active events"));
}

#[test]
fn test_status_rejects_invalid_position() {
    let home = setup_home();
    add_office(home.path());

    geo(home.path())
        .args(["status", "--lat", "NaN", "--lon", "0"])
        .assert()
        .failure()
        .stderr(contains("Invalid coordinate: latitude NaN"))
        .stdout(contains("NaNkm").not());

    geo(home.path())
        .args(["status", "--lat", "45", "--lon", "200"])
        .assert()
        .failure()
        .stderr(contains("longitude 200"));
}
