mod support;

use predicates::prelude::*;
use serde_json::Value;

use support::TestSheet;

fn json_output(sheet: &TestSheet, args: &[&str]) -> Value {
    let output = sheet
        .cmd()
        .args(args)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&output).expect("valid json")
}

fn add(sheet: &TestSheet, description: &str, date: &str, time: &str, category: &str) {
    sheet
        .cmd()
        .args([
            "add",
            description,
            "--date",
            date,
            "--time",
            time,
            "--category",
            category,
        ])
        .assert()
        .success();
}

#[test]
fn add_list_and_complete() {
    let sheet = TestSheet::new();
    add(&sheet, "A", "2024-03-10", "09:00", "catX");
    add(&sheet, "B", "2024-03-10", "14:00", "catY");
    add(&sheet, "C", "2024-03-09", "10:00", "catX");

    let listed = json_output(&sheet, &["list", "--date", "2024-03-10"]);
    let rows = listed.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1]["index"], 1);
    assert_eq!(rows[1]["task"]["description"], "B");

    sheet.cmd().args(["done", "0"]).assert().success();
    sheet.cmd().args(["done", "2"]).assert().success();

    let daily = json_output(&sheet, &["stats", "daily", "--date", "2024-03-10"]);
    assert_eq!(daily["completed"], 1);
    assert_eq!(daily["total"], 2);

    assert!(sheet.read().contains("2024-03-10,09:00:00,A,catX,True"));
}

#[test]
fn reminders_respect_the_window() {
    let sheet = TestSheet::new();
    add(&sheet, "Soon", "2024-03-10", "10:00", "Trabajo");
    add(&sheet, "Later", "2024-03-10", "10:20", "Trabajo");
    add(&sheet, "Past", "2024-03-10", "09:40", "Trabajo");

    let reminders = json_output(&sheet, &["remind", "--at", "2024-03-10 09:50"]);
    let reminders = reminders.as_array().expect("array");
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0]["task"]["description"], "Soon");
    assert_eq!(reminders[0]["minutes_until"], 10.0);

    sheet
        .cmd()
        .args(["remind", "--at", "2024-03-10 09:50"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Reminder: Soon (Trabajo) at 10:00:00",
        ));
}

#[test]
fn routines_only_count_for_habits() {
    let sheet = TestSheet::new();
    sheet
        .cmd()
        .args(["routine", "Stretch", "--category", "Salud"])
        .assert()
        .success();

    let routines = json_output(&sheet, &["routines"]);
    assert_eq!(routines.as_array().unwrap().len(), 1);

    let weekly = json_output(&sheet, &["stats", "weekly"]);
    assert!(weekly.as_array().unwrap().is_empty());

    let habits = json_output(&sheet, &["stats", "habits"]);
    assert_eq!(habits[0]["label"], "Salud");
    assert_eq!(habits[0]["total"], 1);
}

#[test]
fn delete_then_reuse_index() {
    let sheet = TestSheet::new();
    for name in ["first", "second", "third"] {
        add(&sheet, name, "2024-03-10", "09:00", "Otro");
    }
    sheet
        .cmd()
        .args(["delete", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted #0: first"));
    sheet
        .cmd()
        .args(["delete", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted #0: second"));
}

#[test]
fn user_errors_exit_with_code_two() {
    let sheet = TestSheet::new();
    sheet.cmd().args(["delete", "3"]).assert().code(2);
    sheet
        .cmd()
        .args(["add", "Gym", "--date", "someday"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognised date"));
}

#[test]
fn unavailable_sheet_exits_with_code_four() {
    let sheet = TestSheet::new();
    std::fs::write(sheet.dir().join("agenda.toml"), "create_if_missing = false\n").unwrap();
    sheet
        .cmd()
        .args(["list"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Could not open sheet"));
}

#[test]
fn habits_warn_when_category_column_is_missing() {
    let sheet = TestSheet::new();
    sheet.write("Date,Time,Description,Completed\n2024-03-10,09:00:00,Gym,True\n");
    sheet
        .cmd()
        .args(["stats", "habits"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Column 'Category' not found"));
}

#[test]
fn remind_says_so_when_nothing_is_due() {
    let sheet = TestSheet::new();
    add(&sheet, "Later", "2024-03-10", "11:00", "Trabajo");
    sheet
        .cmd()
        .args(["remind", "--at", "2024-03-10 09:50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing due soon."));
}
