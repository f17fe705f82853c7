#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn msprint(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("msprint").unwrap();
    cmd.current_dir(dir.path())
        .env("MSPRINT_ROOT", dir.path())
        .env_remove("RUST_LOG");
    cmd
}

fn init_project(dir: &TempDir) {
    msprint(dir).args(["init", "Demo Project"]).assert().success();
}

/// Run with `--json` and parse stdout, failing loudly on a non-zero exit.
fn json(dir: &TempDir, args: &[&str]) -> Value {
    let out = msprint(dir).arg("--json").args(args).output().unwrap();
    assert!(
        out.status.success(),
        "msprint {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap()
}

fn card_on_disk(dir: &TempDir) -> Value {
    let data = std::fs::read_to_string(dir.path().join(".msprint/card.json")).unwrap();
    serde_json::from_str(&data).unwrap()
}

fn approx(value: &Value, expected: f64) -> bool {
    (value.as_f64().unwrap() - expected).abs() < 1e-9
}

/// One in-progress sprint with micro-sprints weighted 0.6 / 0.4 and two tasks
/// in the first. Returns (sprint, first micro, second micro, tasks).
fn seed_sprint(dir: &TempDir) -> (String, String, String, Vec<String>) {
    let sprint = json(dir, &["sprint", "add", "Foundations", "--days", "10"]);
    let sprint_id = sprint["sprint_id"].as_str().unwrap().to_string();
    json(dir, &["sprint", "start", &sprint_id]);

    let ms1 = json(dir, &["micro", "add", &sprint_id, "Backend", "--weight", "0.6"]);
    let ms1 = ms1["micro_sprint_id"].as_str().unwrap().to_string();
    let ms2 = json(dir, &["micro", "add", &sprint_id, "Frontend", "--weight", "0.4"]);
    let ms2 = ms2["micro_sprint_id"].as_str().unwrap().to_string();

    let tasks = ["Schema", "Handlers"]
        .iter()
        .map(|&d| {
            let t = json(dir, &["task", "add", &ms1, d, "--hours", "2"]);
            t["task_id"].as_str().unwrap().to_string()
        })
        .collect();
    (sprint_id, ms1, ms2, tasks)
}

// ---------------------------------------------------------------------------
// msprint init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_config_and_card() {
    let dir = TempDir::new().unwrap();
    msprint(&dir)
        .args(["init", "Demo Project", "--type", "legal_case", "--owner", "sam"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .msprint/card.json"));

    assert!(dir.path().join(".msprint/config.yaml").exists());
    let card = card_on_disk(&dir);
    assert_eq!(card["project"]["name"], "Demo Project");
    assert_eq!(card["project"]["type"], "legal_case");
    assert_eq!(card["project"]["owner"], "sam");
    assert_eq!(card["app_metadata"]["file_format_version"], "1.0");
    assert!(card["personas"]["lawyer"].is_object());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let before = card_on_disk(&dir);

    msprint(&dir)
        .args(["init", "Other Name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:"));
    assert_eq!(card_on_disk(&dir), before);
}

#[test]
fn init_rejects_unknown_project_type() {
    let dir = TempDir::new().unwrap();
    msprint(&dir)
        .args(["init", "X", "--type", "gardening"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project type"));
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    msprint(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

// ---------------------------------------------------------------------------
// Rollup through the editing commands
// ---------------------------------------------------------------------------

#[test]
fn completing_tasks_rolls_up_to_sprint_and_project() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (sprint_id, _, ms2, tasks) = seed_sprint(&dir);

    let toggled = json(&dir, &["task", "toggle", &tasks[0]]);
    assert_eq!(toggled["status"], "completed");
    assert!(approx(&toggled["parent"]["micro_sprint_completion"], 50.0));
    assert!(approx(&toggled["parent"]["sprint_completion"], 30.0));

    let status = json(&dir, &["status"]);
    assert!(approx(&status["macro_analysis"]["overall_project_completion"], 30.0));
    assert_eq!(status["project"]["current_sprint"], sprint_id.as_str());
    assert_eq!(status["current_sprint"]["current_velocity"], 1);

    // Finishing the first micro-sprint completes it automatically.
    json(&dir, &["task", "toggle", &tasks[1]]);
    let micros = json(&dir, &["micro", "list", "--sprint", &sprint_id]);
    assert_eq!(micros[0]["status"], "completed");
    assert!(approx(&micros[0]["completion_percentage"], 100.0));

    // The last task pushes the weighted sprint past the tolerance.
    let last = json(&dir, &["task", "add", &ms2, "Layout"]);
    let last = last["task_id"].as_str().unwrap().to_string();
    json(&dir, &["task", "toggle", &last]);

    let sprints = json(&dir, &["sprint", "list"]);
    assert_eq!(sprints[0]["status"], "completed");
    assert_eq!(sprints[0]["sprint_summary"]["completed_micro_sprints"], 2);

    let status = json(&dir, &["status"]);
    assert_eq!(status["macro_analysis"]["sprints_completed"], 1);
    assert!(approx(&status["macro_analysis"]["overall_project_completion"], 100.0));
    assert!(status["current_sprint"].is_null());
}

#[test]
fn toggle_defaults_actual_hours_to_estimate() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, _, _, tasks) = seed_sprint(&dir);

    json(&dir, &["task", "toggle", &tasks[0]]);
    let status = json(&dir, &["status"]);
    assert!(approx(&status["macro_analysis"]["total_hours_invested"], 2.0));
    assert!(approx(&status["macro_analysis"]["total_hours_estimated_remaining"], 2.0));

    // Toggling back keeps the logged hours but reopens the task.
    let back = json(&dir, &["task", "toggle", &tasks[0]]);
    assert_eq!(back["status"], "pending");
}

#[test]
fn blocked_task_is_reported_in_snapshot() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, _, _, tasks) = seed_sprint(&dir);

    msprint(&dir)
        .args(["task", "block", &tasks[1], "waiting", "on", "review"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocked task"));

    let status = json(&dir, &["status"]);
    assert_eq!(status["current_sprint"]["blocked_tasks"], 1);

    msprint(&dir)
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("blocked: waiting on review"));
}

#[test]
fn logging_hours_updates_efficiency() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, _, _, tasks) = seed_sprint(&dir);

    json(&dir, &["task", "hours", &tasks[0], "3"]);
    let sprints = json(&dir, &["sprint", "list"]);
    // 3 actual over 4 estimated.
    assert!(approx(&sprints[0]["sprint_summary"]["efficiency_ratio"], 0.75));
}

#[test]
fn task_edit_and_remove() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, ms1, _, tasks) = seed_sprint(&dir);

    json(
        &dir,
        &["task", "edit", &tasks[0], "--description", "Design schema", "--hours", "5"],
    );
    let listed = json(&dir, &["task", "list", "--micro", &ms1]);
    assert_eq!(listed[0]["description"], "Design schema");
    assert!(approx(&listed[0]["estimated_hours"], 5.0));

    json(&dir, &["task", "remove", &tasks[1]]);
    let listed = json(&dir, &["task", "list", "--micro", &ms1]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[test]
fn unknown_ids_fail() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    msprint(&dir)
        .args(["task", "toggle", "task_missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("task not found: task_missing"));
    msprint(&dir)
        .args(["micro", "add", "sprint_missing", "Anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sprint not found"));
}

#[test]
fn out_of_range_weight_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, ms1, _, _) = seed_sprint(&dir);

    msprint(&dir)
        .args(["micro", "weight", &ms1, "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid weight"));
}

#[test]
fn removing_the_current_sprint_moves_current_pointer() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (sprint_id, _, _, _) = seed_sprint(&dir);
    let next = json(&dir, &["sprint", "add", "Polish"]);
    let next_id = next["sprint_id"].as_str().unwrap().to_string();

    json(&dir, &["sprint", "remove", &sprint_id]);
    let status = json(&dir, &["status"]);
    assert_eq!(status["project"]["current_sprint"], next_id.as_str());
    assert_eq!(status["macro_analysis"]["sprints_pending"], 1);
}

// ---------------------------------------------------------------------------
// rollup / import / export / draft
// ---------------------------------------------------------------------------

#[test]
fn rollup_repairs_hand_edited_card() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (_, _, _, tasks) = seed_sprint(&dir);
    json(&dir, &["task", "toggle", &tasks[0]]);

    let path = dir.path().join(".msprint/card.json");
    let mut card = card_on_disk(&dir);
    card["sprints"][0]["completion_percentage"] = Value::from(87.5);
    card["performance_analytics"]["macro_analysis"]["overall_project_completion"] =
        Value::from("lots");
    std::fs::write(&path, serde_json::to_string_pretty(&card).unwrap()).unwrap();

    let first = json(&dir, &["rollup"]);
    assert_eq!(first["changed"], true);
    assert!(approx(&first["overall_project_completion"], 30.0));
    assert!(approx(&card_on_disk(&dir)["sprints"][0]["completion_percentage"], 30.0));

    let second = json(&dir, &["rollup"]);
    assert_eq!(second["changed"], false);
}

#[test]
fn rollup_rewrites_coerced_values() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    seed_sprint(&dir);

    let path = dir.path().join(".msprint/card.json");
    let mut card = card_on_disk(&dir);
    let tasks = &mut card["sprints"][0]["micro_sprints"][0]["tasks"];
    tasks[0]["estimated_hours"] = Value::from("2");
    tasks[1]["status"] = Value::from("someday");
    std::fs::write(&path, serde_json::to_string_pretty(&card).unwrap()).unwrap();

    let first = json(&dir, &["rollup"]);
    assert_eq!(first["changed"], true);
    assert_eq!(first["stale"], false);
    assert_eq!(first["normalized"], true);

    let tasks = card_on_disk(&dir)["sprints"][0]["micro_sprints"][0]["tasks"].clone();
    assert!(approx(&tasks[0]["estimated_hours"], 2.0));
    assert_eq!(tasks[1]["status"], "pending");

    let second = json(&dir, &["rollup"]);
    assert_eq!(second["changed"], false);
}

#[test]
fn sprint_past_end_of_calendar_is_rejected() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    msprint(&dir)
        .args(["sprint", "add", "Forever", "--days", "4294967295"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid duration"));
    assert_eq!(card_on_disk(&dir)["sprints"].as_array().unwrap().len(), 0);
}

#[test]
fn export_writes_dated_copy_and_records_it() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let out = dir.path().join("exports");

    let result = json(&dir, &["export", "--out", out.to_str().unwrap()]);
    let written = result["path"].as_str().unwrap();
    let file_name = std::path::Path::new(written)
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    assert!(file_name.starts_with("project_demo_project_"));
    assert!(file_name.ends_with(".json"));

    let exported: Value =
        serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
    assert_eq!(exported["project"]["name"], "Demo Project");
    assert_eq!(exported["export_history"].as_array().unwrap().len(), 0);

    let history = card_on_disk(&dir)["export_history"].clone();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["path"], written);
}

#[test]
fn import_refuses_to_overwrite_without_force() {
    let source = TempDir::new().unwrap();
    init_project(&source);
    seed_sprint(&source);
    let file = source.path().join(".msprint/card.json");

    let target = TempDir::new().unwrap();
    init_project(&target);
    msprint(&target)
        .args(["import", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    let imported = json(&target, &["import", file.to_str().unwrap(), "--force"]);
    assert_eq!(imported["sprints"], 1);
}

#[test]
fn import_into_bare_directory_creates_config() {
    let source = TempDir::new().unwrap();
    init_project(&source);
    let file = source.path().join(".msprint/card.json");

    let target = TempDir::new().unwrap();
    json(&target, &["import", file.to_str().unwrap()]);
    assert!(target.path().join(".msprint/config.yaml").exists());
    assert_eq!(card_on_disk(&target)["project"]["name"], "Demo Project");
}

#[test]
fn draft_hydrates_outline() {
    let dir = TempDir::new().unwrap();
    let outline = dir.path().join("outline.yaml");
    std::fs::write(
        &outline,
        r#"
name: Supplier Contracts
sprints:
  - name: Intake
    micro_sprints:
      - name: Collect
        tasks:
          - description: Request originals
            estimated_hours: 3
      - name: Triage
  - name: Opinions
"#,
    )
    .unwrap();

    let result = json(
        &dir,
        &[
            "draft",
            outline.to_str().unwrap(),
            "--type",
            "legal_case",
            "--persona",
            "lawyer",
            "--start",
            "2026-03-02",
        ],
    );
    assert_eq!(result["sprints"], 2);
    assert_eq!(result["tasks"], 1);
    assert_eq!(result["current_sprint"], "sprint_1");

    let card = card_on_disk(&dir);
    assert_eq!(card["project"]["active_persona"], "lawyer");
    assert_eq!(card["sprints"][0]["start_date"], "2026-03-02");
    assert_eq!(card["sprints"][1]["start_date"], "2026-03-10");
    assert!(approx(&card["sprints"][0]["micro_sprints"][1]["weight_in_sprint"], 0.5));

    // A second draft must not clobber the card.
    msprint(&dir)
        .args(["draft", outline.to_str().unwrap()])
        .assert()
        .failure();
}

// ---------------------------------------------------------------------------
// persona / decision / config
// ---------------------------------------------------------------------------

#[test]
fn persona_toggle_and_show() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    let toggled = json(&dir, &["persona", "toggle"]);
    assert_eq!(toggled["active_persona"], "lawyer");
    msprint(&dir)
        .args(["persona", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legal Specialist"));

    json(&dir, &["persona", "set", "engineer"]);
    assert_eq!(card_on_disk(&dir)["project"]["active_persona"], "software_engineer");
}

#[test]
fn decision_add_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let (sprint_id, _, _, _) = seed_sprint(&dir);

    json(
        &dir,
        &[
            "decision", "add", "Use", "Postgres", "--rationale", "team knows it",
            "--alternative", "SQLite", "--sprint", &sprint_id,
        ],
    );
    let log = json(&dir, &["decision", "list"]);
    assert_eq!(log[0]["decision"], "Use Postgres");
    assert_eq!(log[0]["alternatives_considered"][0], "SQLite");
    assert_eq!(log[0]["sprint_context"], sprint_id.as_str());

    msprint(&dir)
        .args(["decision", "add", "Orphan", "--sprint", "sprint_missing"])
        .assert()
        .failure();
}

#[test]
fn config_defaults_feed_new_items() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);

    msprint(&dir)
        .args(["config", "set", "sprint_duration_days", "14"])
        .assert()
        .success();
    let sprint = json(&dir, &["sprint", "add", "Long", "--start", "2026-05-01"]);
    assert_eq!(sprint["planned_end_date"], "2026-05-15");

    msprint(&dir)
        .args(["config", "set", "micro_sprint_weight", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to save"));
    msprint(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}
