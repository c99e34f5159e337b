mod common;

use std::fs;

use common::{in_memory_planner, setup_planner, temp_base_dir, ym};
use flowplan::{
    Config, ConfigManager, Direction, Horizon, Planner, PlannerError, TransactionDraft,
    TransactionPatch,
};

fn salary() -> TransactionDraft {
    TransactionDraft::monthly("Salary", 1000.0, Direction::Income, ym("2024-01"))
}

fn rent() -> TransactionDraft {
    TransactionDraft::monthly("Rent", 800.0, Direction::Expense, ym("2024-01"))
}

#[test]
fn create_scenario_uses_configured_defaults() {
    let mut planner = in_memory_planner();
    let id = planner.create_scenario("Base", ym("2024-01")).expect("scenario");

    let scenario = planner.scenario(id).expect("lookup");
    assert_eq!(scenario.horizon, Horizon::TwelveMonths);
    assert_eq!(scenario.starting_balance, 0.0);
    assert_eq!(planner.project(id).expect("projection").len(), 12);
    assert!(planner.data_dir().is_none());
}

#[test]
fn planner_projects_concrete_scenario() {
    let mut planner = in_memory_planner();
    let id = planner
        .create_scenario_with(None, "Base", 1000.0, ym("2024-01"), Horizon::Custom(3))
        .expect("scenario");
    planner.add_transaction(id, salary()).expect("salary");
    planner.add_transaction(id, rent()).expect("rent");
    planner
        .add_transaction(
            id,
            TransactionDraft::one_off("Gift", 150.0, Direction::Income, ym("2024-04")),
        )
        .expect("gift");

    let balances: Vec<f64> = planner
        .project(id)
        .expect("projection")
        .iter()
        .map(|row| row.balance)
        .collect();
    assert_eq!(balances, [1200.0, 1400.0, 1600.0]);
}

#[test]
fn planner_rejects_invalid_payloads() {
    let mut planner = in_memory_planner();
    let id = planner.create_scenario("Base", ym("2024-01")).expect("scenario");

    let err = planner
        .add_transaction(
            id,
            TransactionDraft::one_off("Broken", -10.0, Direction::Expense, ym("2024-01")),
        )
        .expect_err("negative amount");
    assert!(matches!(err, PlannerError::InvalidInput(_)));

    let blank = TransactionDraft::monthly("", 1.0, Direction::Income, ym("2024-01"));
    let err = planner
        .add_transactions(id, vec![salary(), blank])
        .expect_err("blank label");
    assert!(matches!(err, PlannerError::InvalidInput(_)));
    assert!(planner.transactions(id).expect("transactions").is_empty());

    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        planner.delete_transaction(id, missing),
        Err(PlannerError::TransactionNotFound(_))
    ));
    assert!(matches!(
        planner.undo(missing),
        Err(PlannerError::ScenarioNotFound(_))
    ));
}

#[test]
fn planner_undo_redo_roundtrip() {
    let mut planner = in_memory_planner();
    let id = planner.create_scenario("Base", ym("2024-01")).expect("scenario");
    let a = planner.add_transaction(id, salary()).expect("a");
    let b = planner.add_transaction(id, rent()).expect("b");

    assert!(planner.undo(id).expect("undo"));
    let ids: Vec<_> = planner.transactions(id).expect("list").iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![a]);

    assert!(planner.redo(id).expect("redo"));
    let ids: Vec<_> = planner.transactions(id).expect("list").iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![a, b]);
    assert!(!planner.redo(id).expect("nothing to redo"));
}

#[test]
fn planner_add_with_existing_id_undoes_to_original() {
    let mut planner = in_memory_planner();
    let id = planner.create_scenario("Base", ym("2024-01")).expect("scenario");
    let salary_id = planner.add_transaction(id, salary()).expect("salary");

    let replay = TransactionDraft {
        id: Some(salary_id),
        ..TransactionDraft::monthly("Wages", 900.0, Direction::Income, ym("2024-01"))
    };
    assert_eq!(planner.add_transaction(id, replay).expect("replay"), salary_id);
    assert_eq!(planner.transactions(id).expect("list").len(), 1);

    assert!(planner.undo(id).expect("undo"));
    let restored = planner.transactions(id).expect("list");
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].label, "Salary");
    assert_eq!(restored[0].amount, 1000.0);
}

#[test]
fn planner_rejects_windows_past_last_representable_month() {
    let mut planner = in_memory_planner();
    let err = planner
        .create_scenario_with(None, "Late", 0.0, ym("9999-11"), Horizon::Custom(3))
        .expect_err("window overflows");
    assert!(matches!(err, PlannerError::InvalidInput(_)));
}

#[test]
fn projections_refresh_after_mutations() {
    let mut planner = in_memory_planner();
    let id = planner.create_scenario("Base", ym("2024-01")).expect("scenario");
    let salary_id = planner.add_transaction(id, salary()).expect("salary");
    assert_eq!(planner.summary(id).expect("summary").ending_balance, 12_000.0);

    planner
        .update_transaction(id, salary_id, TransactionPatch::amount(500.0))
        .expect("update");
    assert_eq!(planner.summary(id).expect("summary").ending_balance, 6_000.0);

    planner.undo(id).expect("undo");
    assert_eq!(planner.summary(id).expect("summary").ending_balance, 12_000.0);
}

#[test]
fn compare_branch_against_baseline() {
    let mut planner = in_memory_planner();
    let base = planner.create_scenario("Base", ym("2024-01")).expect("scenario");
    planner.add_transaction(base, salary()).expect("salary");
    let branch = planner.duplicate_scenario(base, "Frugal").expect("duplicate");
    planner.add_transaction(branch, rent()).expect("rent");

    let deltas = planner.compare(base, branch).expect("compare");
    assert_eq!(deltas.len(), 12);
    assert!(deltas.iter().all(|delta| delta.expense == 800.0));
    assert_eq!(deltas[11].balance, -9_600.0);

    let overview = planner.overview().expect("overview");
    let names: Vec<&str> = overview.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, ["Base", "Frugal"]);
    assert_eq!(overview[1].transaction_count, 2);
}

#[test]
fn export_projection_writes_year_month_tokens() {
    let mut planner = in_memory_planner();
    let id = planner
        .create_scenario_with(None, "Base", 0.0, ym("2024-12"), Horizon::Custom(2))
        .expect("scenario");

    let json = planner.export_projection(id).expect("export");
    assert!(json.contains("\"2024-12\""));
    assert!(json.contains("\"2025-01\""));
}

#[test]
fn save_all_requires_storage() {
    let planner = in_memory_planner();
    assert!(matches!(planner.save_all(), Err(PlannerError::NotPersistent)));
}

#[test]
fn persistent_planner_autosaves_and_reopens() {
    let (mut planner, base) = setup_planner();
    let plan = planner.create_planification("Household").expect("plan");
    let id = planner
        .create_scenario_with(Some(plan), "Base", 250.0, ym("2024-01"), Horizon::EighteenMonths)
        .expect("scenario");
    let salary_id = planner.add_transaction(id, salary()).expect("salary");
    planner.add_transaction(id, rent()).expect("rent");
    planner
        .update_transaction(id, salary_id, TransactionPatch::label("Wages"))
        .expect("update");
    planner.rename_scenario(id, "Household base").expect("rename");
    drop(planner);

    let mut reopened = Planner::open(base).expect("reopen");
    let scenario = reopened.scenario(id).expect("restored scenario");
    assert_eq!(scenario.name, "Household base");
    assert_eq!(scenario.planification_id, Some(plan));
    assert!(reopened.workspace().planification(plan).is_some());
    let labels: Vec<String> = reopened
        .transactions(id)
        .expect("transactions")
        .iter()
        .map(|t| t.label.clone())
        .collect();
    assert_eq!(labels, ["Wages", "Rent"]);
    assert!(!reopened.undo(id).expect("history is not persisted"));
    assert_eq!(reopened.project(id).expect("projection").len(), 18);
}

#[test]
fn removing_scenario_deletes_its_snapshot() {
    let (mut planner, _base) = setup_planner();
    let id = planner.create_scenario("Temp", ym("2024-01")).expect("scenario");
    let dir = planner.data_dir().expect("persistent").to_path_buf();
    assert!(dir.join(format!("{id}.json")).exists());

    planner.remove_scenario(id).expect("remove");
    assert!(!dir.join(format!("{id}.json")).exists());
    assert_eq!(planner.save_all().expect("save"), 0);
}

#[test]
fn corrupt_snapshot_is_skipped_on_open() {
    let (mut planner, base) = setup_planner();
    let good = planner.create_scenario("Good", ym("2024-01")).expect("scenario");
    let dir = planner.data_dir().expect("persistent").to_path_buf();
    fs::write(dir.join(format!("{}.json", uuid::Uuid::new_v4())), "{ not json").expect("write");
    drop(planner);

    let reopened = Planner::open(base).expect("reopen despite corrupt file");
    assert!(reopened.scenario(good).is_ok());
    assert_eq!(reopened.workspace().scenarios().count(), 1);
}

#[test]
fn stored_config_drives_new_scenarios() {
    let base = temp_base_dir();
    let manager = ConfigManager::with_base_dir(base.clone()).expect("config manager");
    manager
        .save(&Config {
            default_horizon_months: 24,
            default_starting_balance: 300.0,
            history_capacity: 2,
            ..Config::default()
        })
        .expect("save config");

    let mut planner = Planner::open(base).expect("open");
    let id = planner.create_scenario("Long", ym("2024-01")).expect("scenario");
    assert_eq!(planner.project(id).expect("projection").len(), 24);
    assert_eq!(planner.scenario(id).expect("scenario").starting_balance, 300.0);

    for _ in 0..4 {
        planner.add_transaction(id, salary()).expect("add");
    }
    assert!(planner.undo(id).expect("undo 1"));
    assert!(planner.undo(id).expect("undo 2"));
    assert!(!planner.undo(id).expect("capacity reached"));
    assert_eq!(planner.transactions(id).expect("list").len(), 2);
}
