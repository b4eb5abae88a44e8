
use approx::assert_relative_eq;
use assert_cmd::prelude::*;
use cli_helpers::{base_cmd, run_cmd, run_json, write_config};
use predicates::prelude::*;
use tempfile::TempDir;

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn rates_offline_shows_fallback_without_ansi() {
    let home = setup_temp_home();

    base_cmd(&home)
        .arg("rates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tesouro Selic"))
        .stdout(predicate::str::contains("1,17% a.m."))
        .stdout(predicate::str::contains("fallback rates in use"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn rates_json_has_product_view_shape() {
    let home = setup_temp_home();
    let json = run_json(&home, &["rates"]).unwrap();

    assert_eq!(json["SELIC"]["name"], "Tesouro Selic");
    assert_eq!(json["SELIC"]["taxa"], 1.17);
    assert_eq!(json["CDB"]["taxa"], 1.16);
    assert_eq!(json["LCI_LCA"]["taxa"], 1.0092);
    assert_eq!(json["FUNDO"]["taxa"], 0.87);
    let updated = json["ultimaAtualizacao"].as_str().unwrap();
    assert!(updated.ends_with('Z'));
}

#[test]
fn simulate_single_product_json() {
    let home = setup_temp_home();
    let json = run_json(&home, &["simulate", "1000", "-i", "selic", "-m", "12"]).unwrap();

    let projections = json.as_array().unwrap();
    assert_eq!(projections.len(), 1);
    assert_eq!(projections[0]["investment"]["key"], "SELIC");

    let series = projections[0]["series"].as_array().unwrap();
    assert_eq!(series.len(), 13);
    assert_eq!(series[0]["value"].as_f64().unwrap(), 1000.0);
    assert_relative_eq!(
        series[12]["value"].as_f64().unwrap(),
        1149.7965,
        epsilon = 1e-3
    );
}

#[test]
fn simulate_uses_configured_horizon() {
    let home = setup_temp_home();
    write_config(&home, "horizon_months = 6\n");

    let json = run_json(&home, &["simulate", "500"]).unwrap();
    let projections = json.as_array().unwrap();
    assert_eq!(projections.len(), 4);
    assert!(projections
        .iter()
        .all(|p| p["series"].as_array().unwrap().len() == 7));
}

#[test]
fn simulate_table_output() {
    let home = setup_temp_home();
    let output = run_cmd(
        &home,
        &["simulate", "1000", "--investment", "CDB", "--months", "3"],
    )
    .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Growth of R$ 1.000,00"));
    assert!(stdout.contains("CDB"));
    assert!(!stdout.contains("\u{001b}["));
}

#[test]
fn compare_ranks_selic_first() {
    let home = setup_temp_home();
    let json = run_json(&home, &["compare", "1000"]).unwrap();

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["investment_key"], "SELIC");
    assert_eq!(rows[0]["final_value"].as_f64().unwrap(), 1149.8);
    assert_eq!(rows[3]["investment_key"], "FUNDO");
}

#[test]
fn goal_reports_months_for_best_product() {
    let home = setup_temp_home();
    let json = run_json(&home, &["goal", "2000", "1000"]).unwrap();

    assert_eq!(json["investment_key"], "SELIC");
    assert_eq!(json["months_required"], 60);
    assert_eq!(json["final_value"].as_f64().unwrap(), 2000.0);
    assert_eq!(json["gain"].as_f64().unwrap(), 1000.0);
}

#[test]
fn goal_already_met_is_rejected() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["goal", "1000", "5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("goal already met"));
}

#[test]
fn negative_initial_is_rejected() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["compare", "-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("initial amount must be positive"));
}

#[test]
fn minimum_for_single_product() {
    let home = setup_temp_home();
    let json = run_json(&home, &["minimum", "10000", "12", "-i", "cdb"]).unwrap();

    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["minimum_initial"].as_f64().unwrap(), 8707.51);
}

#[test]
fn plan_with_monthly_deposits() {
    let home = setup_temp_home();
    let json = run_json(&home, &["plan", "10000", "--monthly", "500"]).unwrap();

    let ranked = json.as_array().unwrap();
    assert_eq!(ranked.len(), 4);
    assert_eq!(ranked[0]["investment"]["key"], "SELIC");
    assert_eq!(ranked[0]["solution"]["months_required"], 19);
    assert_eq!(ranked[0]["solution"]["total_contributed"].as_f64().unwrap(), 9500.0);
}

#[test]
fn plan_requires_positive_deposit() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["plan", "10000", "--monthly", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("monthly contribution must be positive"));
}

#[test]
fn convert_offline_uses_fallback_quote() {
    let home = setup_temp_home();
    let json = run_json(&home, &["convert", "100"]).unwrap();

    assert_eq!(json["from"], "BRL");
    assert_eq!(json["to"], "USD");
    assert_eq!(json["rate"].as_f64().unwrap(), 0.2);
    assert_relative_eq!(json["converted"].as_f64().unwrap(), 20.0, epsilon = 1e-9);

    let output = run_cmd(&home, &["convert", "10", "--from", "usd", "--to", "brl"]).unwrap();
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "US$ 10,00 = R$ 50,00\n"
    );
}

#[test]
fn invalid_config_fails_with_path() {
    let home = setup_temp_home();
    write_config(&home, "cache_ttl_secs = 0\n");

    base_cmd(&home)
        .arg("rates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"));
}

#[test]
fn oversized_cache_ttl_is_rejected_at_startup() {
    let home = setup_temp_home();
    write_config(&home, "cache_ttl_secs = 9223372036854775807\n");

    base_cmd(&home)
        .arg("rates")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cache_ttl_secs must be at most"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn horizon_beyond_month_limit_is_rejected() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["compare", "1000", "-m", "3000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the limit of 1200"));
}

#[test]
fn unknown_investment_is_a_usage_error() {
    let home = setup_temp_home();

    base_cmd(&home)
        .args(["simulate", "1000", "-i", "poupanca"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown investment"));
}

#[test]
fn no_subcommand_when_piped_prints_help() {
    let home = setup_temp_home();

    base_cmd(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}
