//! End-to-end tests for the scenario runner
//!
//! These tests drive the subscription form fixture through:
//! 1. The library API (runner + in-memory site provider)
//! 2. The compiled `scenario-runner` binary

use std::path::PathBuf;
use std::process::Command;

use scenario_runner::common::config::Config;
use scenario_runner::page::{MemorySession, SiteModel};
use scenario_runner::report::ReportCollector;
use scenario_runner::scenario::{run_scenario, TitlePattern};
use scenario_runner::{ErrorKind, Outcome, PageSession, Role, ScenarioRunner, Step};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fast_config() -> Config {
    Config::load_from(&fixture("fast.toml")).expect("Failed to load fast.toml")
}

fn session() -> MemorySession {
    let site = SiteModel::load(&fixture("subscription_site.yaml")).expect("Failed to load site");
    MemorySession::with_timeouts(site, &fast_config().timeouts)
}

fn locate(role: Role, name: &str) -> Step {
    Step::Locate {
        role,
        name: name.to_string(),
    }
}

fn title(pattern: &str) -> Step {
    Step::AssertTitle {
        pattern: TitlePattern::new(pattern).unwrap(),
    }
}

/// The subscription flow, with the expected email value as a parameter
fn subscription_steps(expected_email: &str) -> Vec<Step> {
    vec![
        Step::Navigate {
            url: "http://localhost:8000/".to_string(),
        },
        title("/Subscription Form/"),
        locate(Role::Textbox, "Enter email"),
        Step::Fill {
            value: "abc123@mail.com".to_string(),
        },
        Step::AssertValue {
            expected: expected_email.to_string(),
        },
        locate(Role::Textbox, "Enter city"),
        Step::Fill {
            value: "kyiv".to_string(),
        },
        Step::AssertValue {
            expected: "kyiv".to_string(),
        },
        locate(Role::Radio, "Hourly"),
        Step::Check,
        locate(Role::Radio, "Daily"),
        Step::Check,
        Step::AssertChecked,
        locate(Role::Button, "Subscribe"),
        Step::Click,
        title("/Confirmation Request/"),
    ]
}

#[tokio::test]
async fn test_subscription_flow_succeeds() {
    let mut session = session();
    let mut sink = ReportCollector::new();

    let outcome = ScenarioRunner::new()
        .run(
            "subscribe",
            &subscription_steps("abc123@mail.com"),
            &mut session,
            &mut sink,
        )
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Succeeded);
    let report = sink.into_report();
    assert_eq!(report.steps_passed, 16);
    assert_eq!(report.verdicts.len(), 5);

    let submission = &session.submissions()[0];
    assert_eq!(submission.fields["Enter email"], "abc123@mail.com");
    assert_eq!(submission.fields["Enter city"], "kyiv");
    assert_eq!(submission.fields["period"], "Daily");
}

#[tokio::test]
async fn test_wrong_value_fails_at_step_four() {
    let mut session = session();
    let mut sink = ReportCollector::new();

    let outcome = ScenarioRunner::new()
        .run(
            "wrong email",
            &subscription_steps("wrong@mail.com"),
            &mut session,
            &mut sink,
        )
        .await
        .unwrap();

    let failure = outcome.failure().expect("Expected a failure");
    assert_eq!(failure.step_index, 4);
    assert_eq!(failure.kind, ErrorKind::Assertion);

    // Nothing after the failing step ran
    assert!(session.submissions().is_empty());
    let report = sink.into_report();
    assert_eq!(report.steps_passed, 4);
    let last = report.verdicts.last().unwrap();
    assert!(!last.passed);
    assert_eq!(last.expected, "'wrong@mail.com'");
    assert_eq!(last.actual, "'abc123@mail.com'");
}

#[tokio::test]
async fn test_nonexistent_element_is_locator_error() {
    let steps = vec![
        Step::Navigate {
            url: "http://localhost:8000/".to_string(),
        },
        locate(Role::Textbox, "Nonexistent"),
    ];
    let outcome = ScenarioRunner::new()
        .run("missing", &steps, &mut session(), &mut ReportCollector::new())
        .await
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.step_index, 1);
    assert_eq!(failure.kind, ErrorKind::Locator);
}

#[tokio::test]
async fn test_unreachable_url_is_navigation_error() {
    let steps = vec![Step::Navigate {
        url: "http://localhost:9999/".to_string(),
    }];
    let outcome = ScenarioRunner::new()
        .run("offline", &steps, &mut session(), &mut ReportCollector::new())
        .await
        .unwrap();

    assert_eq!(outcome.failure().unwrap().kind, ErrorKind::Navigation);
}

#[tokio::test]
async fn test_fill_on_radio_is_interaction_error() {
    let steps = vec![
        Step::Navigate {
            url: "http://localhost:8000/".to_string(),
        },
        locate(Role::Radio, "Daily"),
        Step::Fill {
            value: "kyiv".to_string(),
        },
    ];
    let outcome = ScenarioRunner::new()
        .run("bad fill", &steps, &mut session(), &mut ReportCollector::new())
        .await
        .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.step_index, 2);
    assert_eq!(failure.kind, ErrorKind::Interaction);
}

#[tokio::test]
async fn test_radio_group_keeps_exactly_one_checked() {
    let sequences: [&[&str]; 4] = [
        &["Hourly"],
        &["Hourly", "Daily"],
        &["Daily", "Hourly", "Daily"],
        &["Daily", "Daily", "Hourly"],
    ];

    for sequence in sequences {
        let mut s = session();
        s.navigate("http://localhost:8000/").await.unwrap();
        let hourly = s.locate(Role::Radio, "Hourly").await.unwrap();
        let daily = s.locate(Role::Radio, "Daily").await.unwrap();

        for name in sequence {
            let radio = if *name == "Hourly" { &hourly } else { &daily };
            s.check(radio).await.unwrap();
        }

        let checked = [
            s.is_checked(&hourly).await.unwrap(),
            s.is_checked(&daily).await.unwrap(),
        ];
        assert_eq!(
            checked.iter().filter(|c| **c).count(),
            1,
            "sequence {sequence:?}"
        );
        let last = sequence.last().unwrap();
        assert_eq!(checked[1], *last == "Daily", "sequence {sequence:?}");
    }
}

#[tokio::test]
async fn test_scenario_file_with_random_email() {
    let mut sink = ReportCollector::new();
    let outcome = run_scenario(
        &fixture("subscribe.yaml"),
        &fast_config(),
        &ScenarioRunner::new(),
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(outcome, Outcome::Succeeded);
    let report = sink.into_report();
    assert_eq!(report.name, "subscribe to daily forecast");
    let email = &report.verdicts[1];
    assert!(email.passed);
    assert!(email.actual.ends_with("@mail.com'"));
}

#[tokio::test]
async fn test_scenario_file_failure_outcome() {
    let outcome = run_scenario(
        &fixture("wrong_email.yaml"),
        &fast_config(),
        &ScenarioRunner::new(),
        &mut ReportCollector::new(),
    )
    .await
    .unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.step_index, 4);
    assert_eq!(failure.kind, ErrorKind::Assertion);
}

// === Binary tests ===

fn scenario_runner() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_scenario-runner"));
    cmd.arg("--config").arg(fixture("fast.toml"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_cli_run_passes() {
    let output = scenario_runner()
        .arg("run")
        .arg(fixture("subscribe.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stdout: {stdout}");
    assert!(stdout.contains("Scenario Passed"));
}

#[test]
fn test_cli_run_reports_failure_and_exit_code() {
    let output = scenario_runner()
        .arg("run")
        .arg(fixture("subscribe.yaml"))
        .arg(fixture("missing_element.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[LocatorError]"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 of 2 scenarios failed"));
}

#[test]
fn test_cli_json_report() {
    let output = scenario_runner()
        .arg("run")
        .arg("--json")
        .arg(fixture("wrong_email.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    assert!(!output.status.success());
    let reports: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    let outcome = &reports[0]["outcome"];
    assert_eq!(outcome["status"], "Failed");
    assert_eq!(outcome["step_index"], 4);
    assert_eq!(outcome["kind"], "AssertionError");
}

#[test]
fn test_cli_json_keeps_reports_before_error() {
    let output = scenario_runner()
        .arg("run")
        .arg("--json")
        .arg(fixture("subscribe.yaml"))
        .arg(fixture("does_not_exist.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    assert!(!output.status.success());
    let reports: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
    assert_eq!(reports.as_array().map(Vec::len), Some(1));
    assert_eq!(reports[0]["outcome"]["status"], "Succeeded");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read file"));
}

#[test]
fn test_cli_validate() {
    let output = scenario_runner()
        .arg("validate")
        .arg(fixture("subscribe.yaml"))
        .arg(fixture("wrong_email.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("subscribe to daily forecast, 17 steps"));
}

#[test]
fn test_cli_validate_rejects_missing_file() {
    let output = scenario_runner()
        .arg("validate")
        .arg(fixture("does_not_exist.yaml"))
        .output()
        .expect("Failed to run scenario-runner");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read file"));
}
