use crate::scenario::{Outcome, Step};

use super::{AssertionSink, ScenarioReport, Verdict};

/// Sink that aggregates a `ScenarioReport`
#[derive(Debug, Default)]
pub struct ReportCollector {
    report: ScenarioReport,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self) -> &ScenarioReport {
        &self.report
    }

    pub fn into_report(self) -> ScenarioReport {
        self.report
    }
}

impl AssertionSink for ReportCollector {
    fn scenario_started(&mut self, name: &str, total_steps: usize) {
        self.report = ScenarioReport {
            name: name.to_string(),
            steps_total: total_steps,
            ..ScenarioReport::default()
        };
    }

    fn step_passed(&mut self, _index: usize, _step: &Step) {
        self.report.steps_passed += 1;
    }

    fn verdict(&mut self, verdict: Verdict) {
        self.report.verdicts.push(verdict);
    }

    fn finished(&mut self, outcome: &Outcome) {
        self.report.outcome = Some(outcome.clone());
    }
}
