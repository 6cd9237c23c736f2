//! Assertion sinks
//!
//! The runner reports progress and every assertion verdict to an
//! `AssertionSink`. Two sinks ship with the crate: `ConsoleReporter` prints a
//! human-readable run, `ReportCollector` builds a `ScenarioReport` that can
//! be serialized to JSON.

mod collector;
mod console;

use serde::Serialize;

use crate::scenario::{Outcome, Step, StepFailure};

pub use collector::ReportCollector;
pub use console::ConsoleReporter;

/// Result of one assertion step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub step_index: usize,
    /// What was inspected, e.g. "value of textbox 'Enter city'"
    pub subject: String,
    pub expected: String,
    pub actual: String,
    pub passed: bool,
}

/// Receiver of progress and verdicts for one scenario run
pub trait AssertionSink: Send {
    fn scenario_started(&mut self, _name: &str, _total_steps: usize) {}

    fn step_passed(&mut self, _index: usize, _step: &Step) {}

    fn step_failed(&mut self, _index: usize, _step: &Step, _failure: &StepFailure) {}

    /// Called for every assertion step, before `step_passed`/`step_failed`
    fn verdict(&mut self, verdict: Verdict);

    fn finished(&mut self, outcome: &Outcome);
}

/// Aggregated result of one scenario run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub steps_total: usize,
    pub steps_passed: usize,
    pub verdicts: Vec<Verdict>,
    /// `None` until the run finished
    pub outcome: Option<Outcome>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Succeeded))
    }
}
