//! Scenario execution
//!
//! A scenario is an ordered list of steps (navigate, locate, interact,
//! assert) described as data, usually loaded from a YAML file. The runner
//! executes the steps against a page session and reports each assertion to
//! an assertion sink.

mod config;
mod runner;
mod vars;

pub use config::{load_scenario, Scenario, Step, TitlePattern};
pub use runner::{run_scenario, Outcome, ScenarioContext, ScenarioRunner, StepFailure};
pub use vars::Variables;
