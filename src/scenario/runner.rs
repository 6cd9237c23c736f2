//! Scenario runner implementation
//!
//! Executes steps one at a time against a `PageSession`, stopping at the
//! first failure. The runner never retries: waiting for elements belongs to
//! the session.

use std::path::Path;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::common::config::Config;
use crate::common::{Error, ErrorKind, Result};
use crate::page::{ElementHandle, MemorySession, PageSession, SiteModel};
use crate::report::{AssertionSink, Verdict};

use super::config::{load_scenario, Step};
use super::vars::Variables;

/// Terminal result of a scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum Outcome {
    Succeeded,
    Failed(StepFailure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded)
    }

    pub fn failure(&self) -> Option<&StepFailure> {
        match self {
            Outcome::Succeeded => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }
}

/// The step that ended a failed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// 0-based position in the step list
    pub step_index: usize,
    pub kind: ErrorKind,
    pub message: String,
}

/// A passed assertion, kept for its verdict
struct Comparison {
    subject: String,
    expected: String,
    actual: String,
}

impl Comparison {
    fn into_verdict(self, step_index: usize) -> Verdict {
        Verdict {
            step_index,
            subject: self.subject,
            expected: self.expected,
            actual: self.actual,
            passed: true,
        }
    }
}

/// State of one scenario execution
///
/// Holds the session and the element the most recent `Locate` resolved.
/// Only `Locate` changes the focused element.
pub struct ScenarioContext<'s> {
    session: &'s mut dyn PageSession,
    focused: Option<ElementHandle>,
}

impl<'s> ScenarioContext<'s> {
    pub fn new(session: &'s mut dyn PageSession) -> Self {
        Self {
            session,
            focused: None,
        }
    }

    pub fn focused(&self) -> Option<&ElementHandle> {
        self.focused.as_ref()
    }

    fn target(&self, action: &str) -> Result<ElementHandle> {
        self.focused.clone().ok_or_else(|| {
            Error::interaction(
                action,
                "focused element",
                "no element has been located yet, add a locate step first",
            )
        })
    }

    /// Execute a single step
    ///
    /// Assertion steps that pass return what was compared.
    async fn execute(&mut self, step: &Step) -> Result<Option<Comparison>> {
        match step {
            Step::Navigate { url } => {
                self.session.navigate(url).await?;
            }
            Step::Locate { role, name } => {
                let element = self.session.locate(*role, name).await?;
                self.focused = Some(element);
            }
            Step::Fill { value } => {
                let element = self.target("fill")?;
                self.session.fill(&element, value).await?;
            }
            Step::Press { key } => {
                let element = self.target("press a key on")?;
                self.session.press(&element, key).await?;
            }
            Step::Check => {
                let element = self.target("check")?;
                self.session.check(&element).await?;
            }
            Step::Click => {
                let element = self.target("click")?;
                self.session.click(&element).await?;
            }
            Step::AssertTitle { pattern } => {
                let title = self.session.title().await?;
                let comparison = Comparison {
                    subject: "page title".to_string(),
                    expected: format!("/{}/", pattern),
                    actual: format!("'{}'", title),
                };
                return compare(comparison, pattern.is_match(&title));
            }
            Step::AssertValue { expected } => {
                let element = self.target("read the value of")?;
                let actual = self.session.value(&element).await?;
                let comparison = Comparison {
                    subject: format!("value of {}", element),
                    expected: format!("'{}'", expected),
                    actual: format!("'{}'", actual),
                };
                return compare(comparison, &actual == expected);
            }
            Step::AssertChecked => {
                let element = self.target("read the checked state of")?;
                let checked = self.session.is_checked(&element).await?;
                let comparison = Comparison {
                    subject: format!("checked state of {}", element),
                    expected: "checked".to_string(),
                    actual: if checked { "checked" } else { "unchecked" }.to_string(),
                };
                return compare(comparison, checked);
            }
        }
        Ok(None)
    }
}

fn compare(comparison: Comparison, matched: bool) -> Result<Option<Comparison>> {
    if matched {
        Ok(Some(comparison))
    } else {
        Err(Error::assertion(
            comparison.subject,
            comparison.expected,
            comparison.actual,
        ))
    }
}

/// Runs step lists, one scenario at a time
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    cancel: CancellationToken,
}

impl ScenarioRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that stops with `Cancelled` once `cancel` fires
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Execute `steps` in order against `session`
    ///
    /// Step failures end the run and come back as `Outcome::Failed`. Errors
    /// that are not step failures (a broken provider, say) are returned as
    /// `Err` and no outcome is reported.
    #[tracing::instrument(skip_all, fields(scenario = %name, steps = steps.len()))]
    pub async fn run(
        &self,
        name: &str,
        steps: &[Step],
        session: &mut dyn PageSession,
        sink: &mut dyn AssertionSink,
    ) -> Result<Outcome> {
        sink.scenario_started(name, steps.len());
        let mut context = ScenarioContext::new(session);

        for (index, step) in steps.iter().enumerate() {
            tracing::debug!(index, %step, "Executing step");

            let result = if self.cancel.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => Err(Error::Cancelled),
                    result = context.execute(step) => result,
                }
            };

            match result {
                Ok(comparison) => {
                    if let Some(comparison) = comparison {
                        sink.verdict(comparison.into_verdict(index));
                    }
                    sink.step_passed(index, step);
                }
                Err(e) => {
                    let Some(kind) = e.kind() else {
                        return Err(e);
                    };
                    if let Error::Assertion {
                        subject,
                        expected,
                        actual,
                    } = &e
                    {
                        sink.verdict(Verdict {
                            step_index: index,
                            subject: subject.clone(),
                            expected: expected.clone(),
                            actual: actual.clone(),
                            passed: false,
                        });
                    }

                    let failure = StepFailure {
                        step_index: index,
                        kind,
                        message: e.to_string(),
                    };
                    tracing::info!(index, %kind, "Step failed: {}", failure.message);
                    sink.step_failed(index, step, &failure);

                    let outcome = Outcome::Failed(failure);
                    sink.finished(&outcome);
                    return Ok(outcome);
                }
            }
        }

        tracing::info!("Scenario succeeded");
        sink.finished(&Outcome::Succeeded);
        Ok(Outcome::Succeeded)
    }
}

/// Load a scenario file and run it against the in-memory provider
pub async fn run_scenario(
    path: &Path,
    config: &Config,
    runner: &ScenarioRunner,
    sink: &mut dyn AssertionSink,
) -> Result<Outcome> {
    let scenario = load_scenario(path)?;
    let site = SiteModel::load(&scenario.site)?;

    // Placeholders are resolved up front so a bad one never leaves a run half done
    let vars = Variables::for_run(&scenario.vars);
    let steps = scenario
        .steps
        .iter()
        .map(|step| step.expand(&vars))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(
        scenario = %scenario.name,
        path = %path.display(),
        site = %scenario.site.display(),
        "Running scenario"
    );

    let mut session = MemorySession::with_timeouts(site, &config.timeouts);
    runner.run(&scenario.name, &steps, &mut session, sink).await
}
