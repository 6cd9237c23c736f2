//! Colored console output for scenario runs

use std::io::{self, Write};

use colored::Colorize;

use crate::scenario::{Outcome, Step, StepFailure};

use super::{AssertionSink, Verdict};

/// Sink that prints a run as it happens
///
/// Assertions and failures are always printed; other passing steps only when
/// verbose. The first write error is kept for `take_error`.
pub struct ConsoleReporter<W: Write + Send = io::Stdout> {
    out: W,
    verbose: bool,
    total: usize,
    passed: usize,
    failed_verdict: Option<Verdict>,
    error: Option<io::Error>,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout(verbose: bool) -> Self {
        Self::new(io::stdout(), verbose)
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self {
            out,
            verbose,
            total: 0,
            passed: 0,
            failed_verdict: None,
            error: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// First error hit while writing, if any
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.error.is_none() {
                self.error = Some(e);
            }
        }
    }

    fn write_started(&mut self, name: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "\n{} {}",
            "Running Scenario:".blue().bold(),
            name.white().bold()
        )?;
        writeln!(self.out, "\n{}", "Steps:".cyan())
    }

    fn write_failed(&mut self, index: usize, step: &Step, failure: &StepFailure) -> io::Result<()> {
        writeln!(
            self.out,
            "  {} Step {}: {} [{}]",
            "✗".red(),
            index + 1,
            step,
            failure.kind
        )?;
        match self.failed_verdict.take() {
            Some(verdict) => {
                writeln!(self.out, "      {}", verdict.subject)?;
                writeln!(self.out, "      {} {}", "expected:".green(), verdict.expected)?;
                writeln!(self.out, "      {}   {}", "actual:".red(), verdict.actual)
            }
            None => writeln!(self.out, "      {}", failure.message),
        }
    }

    fn write_finished(&mut self, outcome: &Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Succeeded => writeln!(
                self.out,
                "\n{} {} ({}/{} steps)\n",
                "✓".green().bold(),
                "Scenario Passed".green().bold(),
                self.passed,
                self.total
            )?,
            Outcome::Failed(failure) => writeln!(
                self.out,
                "\n{} {} at step {} ({}/{} steps passed)\n",
                "✗".red().bold(),
                "Scenario Failed".red().bold(),
                failure.step_index + 1,
                self.passed,
                self.total
            )?,
        }
        self.out.flush()
    }
}

impl<W: Write + Send> AssertionSink for ConsoleReporter<W> {
    fn scenario_started(&mut self, name: &str, total_steps: usize) {
        self.total = total_steps;
        self.passed = 0;
        self.failed_verdict = None;
        let result = self.write_started(name);
        self.record(result);
    }

    fn step_passed(&mut self, index: usize, step: &Step) {
        self.passed += 1;
        if self.verbose || step.is_assertion() {
            let result = writeln!(
                self.out,
                "  {} Step {}: {}",
                "✓".green(),
                index + 1,
                step.to_string().dimmed()
            );
            self.record(result);
        }
    }

    fn step_failed(&mut self, index: usize, step: &Step, failure: &StepFailure) {
        let result = self.write_failed(index, step, failure);
        self.record(result);
    }

    fn verdict(&mut self, verdict: Verdict) {
        if !verdict.passed {
            self.failed_verdict = Some(verdict);
        }
    }

    fn finished(&mut self, outcome: &Outcome) {
        let result = self.write_finished(outcome);
        self.record(result);
    }
}
