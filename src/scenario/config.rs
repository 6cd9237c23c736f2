//! Scenario file types
//!
//! Defines the data structures for deserializing YAML scenarios.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::page::Role;

use super::vars::{self, Variables};

/// A complete scenario loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Scenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description of what the scenario verifies
    pub description: Option<String>,
    /// Values for `{{name}}` placeholders in step fields
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// Site model the in-memory provider serves, relative to the scenario file
    pub site: PathBuf,
    /// The sequence of steps to execute
    pub steps: Vec<Step>,
}

/// A single step in the execution flow
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a page
    Navigate { url: String },
    /// Resolve an element by role and accessible name and focus it
    Locate { role: Role, name: String },
    /// Replace the focused element's text
    Fill { value: String },
    /// Send a key to the focused element
    Press { key: String },
    /// Set the focused toggle to checked
    Check,
    /// Activate the focused element
    Click,
    /// The page title must match a regular expression
    AssertTitle { pattern: TitlePattern },
    /// The focused element's value must equal `expected`
    AssertValue { expected: String },
    /// The focused element must be checked
    AssertChecked,
}

impl Step {
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            Step::AssertTitle { .. } | Step::AssertValue { .. } | Step::AssertChecked
        )
    }

    /// Free-text fields that may carry placeholders
    fn text_fields(&self) -> Vec<&str> {
        match self {
            Step::Navigate { url } => vec![url.as_str()],
            Step::Locate { name, .. } => vec![name.as_str()],
            Step::Fill { value } => vec![value.as_str()],
            Step::Press { key } => vec![key.as_str()],
            Step::AssertValue { expected } => vec![expected.as_str()],
            Step::Check | Step::Click | Step::AssertTitle { .. } | Step::AssertChecked => vec![],
        }
    }

    /// Copy of this step with placeholders substituted
    pub fn expand(&self, vars: &Variables) -> Result<Step> {
        Ok(match self {
            Step::Navigate { url } => Step::Navigate {
                url: vars.expand(url)?,
            },
            Step::Locate { role, name } => Step::Locate {
                role: *role,
                name: vars.expand(name)?,
            },
            Step::Fill { value } => Step::Fill {
                value: vars.expand(value)?,
            },
            Step::Press { key } => Step::Press {
                key: vars.expand(key)?,
            },
            Step::AssertValue { expected } => Step::AssertValue {
                expected: vars.expand(expected)?,
            },
            other => other.clone(),
        })
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Navigate { url } => write!(f, "navigate {}", url),
            Step::Locate { role, name } => write!(f, "locate {} '{}'", role, name),
            Step::Fill { value } => write!(f, "fill '{}'", value),
            Step::Press { key } => write!(f, "press {}", key),
            Step::Check => f.write_str("check"),
            Step::Click => f.write_str("click"),
            Step::AssertTitle { pattern } => write!(f, "assert title /{}/", pattern),
            Step::AssertValue { expected } => write!(f, "assert value '{}'", expected),
            Step::AssertChecked => f.write_str("assert checked"),
        }
    }
}

/// Regular expression a page title is matched against
///
/// Written either bare (`Subscription Form`) or slash-delimited
/// (`/Subscription Form/`); the delimiters are not part of the expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TitlePattern(Regex);

impl TitlePattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let source = pattern
            .strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
            .filter(|p| !p.is_empty())
            .unwrap_or(pattern);
        Regex::new(source)
            .map(Self)
            .map_err(|e| Error::Config(format!("Invalid title pattern '{}': {}", pattern, e)))
    }

    pub fn is_match(&self, title: &str) -> bool {
        self.0.is_match(title)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for TitlePattern {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<TitlePattern> for String {
    fn from(pattern: TitlePattern) -> Self {
        pattern.as_str().to_string()
    }
}

impl PartialEq for TitlePattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl fmt::Display for TitlePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Scenario {
    /// Parse a scenario from YAML text without touching the filesystem
    pub fn from_yaml(content: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.check_placeholders()?;
        Ok(scenario)
    }

    /// Every placeholder must name a built-in or a declared variable
    fn check_placeholders(&self) -> Result<()> {
        for (i, step) in self.steps.iter().enumerate() {
            for field in step.text_fields() {
                for name in vars::placeholders(field)? {
                    if !vars::BUILTINS.contains(&name) && !self.vars.contains_key(name) {
                        return Err(Error::Config(format!(
                            "Step {} ({}) uses undeclared variable '{}'",
                            i, step, name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Load and validate a scenario file
///
/// The `site` path is resolved relative to the scenario file's directory.
pub fn load_scenario(path: &Path) -> Result<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;

    let mut scenario =
        Scenario::from_yaml(&content).map_err(|e| Error::invalid_scenario(path.display(), e.to_string()))?;

    if scenario.site.is_relative() {
        let scenario_dir = path.parent().unwrap_or(Path::new("."));
        scenario.site = scenario_dir.join(&scenario.site);
    }

    Ok(scenario)
}
