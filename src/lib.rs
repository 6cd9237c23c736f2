//! Scenario runner - scripted UI interaction and assertion engine
//!
//! Executes ordered steps (navigate, locate by role and accessible name,
//! fill, press, check, click, and assertions on title, value and checked
//! state) against a page session, short-circuiting on the first failure.

pub mod cli;
pub mod commands;
pub mod common;
pub mod page;
pub mod report;
pub mod scenario;

// Re-export commonly used types for tests
pub use common::{Error, ErrorKind, Result};
pub use page::{ElementHandle, PageSession, Role};
pub use scenario::{Outcome, ScenarioRunner, Step};
