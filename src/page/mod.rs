//! Page session abstraction
//!
//! A `PageSession` is the browser automation provider's side of a scenario:
//! it loads pages, resolves elements by accessible role and name, and
//! performs interactions on them. Waiting for elements to become available is
//! the provider's job; the runner calls each method once and takes the result.

pub mod memory;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

pub use memory::{MemorySession, SiteModel, Submission};

/// Accessible role of an interactive element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Textbox,
    Combobox,
    Radio,
    Checkbox,
    Button,
    Link,
}

impl Role {
    /// Whether the element takes free text input
    pub fn accepts_text(self) -> bool {
        matches!(self, Role::Textbox | Role::Combobox)
    }

    /// Whether the element is a binary toggle (has a checked state)
    pub fn is_toggle(self) -> bool {
        matches!(self, Role::Radio | Role::Checkbox)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Textbox => "textbox",
            Role::Combobox => "combobox",
            Role::Radio => "radio",
            Role::Checkbox => "checkbox",
            Role::Button => "button",
            Role::Link => "link",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "textbox" => Ok(Role::Textbox),
            "combobox" => Ok(Role::Combobox),
            "radio" => Ok(Role::Radio),
            "checkbox" => Ok(Role::Checkbox),
            "button" => Ok(Role::Button),
            "link" => Ok(Role::Link),
            other => Err(Error::Config(format!(
                "Unknown role '{}'. Supported roles: textbox, combobox, radio, checkbox, button, link",
                other
            ))),
        }
    }
}

/// Handle to an element resolved by a session
///
/// `id` and `epoch` are opaque to everyone but the issuing session. The epoch
/// identifies the document the handle was resolved in, so a session can
/// reject handles that outlived a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: u64,
    epoch: u64,
    role: Role,
    name: String,
}

impl ElementHandle {
    pub fn new(id: u64, epoch: u64, role: Role, name: impl Into<String>) -> Self {
        Self {
            id,
            epoch,
            role,
            name: name.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.role, self.name)
    }
}

/// Browser automation provider for a single scenario run
#[async_trait]
pub trait PageSession: Send {
    /// Load `url` as the current page
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Resolve exactly one element by role and accessible name
    async fn locate(&mut self, role: Role, name: &str) -> Result<ElementHandle>;

    /// Title of the current page
    async fn title(&mut self) -> Result<String>;

    /// Current value of a text-like element
    async fn value(&mut self, element: &ElementHandle) -> Result<String>;

    /// Checked state of a toggle element
    async fn is_checked(&mut self, element: &ElementHandle) -> Result<bool>;

    /// Replace the element's text content
    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<()>;

    /// Send a key event to the element
    async fn press(&mut self, element: &ElementHandle, key: &str) -> Result<()>;

    /// Set a toggle element to the checked state
    async fn check(&mut self, element: &ElementHandle) -> Result<()>;

    /// Primary activation (mouse click) on the element
    async fn click(&mut self, element: &ElementHandle) -> Result<()>;
}
