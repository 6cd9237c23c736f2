//! In-memory site provider
//!
//! Runs scenarios against a scripted model of a site instead of a browser.
//! The model lists pages by URL; each page has a title and a flat list of
//! interactive elements. Activating a button with a `target` submits the
//! page's fields and loads the target page, which is enough to drive a form
//! flow end to end.
//!
//! ```yaml
//! pages:
//!   http://localhost:8000/:
//!     title: Weather Subscription Form
//!     elements:
//!       - { role: textbox, name: Enter email, required: true }
//!       - { role: radio, name: Hourly, group: frequency }
//!       - { role: radio, name: Daily, group: frequency }
//!       - { role: button, name: Subscribe, target: /subscribe }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;

use crate::common::config::Timeouts;
use crate::common::{Error, Result};

use super::{ElementHandle, PageSession, Role};

/// Scripted description of a site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteModel {
    pages: BTreeMap<String, PageModel>,
}

/// A page in the site model
#[derive(Debug, Clone, Deserialize)]
pub struct PageModel {
    pub title: String,
    #[serde(default)]
    pub elements: Vec<ElementModel>,
}

/// An interactive element in the site model
#[derive(Debug, Clone, Deserialize)]
pub struct ElementModel {
    pub role: Role,
    /// Accessible name (label, placeholder or button text)
    pub name: String,
    /// Initial value for text-like elements
    #[serde(default)]
    pub value: String,
    /// Initial checked state for toggles
    #[serde(default)]
    pub checked: bool,
    /// Exclusive group for radios
    pub group: Option<String>,
    /// Submission is blocked while this field is empty
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Element only becomes resolvable this long after the page loads
    #[serde(default)]
    pub hidden_for_ms: u64,
    /// URL loaded when a button or link is activated
    pub target: Option<String>,
}

impl SiteModel {
    /// Load a site model from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| {
            Error::Config(format!("Invalid site model '{}': {}", path.display(), e))
        })
    }

    /// Parse and validate a site model from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let raw: SiteModel = serde_yaml::from_str(content)?;
        let site = Self {
            pages: raw
                .pages
                .into_iter()
                .map(|(url, page)| (normalize_url(&url), page))
                .collect(),
        };
        site.validate()?;
        Ok(site)
    }

    /// Look up a page by URL
    pub fn page(&self, url: &str) -> Option<&PageModel> {
        self.pages.get(&normalize_url(url))
    }

    fn validate(&self) -> Result<()> {
        for (url, page) in &self.pages {
            let mut checked_groups = HashSet::new();
            for element in &page.elements {
                let what = format!("{} '{}' on {}", element.role, element.name, url);
                if element.checked && !element.role.is_toggle() {
                    return Err(Error::Config(format!("{what}: only radios and checkboxes can be checked")));
                }
                if element.group.is_some() && element.role != Role::Radio {
                    return Err(Error::Config(format!("{what}: only radios can belong to a group")));
                }
                if element.target.is_some() && !matches!(element.role, Role::Button | Role::Link) {
                    return Err(Error::Config(format!("{what}: only buttons and links can have a target")));
                }
                if let (true, Some(group)) = (element.checked, &element.group) {
                    if !checked_groups.insert(group.as_str()) {
                        return Err(Error::Config(format!(
                            "{what}: more than one radio in group '{group}' starts checked"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Form fields captured when a button submits a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub from: String,
    pub to: String,
    pub fields: BTreeMap<String, String>,
}

struct LiveElement {
    spec: ElementModel,
    value: String,
    checked: bool,
}

struct LoadedPage {
    url: String,
    title: String,
    elements: Vec<LiveElement>,
    loaded_at: Instant,
    focus: Option<usize>,
}

impl LoadedPage {
    fn from_model(url: String, model: &PageModel) -> Self {
        Self {
            url,
            title: model.title.clone(),
            elements: model
                .elements
                .iter()
                .map(|spec| LiveElement {
                    value: spec.value.clone(),
                    checked: spec.checked,
                    spec: spec.clone(),
                })
                .collect(),
            loaded_at: Instant::now(),
            focus: None,
        }
    }

    fn matching(&self, role: Role, name: &str, now: Instant) -> Vec<usize> {
        let age = now.saturating_duration_since(self.loaded_at);
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| {
                el.spec.role == role
                    && normalize_name(&el.spec.name) == name
                    && age >= Duration::from_millis(el.spec.hidden_for_ms)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn next_focusable(&self, from: usize) -> Option<usize> {
        let len = self.elements.len();
        (1..=len)
            .map(|offset| (from + offset) % len)
            .find(|&i| !self.elements[i].spec.disabled)
    }

    /// The button an Enter keypress in a text field activates
    fn default_submit(&self) -> Option<(usize, String)> {
        self.elements.iter().enumerate().find_map(|(i, el)| {
            match (&el.spec.role, &el.spec.target, el.spec.disabled) {
                (Role::Button, Some(target), false) => Some((i, target.clone())),
                _ => None,
            }
        })
    }

    fn check_radio(&mut self, index: usize) {
        if let Some(group) = self.elements[index].spec.group.clone() {
            for el in self.elements.iter_mut() {
                if el.spec.role == Role::Radio && el.spec.group.as_deref() == Some(group.as_str()) {
                    el.checked = false;
                }
            }
        }
        self.elements[index].checked = true;
    }

    fn form_fields(&self) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        for el in &self.elements {
            match el.spec.role {
                Role::Textbox | Role::Combobox => {
                    fields.insert(el.spec.name.clone(), el.value.clone());
                }
                Role::Radio if el.checked => {
                    let key = el.spec.group.clone().unwrap_or_else(|| el.spec.name.clone());
                    fields.insert(key, el.spec.name.clone());
                }
                Role::Checkbox if el.checked => {
                    fields.insert(el.spec.name.clone(), "on".to_string());
                }
                _ => {}
            }
        }
        fields
    }
}

/// `PageSession` over a `SiteModel`
pub struct MemorySession {
    site: SiteModel,
    page: Option<LoadedPage>,
    epoch: u64,
    locate_timeout: Duration,
    poll_interval: Duration,
    submissions: Vec<Submission>,
}

impl MemorySession {
    pub fn new(site: SiteModel) -> Self {
        Self::with_timeouts(site, &Timeouts::default())
    }

    pub fn with_timeouts(site: SiteModel, timeouts: &Timeouts) -> Self {
        Self {
            site,
            page: None,
            epoch: 0,
            locate_timeout: timeouts.locate(),
            poll_interval: timeouts.poll_interval(),
            submissions: Vec::new(),
        }
    }

    /// URL of the currently loaded page
    pub fn current_url(&self) -> Option<&str> {
        self.page.as_ref().map(|p| p.url.as_str())
    }

    /// Every successful form submission, oldest first
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    /// Element holding page focus
    ///
    /// Set by the last interaction and moved by `Tab`. Navigation clears it.
    pub fn focused_element(&self) -> Option<ElementHandle> {
        let page = self.page.as_ref()?;
        let index = page.focus?;
        let el = &page.elements[index];
        Some(ElementHandle::new(
            index as u64,
            self.epoch,
            el.spec.role,
            el.spec.name.clone(),
        ))
    }

    fn load(&mut self, url: &str) -> Result<()> {
        let url = normalize_url(url);
        let model = self
            .site
            .pages
            .get(&url)
            .ok_or_else(|| Error::navigation(&url, "no such page in the site model"))?;
        let page = LoadedPage::from_model(url, model);
        self.epoch += 1;
        tracing::debug!(url = %page.url, epoch = self.epoch, "Page loaded");
        self.page = Some(page);
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedPage> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Internal("no page loaded".to_string()))
    }

    fn loaded_mut(&mut self) -> Result<&mut LoadedPage> {
        self.page
            .as_mut()
            .ok_or_else(|| Error::Internal("no page loaded".to_string()))
    }

    /// Map a handle back to an element index on the current page
    fn resolve(&self, element: &ElementHandle, action: &str) -> Result<usize> {
        let Some(page) = &self.page else {
            return Err(Error::interaction(action, element, "no page is loaded"));
        };
        if element.epoch() != self.epoch {
            return Err(Error::interaction(
                action,
                element,
                "element is stale, the page has navigated since it was located",
            ));
        }
        usize::try_from(element.id())
            .ok()
            .filter(|&i| i < page.elements.len())
            .ok_or_else(|| Error::interaction(action, element, "unknown element handle"))
    }

    /// Resolve a handle that is about to be interacted with
    fn resolve_enabled(&self, element: &ElementHandle, action: &str) -> Result<usize> {
        let index = self.resolve(element, action)?;
        if self.loaded()?.elements[index].spec.disabled {
            return Err(Error::interaction(action, element, "element is disabled"));
        }
        Ok(index)
    }

    fn submit(&mut self, trigger: usize, target: &str) -> Result<()> {
        let page = self.loaded()?;
        if let Some(missing) = page
            .elements
            .iter()
            .find(|el| el.spec.required && el.spec.role.accepts_text() && el.value.trim().is_empty())
        {
            tracing::debug!(field = %missing.spec.name, "Submission blocked by empty required field");
            return Ok(());
        }

        let fields = page.form_fields();
        let from = page.url.clone();
        let to = normalize_url(&resolve_url(&from, target));
        tracing::debug!(
            via = %page.elements[trigger].spec.name,
            %from,
            %to,
            "Submitting form"
        );

        self.load(&to)?;
        self.submissions.push(Submission { from, to, fields });
        Ok(())
    }
}

#[async_trait]
impl PageSession for MemorySession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.load(url)
    }

    async fn locate(&mut self, role: Role, name: &str) -> Result<ElementHandle> {
        let wanted = normalize_name(name);
        let started = Instant::now();
        let deadline = started + self.locate_timeout;

        loop {
            let now = Instant::now();
            let matches = self
                .page
                .as_ref()
                .map(|p| p.matching(role, &wanted, now))
                .unwrap_or_default();

            match matches.as_slice() {
                [index] => {
                    return Ok(ElementHandle::new(*index as u64, self.epoch, role, name));
                }
                [] => {}
                many => {
                    return Err(Error::AmbiguousLocator {
                        role: role.to_string(),
                        name: name.to_string(),
                        count: many.len(),
                    });
                }
            }

            if now >= deadline {
                return Err(Error::ElementNotFound {
                    role: role.to_string(),
                    name: name.to_string(),
                    waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(self.poll_interval.min(deadline.saturating_duration_since(now))).await;
        }
    }

    async fn title(&mut self) -> Result<String> {
        // Nothing loaded behaves like about:blank
        Ok(self.page.as_ref().map(|p| p.title.clone()).unwrap_or_default())
    }

    async fn value(&mut self, element: &ElementHandle) -> Result<String> {
        let index = self.resolve(element, "read the value of")?;
        Ok(self.loaded()?.elements[index].value.clone())
    }

    async fn is_checked(&mut self, element: &ElementHandle) -> Result<bool> {
        let index = self.resolve(element, "read the checked state of")?;
        let el = &self.loaded()?.elements[index];
        if !el.spec.role.is_toggle() {
            return Err(Error::interaction(
                "read the checked state of",
                element,
                "not a checkbox or radio button",
            ));
        }
        Ok(el.checked)
    }

    async fn fill(&mut self, element: &ElementHandle, value: &str) -> Result<()> {
        let index = self.resolve_enabled(element, "fill")?;
        let page = self.loaded_mut()?;
        let el = &mut page.elements[index];
        if !el.spec.role.accepts_text() {
            return Err(Error::interaction("fill", element, "element does not accept text input"));
        }
        el.value = value.to_string();
        page.focus = Some(index);
        Ok(())
    }

    async fn press(&mut self, element: &ElementHandle, key: &str) -> Result<()> {
        let index = self.resolve_enabled(element, "press a key on")?;
        let page = self.loaded_mut()?;
        page.focus = Some(index);
        let accepts_text = page.elements[index].spec.role.accepts_text();

        match key {
            "Tab" => page.focus = page.next_focusable(index),
            "Enter" if accepts_text => {
                if let Some((trigger, target)) = page.default_submit() {
                    return self.submit(trigger, &target);
                }
            }
            "Backspace" if accepts_text => {
                page.elements[index].value.pop();
            }
            _ if accepts_text && key.chars().count() == 1 => {
                page.elements[index].value.push_str(key);
            }
            _ => tracing::debug!(key, element = %element, "Key press has no effect"),
        }
        Ok(())
    }

    async fn check(&mut self, element: &ElementHandle) -> Result<()> {
        let index = self.resolve_enabled(element, "check")?;
        let page = self.loaded_mut()?;
        match page.elements[index].spec.role {
            Role::Radio => page.check_radio(index),
            Role::Checkbox => page.elements[index].checked = true,
            _ => {
                return Err(Error::interaction(
                    "check",
                    element,
                    "not a checkbox or radio button",
                ))
            }
        }
        page.focus = Some(index);
        Ok(())
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<()> {
        let index = self.resolve_enabled(element, "click")?;
        let page = self.loaded_mut()?;
        page.focus = Some(index);

        let el = &mut page.elements[index];
        match (el.spec.role, el.spec.target.clone()) {
            (Role::Button, Some(target)) => self.submit(index, &target),
            (Role::Link, Some(target)) => {
                let url = resolve_url(&page.url, &target);
                self.load(&url)
            }
            (Role::Radio, _) => {
                page.check_radio(index);
                Ok(())
            }
            (Role::Checkbox, _) => {
                el.checked = !el.checked;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Collapse runs of whitespace so names match the way they are displayed
fn normalize_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Give origin-only URLs a trailing slash so `http://host` and
/// `http://host/` name the same page
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    match url.split_once("://") {
        Some((_, rest)) if !rest.contains('/') => format!("{url}/"),
        _ => url.to_string(),
    }
}

/// Resolve a link or form target against the page it appears on
fn resolve_url(base: &str, target: &str) -> String {
    if target.contains("://") {
        return target.to_string();
    }
    let base = normalize_url(base);
    let Some((scheme, rest)) = base.split_once("://") else {
        return target.to_string();
    };
    if target.starts_with('/') {
        let host = rest.split('/').next().unwrap_or(rest);
        return format!("{scheme}://{host}{target}");
    }
    match base.rfind('/') {
        Some(slash) => format!("{}{}", &base[..=slash], target),
        None => target.to_string(),
    }
}
