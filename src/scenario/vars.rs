//! `{{name}}` placeholder expansion for step fields

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::common::{Error, Result};

/// Placeholders that are always available
pub const BUILTINS: &[&str] = &["uuid", "random_email"];

/// Values substituted into steps for one scenario run
#[derive(Debug, Clone)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    /// Variables for a fresh run: built-ins are generated once here, so every
    /// step of the run sees the same `{{random_email}}`
    pub fn for_run(declared: &BTreeMap<String, String>) -> Self {
        let id = Uuid::new_v4().simple().to_string();
        let mut values = HashMap::new();
        values.insert("random_email".to_string(), format!("{id}@mail.com"));
        values.insert("uuid".to_string(), id);
        for (name, value) in declared {
            values.insert(name.clone(), value.clone());
        }
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Substitute every placeholder in `text`
    pub fn expand(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after
                .find("}}")
                .ok_or_else(|| Error::Config(format!("Unterminated placeholder in '{}'", text)))?;
            let name = after[..end].trim();
            let value = self
                .get(name)
                .ok_or_else(|| Error::Config(format!("Unknown variable '{}' in '{}'", name, text)))?;
            out.push_str(value);
            rest = &after[end + 2..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Names of the placeholders used in `text`
pub fn placeholders(text: &str) -> Result<Vec<&str>> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| Error::Config(format!("Unterminated placeholder in '{}'", text)))?;
        names.push(after[..end].trim());
        rest = &after[end + 2..];
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_email_is_stable_within_a_run() {
        let vars = Variables::for_run(&BTreeMap::new());
        let first = vars.expand("{{random_email}}").unwrap();
        let second = vars.expand("{{ random_email }}").unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("@mail.com"));
        assert_eq!(first.len(), 32 + "@mail.com".len());
        assert!(!first.contains('-'));
    }

    #[test]
    fn test_runs_get_different_values() {
        let a = Variables::for_run(&BTreeMap::new());
        let b = Variables::for_run(&BTreeMap::new());
        assert_ne!(a.get("uuid"), b.get("uuid"));
    }

    #[test]
    fn test_declared_variables() {
        let declared = BTreeMap::from([("city".to_string(), "kyiv".to_string())]);
        let vars = Variables::for_run(&declared);
        assert_eq!(vars.expand("city={{city}}!").unwrap(), "city=kyiv!");
        assert_eq!(vars.expand("no placeholders").unwrap(), "no placeholders");
    }

    #[test]
    fn test_unknown_and_unterminated() {
        let vars = Variables::for_run(&BTreeMap::new());
        assert!(vars.expand("{{nope}}").is_err());
        assert!(vars.expand("{{uuid").is_err());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders("{{a}} and {{ b }}").unwrap(), vec!["a", "b"]);
        assert!(placeholders("plain").unwrap().is_empty());
        assert!(placeholders("{{open").is_err());
    }
}
