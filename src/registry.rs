//! Named rules.
//!
//! A [`Registry`] maps names to rules so a validator can attach a rule by
//! name with [`Validator::add_named_rule`](crate::Validator::add_named_rule).
//! Registries are plain values; share one between validators with `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::rule::{Custom, Fail, Rule};

/// Name to rule mapping.
///
/// ```
/// use sluice::rule::Rule;
/// use sluice::{Error, Registry};
///
/// let mut registry = Registry::new();
/// registry.extend("even", |value, fail| {
///     if value.as_i64().is_some_and(|n| n % 2 != 0) {
///         fail("Must be even");
///     }
/// });
///
/// assert!(registry.contains("even"));
/// assert_eq!(registry.get("even").unwrap().name(), "even");
/// assert!(matches!(registry.get("odd"), Err(Error::UnknownRule(_))));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    rules: HashMap<String, Arc<dyn Rule>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom predicate under `name`, replacing any previous rule.
    pub fn extend<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(&Value, &mut Fail<'_>) + Send + Sync + 'static,
    {
        let name = name.into();
        let rule = Custom::new(predicate).with_name(name.clone());
        self.rules.insert(name, Arc::new(rule));
        self
    }

    /// Register any rule under `name`, replacing any previous rule.
    pub fn register<R>(&mut self, name: impl Into<String>, rule: R) -> &mut Self
    where
        R: Rule + 'static,
    {
        self.rules.insert(name.into(), Arc::new(rule));
        self
    }

    /// Look up a rule.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] when nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Rule>> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }

    /// Whether a rule is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.rules.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("rules", &names).finish()
    }
}
