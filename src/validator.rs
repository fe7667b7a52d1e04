//! The validation orchestrator
//!
//! A [`Validator`] owns the declared attributes, the rule attached to each
//! attribute, the raw input, and the [`Errors`] and [`ValidatedInput`] of
//! its latest run.
//!
//! # Example
//!
//! ```
//! use sluice::rule::builtin::matches;
//! use sluice::Validator;
//! use serde_json::json;
//!
//! # fn main() -> sluice::Result<()> {
//! let mut validator = Validator::make(
//!     [("keywords", json!("abcd12345@#$"))],
//!     [("keywords", matches(r"^\w+$", "Invalid value")?)],
//! );
//!
//! assert!(!validator.validate()?);
//! assert_eq!(validator.errors().first("keywords"), Some("Invalid value"));
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::compose;
use crate::error::{Error, Result};
use crate::group::{Selector, ValidationGroup};
use crate::registry::Registry;
use crate::rule::RuleNode;
use crate::support::{render_message, Errors, ValidatedInput};

/// A named operation supplied to a validator at construction.
///
/// Capabilities receive the validator and positional arguments.
pub type Capability = Arc<dyn Fn(&Validator, &[Value]) -> Result<Value> + Send + Sync>;

/// An attribute the validator expects, with the value used when the input
/// does not contain it.
///
/// ```
/// use sluice::Attribute;
/// use serde_json::{json, Value};
///
/// let plain = Attribute::from("email");
/// assert_eq!(plain.default, Value::Null);
///
/// let flagged = Attribute::from(("remember_me", json!(true)));
/// assert_eq!(flagged.name, "remember_me");
/// assert_eq!(flagged.default, json!(true));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Value used when the input omits the attribute.
    pub default: Value,
}

impl Attribute {
    /// An attribute with a `null` default.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_default(name, Value::Null)
    }

    /// An attribute with an explicit default.
    pub fn with_default(name: impl Into<String>, default: Value) -> Self {
        Attribute {
            name: name.into(),
            default,
        }
    }
}

impl From<&str> for Attribute {
    fn from(name: &str) -> Self {
        Attribute::new(name)
    }
}

impl From<String> for Attribute {
    fn from(name: String) -> Self {
        Attribute::new(name)
    }
}

impl From<(&str, Value)> for Attribute {
    fn from((name, default): (&str, Value)) -> Self {
        Attribute::with_default(name, default)
    }
}

impl From<(String, Value)> for Attribute {
    fn from((name, default): (String, Value)) -> Self {
        Attribute::with_default(name, default)
    }
}

/// A reusable validator definition.
///
/// [`Schema::rules`] is not called until the validator first needs its
/// rules, and again whenever it finds the rule map empty.
///
/// ```
/// use sluice::rule::builtin::{email, not_blank};
/// use sluice::rule::RuleNode;
/// use sluice::{sequentially, Attribute, Schema, Validator};
/// use serde_json::json;
///
/// struct Newsletter;
///
/// impl Schema for Newsletter {
///     fn attributes(&self) -> Vec<Attribute> {
///         vec!["email".into(), ("weekly", json!(true)).into()]
///     }
///
///     fn rules(&self) -> Vec<(String, RuleNode)> {
///         vec![(
///             "email".into(),
///             sequentially![not_blank("Email is required"), email("Invalid email")],
///         )]
///     }
/// }
///
/// let mut validator = Validator::from_schema(Newsletter);
/// validator.set_data([("email", json!("ada@example.com"))]);
/// assert!(validator.validate().unwrap());
/// assert_eq!(validator.validated("weekly"), Some(&json!(true)));
/// ```
pub trait Schema: Send + Sync {
    /// Declared attributes in validation order.
    ///
    /// Attributes that only appear in [`Schema::rules`] are appended with a
    /// `null` default.
    fn attributes(&self) -> Vec<Attribute> {
        Vec::new()
    }

    /// Rules per attribute.
    fn rules(&self) -> Vec<(String, RuleNode)>;
}

/// Outcome of the latest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// No run has finished yet.
    #[default]
    Idle,
    /// Every attribute passed.
    Passed,
    /// At least one attribute failed.
    Failed,
    /// A rule could not be evaluated, or a run unwound before finishing.
    /// The collections are incomplete.
    Aborted,
}

/// Validates one input against per-attribute rules.
#[derive(Clone)]
pub struct Validator {
    attributes: IndexMap<String, Value>,
    rules: IndexMap<String, RuleNode>,
    schema: Option<Arc<dyn Schema>>,
    input: IndexMap<String, Value>,
    errors: Errors,
    validated: ValidatedInput,
    stop_on_first_failure: bool,
    registry: Option<Arc<Registry>>,
    capabilities: HashMap<String, Capability>,
    state: RunState,
}

impl Validator {
    /// Create a validator whose attributes are the keys of `rules`.
    pub fn new<R, K, N>(rules: R) -> Self
    where
        R: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<RuleNode>,
    {
        Self::builder().rules(rules).build()
    }

    /// Create a validator and load its input.
    pub fn make<I, IK, R, K, N>(input: I, rules: R) -> Self
    where
        I: IntoIterator<Item = (IK, Value)>,
        IK: Into<String>,
        R: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<RuleNode>,
    {
        let mut validator = Self::new(rules);
        validator.set_data(input);
        validator
    }

    /// Create a validator from a [`Schema`].
    pub fn from_schema<S: Schema + 'static>(schema: S) -> Self {
        Self::builder().schema(schema).build()
    }

    /// Start configuring a validator.
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    /// Stop a run at the first failing attribute.
    pub fn stop_on_first_failure(&mut self) -> &mut Self {
        self.stop_on_first_failure = true;
        self
    }

    /// Load the input.
    ///
    /// Only declared attributes are kept; declared attributes missing from
    /// `input` take their default. An explicit `null` in the input is kept.
    pub fn set_data<I, K>(&mut self, input: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.resolve_rules();
        let mut given: HashMap<String, Value> = input
            .into_iter()
            .map(|(attribute, value)| (attribute.into(), value))
            .collect();
        self.input = self
            .attributes
            .iter()
            .map(|(attribute, default)| {
                let value = given.remove(attribute).unwrap_or_else(|| default.clone());
                (attribute.clone(), value)
            })
            .collect();
        self
    }

    /// Attach rules to an attribute, merging with any it already has.
    ///
    /// Unknown attributes are declared with a `null` default.
    pub fn add_rule(&mut self, attribute: impl Into<String>, rules: impl Into<RuleNode>) -> &mut Self {
        self.resolve_rules();
        let attribute = attribute.into();
        let incoming = rules.into();
        match self.rules.get_mut(&attribute) {
            Some(slot) => {
                let existing = std::mem::replace(slot, RuleNode::List(Vec::new()));
                *slot = compose::merge(Some(existing), incoming);
            }
            None => {
                self.rules.insert(attribute.clone(), incoming);
            }
        }
        self.attributes.entry(attribute).or_insert(Value::Null);
        self
    }

    /// Attach a rule registered in this validator's [`Registry`].
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] when no registry was supplied or the name is
    /// not registered.
    pub fn add_named_rule(&mut self, attribute: impl Into<String>, name: &str) -> Result<&mut Self> {
        let rule = match &self.registry {
            Some(registry) => registry.get(name)?,
            None => return Err(Error::UnknownRule(name.to_string())),
        };
        Ok(self.add_rule(attribute, RuleNode::single(rule)))
    }

    /// Validate the input in the default group.
    ///
    /// Returns `Ok(true)` when every attribute passed.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an empty rule list and
    /// [`Error::RuleExecution`] when a rule could not run. Both abort the run.
    pub fn validate(&mut self) -> Result<bool> {
        self.validate_in(ValidationGroup::Default)
    }

    /// Validate the input in the given groups.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn validate_in(&mut self, group: impl Into<ValidationGroup>) -> Result<bool> {
        let group = group.into();
        self.resolve_rules();
        self.errors.clear();
        self.validated.clear();
        self.state = RunState::Aborted;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("validate", group = ?group).entered();
        #[cfg(feature = "tracing")]
        tracing::debug!(attributes = self.attributes.len(), "validation started");

        let steps = group.steps();
        for (attribute, default) in &self.attributes {
            let value = self.input.get(attribute).unwrap_or(default);
            let failure = match self.rules.get(attribute) {
                Some(node) => match check(node, attribute, value, &steps) {
                    Ok(failure) => failure,
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        {
                            if err.is_configuration() {
                                tracing::error!("validation aborted: {}", err);
                            } else {
                                tracing::warn!("validation aborted: {}", err);
                            }
                        }
                        return Err(err);
                    }
                },
                None => None,
            };

            match failure {
                Some(message) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(attribute = %attribute, reason = %message, "attribute failed");
                    self.errors.add(attribute.as_str(), render_message(&message, value));
                    if self.stop_on_first_failure {
                        break;
                    }
                }
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(attribute = %attribute, "attribute passed");
                    self.validated.add(attribute.as_str(), value.clone());
                }
            }
        }

        let passed = self.errors.is_empty();
        self.state = if passed {
            RunState::Passed
        } else {
            RunState::Failed
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(passed, failed = self.errors.len(), "validation finished");

        Ok(passed)
    }

    /// Whether the input is valid.
    ///
    /// Runs [`Validator::validate`] when no value has been validated yet or
    /// the latest run did not finish; otherwise reports the latest run. Call
    /// `validate` to force a new run.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn passes(&mut self) -> Result<bool> {
        self.passes_in(ValidationGroup::Default)
    }

    /// [`Validator::passes`] in the given groups.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn passes_in(&mut self, group: impl Into<ValidationGroup>) -> Result<bool> {
        if self.validated.is_empty() || matches!(self.state, RunState::Idle | RunState::Aborted) {
            self.validate_in(group)
        } else {
            Ok(self.errors.is_empty())
        }
    }

    /// Whether the input is invalid. Shares the reuse rule of [`Validator::passes`].
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn fails(&mut self) -> Result<bool> {
        self.fails_in(ValidationGroup::Default)
    }

    /// [`Validator::fails`] in the given groups.
    ///
    /// # Errors
    ///
    /// See [`Validator::validate`].
    pub fn fails_in(&mut self, group: impl Into<ValidationGroup>) -> Result<bool> {
        self.passes_in(group).map(|passed| !passed)
    }

    /// Invoke a capability supplied at construction.
    ///
    /// # Errors
    ///
    /// [`Error::UndefinedMethod`] when no capability has that name, or the
    /// capability's own error.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        let capability = self
            .capabilities
            .get(name)
            .ok_or_else(|| Error::UndefinedMethod(name.to_string()))?;
        capability(self, args)
    }

    /// Add or replace a capability.
    pub fn add_capability<F>(&mut self, name: impl Into<String>, capability: F) -> &mut Self
    where
        F: Fn(&Validator, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.capabilities.insert(name.into(), Arc::new(capability));
        self
    }

    /// The loaded input, one entry per declared attribute.
    pub fn all(&self) -> &IndexMap<String, Value> {
        &self.input
    }

    /// The validated value of one attribute.
    pub fn validated(&self, attribute: &str) -> Option<&Value> {
        self.validated.get(attribute)
    }

    /// Every validated value.
    pub fn validated_all(&self) -> &IndexMap<String, Value> {
        self.validated.all()
    }

    /// The validated input collection.
    pub fn safe(&self) -> &ValidatedInput {
        &self.validated
    }

    /// Failure messages of the latest run.
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    /// Outcome of the latest run.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Declared attributes with their defaults.
    pub fn attributes(&self) -> &IndexMap<String, Value> {
        &self.attributes
    }

    /// The rule attached to an attribute.
    pub fn rule(&self, attribute: &str) -> Option<&RuleNode> {
        self.rules.get(attribute)
    }

    fn resolve_rules(&mut self) {
        if !self.rules.is_empty() {
            return;
        }
        let Some(schema) = &self.schema else {
            return;
        };
        for (attribute, node) in schema.rules() {
            self.attributes
                .entry(attribute.clone())
                .or_insert(Value::Null);
            self.rules.insert(attribute, node);
        }
    }
}

/// Evaluate `node` step by step, stopping at the first failing step.
fn check(
    node: &RuleNode,
    attribute: &str,
    value: &Value,
    steps: &[Selector<'_>],
) -> Result<Option<String>> {
    for step in steps {
        if let Some(message) = node.evaluate(attribute, value, step)? {
            return Ok(Some(message));
        }
    }
    Ok(None)
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities: Vec<_> = self.capabilities.keys().collect();
        capabilities.sort();
        f.debug_struct("Validator")
            .field("attributes", &self.attributes)
            .field("rules", &self.rules)
            .field("has_schema", &self.schema.is_some())
            .field("input", &self.input)
            .field("errors", &self.errors)
            .field("validated", &self.validated)
            .field("stop_on_first_failure", &self.stop_on_first_failure)
            .field("registry", &self.registry)
            .field("capabilities", &capabilities)
            .field("state", &self.state)
            .finish()
    }
}

/// Builder for [`Validator`].
///
/// ```
/// use sluice::rule::builtin::not_blank;
/// use sluice::{Registry, Validator};
/// use serde_json::{json, Value};
///
/// let mut registry = Registry::new();
/// registry.extend("lowercase", |value, fail| {
///     if value.as_str().is_some_and(|s| s.chars().any(char::is_uppercase)) {
///         fail("Lowercase only");
///     }
/// });
///
/// let mut validator = Validator::builder()
///     .attributes(["username", "nickname"])
///     .rule("username", not_blank("Username is required"))
///     .registry(registry)
///     .capability("count", |v: &Validator, _: &[Value]| Ok(json!(v.attributes().len())))
///     .stop_on_first_failure(true)
///     .build();
///
/// validator.add_named_rule("nickname", "lowercase").unwrap();
/// validator.set_data([("username", json!("ada")), ("nickname", json!("Ada"))]);
///
/// assert!(!validator.validate().unwrap());
/// assert_eq!(validator.errors().first("nickname"), Some("Lowercase only"));
/// assert_eq!(validator.call("count", &[]).unwrap(), json!(2));
/// ```
#[derive(Default)]
pub struct ValidatorBuilder {
    attributes: Vec<Attribute>,
    rules: Vec<(String, RuleNode)>,
    schema: Option<Arc<dyn Schema>>,
    stop_on_first_failure: bool,
    registry: Option<Arc<Registry>>,
    capabilities: HashMap<String, Capability>,
}

impl ValidatorBuilder {
    /// Declare attributes in validation order.
    pub fn attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Attribute>,
    {
        self.attributes.extend(attributes.into_iter().map(Into::into));
        self
    }

    /// Declare one attribute.
    pub fn attribute(mut self, attribute: impl Into<Attribute>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Attach rules to several attributes.
    pub fn rules<R, K, N>(mut self, rules: R) -> Self
    where
        R: IntoIterator<Item = (K, N)>,
        K: Into<String>,
        N: Into<RuleNode>,
    {
        self.rules.extend(
            rules
                .into_iter()
                .map(|(attribute, node)| (attribute.into(), node.into())),
        );
        self
    }

    /// Attach rules to one attribute.
    pub fn rule(mut self, attribute: impl Into<String>, rules: impl Into<RuleNode>) -> Self {
        self.rules.push((attribute.into(), rules.into()));
        self
    }

    /// Use a schema for attributes and lazily resolved rules.
    pub fn schema<S: Schema + 'static>(mut self, schema: S) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Stop a run at the first failing attribute.
    pub fn stop_on_first_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_failure = stop;
        self
    }

    /// Registry consulted by [`Validator::add_named_rule`].
    pub fn registry(mut self, registry: impl Into<Arc<Registry>>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Supply a named operation for [`Validator::call`].
    pub fn capability<F>(mut self, name: impl Into<String>, capability: F) -> Self
    where
        F: Fn(&Validator, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.capabilities.insert(name.into(), Arc::new(capability));
        self
    }

    /// Build the validator.
    ///
    /// Without declared attributes the rule keys become the attributes.
    /// Rules given for the same attribute more than once are merged.
    pub fn build(self) -> Validator {
        let mut attributes: IndexMap<String, Value> = IndexMap::new();
        let declared = self
            .schema
            .as_ref()
            .map(|schema| schema.attributes())
            .unwrap_or_default()
            .into_iter()
            .chain(self.attributes);
        for attribute in declared {
            attributes.insert(attribute.name, attribute.default);
        }

        let mut validator = Validator {
            attributes,
            rules: IndexMap::new(),
            schema: self.schema,
            input: IndexMap::new(),
            errors: Errors::new(),
            validated: ValidatedInput::new(),
            stop_on_first_failure: self.stop_on_first_failure,
            registry: self.registry,
            capabilities: self.capabilities,
            state: RunState::Idle,
        };
        for (attribute, node) in self.rules {
            validator.add_rule(attribute, node);
        }
        validator
    }
}

impl fmt::Debug for ValidatorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorBuilder")
            .field("attributes", &self.attributes)
            .field("rules", &self.rules)
            .field("has_schema", &self.schema.is_some())
            .field("stop_on_first_failure", &self.stop_on_first_failure)
            .field("registry", &self.registry)
            .field("capabilities", &self.capabilities.len())
            .finish()
    }
}
