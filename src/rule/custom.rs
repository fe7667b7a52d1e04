//! Custom rules built from closures
//!
//! A custom rule wraps a predicate with the signature `(value, fail)`. The
//! predicate calls `fail(message)` to reject the value; returning without
//! calling it accepts the value. The bridge turns that callback convention
//! into a [`Verdict`] so nothing downstream ever sees the callback.
//!
//! # Example
//!
//! ```
//! use sluice::rule::{make, Rule, Verdict};
//! use serde_json::json;
//!
//! let alphanumeric = make(|value, fail| {
//!     let ok = value
//!         .as_str()
//!         .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_'));
//!     if !ok {
//!         fail("Invalid value");
//!     }
//! });
//!
//! assert_eq!(alphanumeric.evaluate(&json!("abcd12345")).unwrap(), Verdict::Pass);
//! assert_eq!(
//!     alphanumeric.evaluate(&json!("abcd12345@#$")).unwrap(),
//!     Verdict::fail("Invalid value")
//! );
//! ```

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;

use super::builtin::is_empty_value;
use super::{Rule, Verdict};
use crate::error::{BoxError, Error, Result};

/// Message used by a custom rule when the predicate does not supply one.
pub const DEFAULT_MESSAGE: &str = "Invalid: {{ value }}.";

/// Message used by [`required_if`] when none is given.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// The failure callback handed to a custom predicate.
pub type Fail<'a> = dyn FnMut(&str) + 'a;

#[derive(Clone)]
enum Callback {
    Infallible(Arc<dyn Fn(&Value, &mut Fail<'_>) + Send + Sync>),
    Fallible(Arc<dyn Fn(&Value, &mut Fail<'_>) -> std::result::Result<(), BoxError> + Send + Sync>),
}

impl Callback {
    fn call(&self, value: &Value, fail: &mut Fail<'_>) -> std::result::Result<(), BoxError> {
        match self {
            Callback::Infallible(predicate) => {
                predicate(value, fail);
                Ok(())
            }
            Callback::Fallible(predicate) => predicate(value, fail),
        }
    }
}

/// A rule backed by a user-supplied predicate.
///
/// Build one with [`make`], [`Custom::new`], [`Custom::fallible`] or
/// [`Custom::builder`].
#[derive(Clone)]
pub struct Custom {
    callback: Callback,
    message: String,
    groups: Vec<String>,
    name: String,
}

impl Custom {
    /// Wrap an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &mut Fail<'_>) + Send + Sync + 'static,
    {
        Self::from_callback(Callback::Infallible(Arc::new(predicate)))
    }

    /// Wrap a predicate that may fail to run.
    ///
    /// An `Err` returned by the predicate aborts the validation run with
    /// [`Error::RuleExecution`].
    ///
    /// # Example
    ///
    /// ```
    /// use sluice::rule::{Custom, Rule};
    /// use serde_json::json;
    ///
    /// let lookup = Custom::fallible(|value, _fail| {
    ///     if value.is_null() {
    ///         return Err("directory unavailable".into());
    ///     }
    ///     Ok(())
    /// });
    ///
    /// assert!(lookup.evaluate(&json!("ada")).is_ok());
    /// assert!(lookup.evaluate(&json!(null)).is_err());
    /// ```
    pub fn fallible<F>(predicate: F) -> Self
    where
        F: Fn(&Value, &mut Fail<'_>) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        Self::from_callback(Callback::Fallible(Arc::new(predicate)))
    }

    /// Start building a custom rule from options.
    pub fn builder() -> CustomBuilder {
        CustomBuilder::default()
    }

    fn from_callback(callback: Callback) -> Self {
        Self {
            callback,
            message: DEFAULT_MESSAGE.to_string(),
            groups: Vec::new(),
            name: "custom".to_string(),
        }
    }

    /// Replace the message used when the predicate fails without one.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Rename the rule, as shown in logs and execution errors.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Place the rule in validation groups, replacing any previous tags.
    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// The fallback failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

impl Rule for Custom {
    fn evaluate(&self, value: &Value) -> std::result::Result<Verdict, BoxError> {
        let mut failure: Option<String> = None;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut fail = |message: &str| failure = Some(message.to_string());
            self.callback.call(value, &mut fail)
        }));

        match outcome {
            Ok(Ok(())) => Ok(match failure {
                None => Verdict::Pass,
                Some(message) if message.is_empty() => Verdict::Fail(self.message.clone()),
                Some(message) => Verdict::Fail(message),
            }),
            Ok(Err(err)) => Err(err),
            Err(payload) => Err(Box::new(PredicatePanicked::from_payload(payload))),
        }
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A custom predicate panicked while evaluating a value.
#[derive(Debug, thiserror::Error)]
#[error("custom predicate panicked: {0}")]
pub struct PredicatePanicked(String);

impl PredicatePanicked {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        PredicatePanicked(message)
    }
}

/// Options form of a custom rule.
///
/// # Example
///
/// ```
/// use sluice::rule::Custom;
///
/// let err = Custom::builder().message("Too short").build().unwrap_err();
/// assert!(err.is_configuration());
///
/// let rule = Custom::builder()
///     .message("Too short")
///     .callback(|value, fail| {
///         if value.as_str().map_or(0, str::len) < 3 {
///             fail("");
///         }
///     })
///     .groups(["signup"])
///     .build()
///     .unwrap();
/// assert_eq!(rule.message(), "Too short");
/// ```
#[derive(Default)]
pub struct CustomBuilder {
    callback: Option<Callback>,
    message: Option<String>,
    groups: Vec<String>,
    name: Option<String>,
}

impl CustomBuilder {
    /// Set the fallback failure message.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set an infallible predicate.
    pub fn callback<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &mut Fail<'_>) + Send + Sync + 'static,
    {
        self.callback = Some(Callback::Infallible(Arc::new(predicate)));
        self
    }

    /// Set a fallible predicate.
    pub fn fallible_callback<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Value, &mut Fail<'_>) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.callback = Some(Callback::Fallible(Arc::new(predicate)));
        self
    }

    /// Place the rule in validation groups.
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Name the rule.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when no callback was set.
    pub fn build(self) -> Result<Custom> {
        let callback = self.callback.ok_or_else(|| {
            Error::configuration("the \"callback\" option must be a valid callable (none given)")
        })?;
        let mut rule = Custom::from_callback(callback);
        if let Some(message) = self.message {
            rule.message = message;
        }
        if let Some(name) = self.name {
            rule.name = name;
        }
        rule.groups = self.groups;
        Ok(rule)
    }
}

impl fmt::Debug for CustomBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomBuilder")
            .field("has_callback", &self.callback.is_some())
            .field("message", &self.message)
            .field("groups", &self.groups)
            .field("name", &self.name)
            .finish()
    }
}

/// Make a custom rule from a `(value, fail)` predicate.
pub fn make<F>(predicate: F) -> Custom
where
    F: Fn(&Value, &mut Fail<'_>) + Send + Sync + 'static,
{
    Custom::new(predicate)
}

/// [`make`] with validation groups.
///
/// ```
/// use sluice::rule::{make_in, Rule};
///
/// let rule = make_in(|value, fail| {
///     if value.is_null() {
///         fail("Required for admins");
///     }
/// }, ["admin"]);
/// assert_eq!(rule.groups(), ["admin".to_string()]);
/// ```
pub fn make_in<F, I, S>(predicate: F, groups: I) -> Custom
where
    F: Fn(&Value, &mut Fail<'_>) + Send + Sync + 'static,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Custom::new(predicate).with_groups(groups)
}

/// Condition deciding whether [`required_if`] applies.
pub enum Condition {
    /// A known answer.
    Fixed(bool),
    /// A predicate resolved when the rule is built.
    Lazy(Box<dyn FnOnce() -> bool>),
}

impl Condition {
    /// Defer the answer to a zero-argument predicate.
    pub fn lazy<F>(predicate: F) -> Self
    where
        F: FnOnce() -> bool + 'static,
    {
        Condition::Lazy(Box::new(predicate))
    }

    fn resolve(self) -> bool {
        match self {
            Condition::Fixed(required) => required,
            Condition::Lazy(predicate) => predicate(),
        }
    }
}

impl From<bool> for Condition {
    fn from(required: bool) -> Self {
        Condition::Fixed(required)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Fixed(required) => f.debug_tuple("Fixed").field(required).finish(),
            Condition::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

/// Require a non-empty value when `condition` holds.
///
/// The condition is resolved once, here. Strings are trimmed before the
/// emptiness check; `null`, `false`, `0`, `"0"` and empty collections
/// also count as empty.
///
/// # Example
///
/// ```
/// use sluice::rule::{required_if, Condition, Rule, Verdict};
/// use serde_json::json;
///
/// let rule = required_if(true);
/// assert_eq!(
///     rule.evaluate(&json!("  ")).unwrap(),
///     Verdict::fail("This field is required.")
/// );
/// assert_eq!(rule.evaluate(&json!("aa")).unwrap(), Verdict::Pass);
///
/// let never = required_if(Condition::lazy(|| false));
/// assert_eq!(never.evaluate(&json!("")).unwrap(), Verdict::Pass);
/// ```
pub fn required_if(condition: impl Into<Condition>) -> Custom {
    required_if_with(condition, REQUIRED_MESSAGE)
}

/// [`required_if`] with a custom message.
pub fn required_if_with(condition: impl Into<Condition>, message: impl Into<String>) -> Custom {
    let required = condition.into().resolve();
    let message = message.into();
    let fallback = message.clone();
    Custom::new(move |value, fail| {
        if !required {
            return;
        }
        let empty = match value {
            Value::String(s) => {
                let trimmed = s.trim();
                trimmed.is_empty() || trimmed == "0"
            }
            other => is_empty_value(other),
        };
        if empty {
            fail(message.as_str());
        }
    })
    .with_message(fallback)
    .with_name("required_if")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn passes_when_fail_not_called() {
        let rule = make(|_, _| {});
        assert_eq!(rule.evaluate(&json!("anything")).unwrap(), Verdict::Pass);
    }

    #[test]
    fn last_message_wins() {
        let rule = make(|_, fail| {
            fail("first");
            fail("second");
        });
        assert_eq!(rule.evaluate(&json!(1)).unwrap(), Verdict::fail("second"));
    }

    #[test]
    fn empty_message_falls_back_to_default() {
        let rule = make(|_, fail| fail(""));
        assert_eq!(rule.evaluate(&json!(1)).unwrap(), Verdict::fail(DEFAULT_MESSAGE));

        let rule = make(|_, fail| fail("")).with_message("Nope");
        assert_eq!(rule.evaluate(&json!(1)).unwrap(), Verdict::fail("Nope"));
    }

    #[test]
    fn evaluation_does_not_leak_between_calls() {
        let rule = make(|value, fail| {
            if value.is_null() {
                fail("null");
            }
        });
        assert!(rule.evaluate(&Value::Null).unwrap().is_fail());
        assert!(rule.evaluate(&json!(1)).unwrap().is_pass());
    }

    #[test]
    fn fallible_error_propagates() {
        let rule = Custom::fallible(|_, _| Err("backend down".into()));
        let err = rule.evaluate(&json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "backend down");
    }

    #[test]
    fn panic_becomes_error() {
        let rule = make(|_, _| panic!("boom"));
        let err = rule.evaluate(&json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "custom predicate panicked: boom");
    }

    #[test]
    fn builder_requires_callback() {
        let err = Custom::builder().groups(["a"]).build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn builder_sets_options() {
        let rule = Custom::builder()
            .message("Bad")
            .name("bad")
            .groups(["admin"])
            .callback(|_, fail| fail(""))
            .build()
            .unwrap();
        assert_eq!(rule.name(), "bad");
        assert_eq!(rule.groups(), ["admin".to_string()]);
        assert_eq!(rule.evaluate(&json!(1)).unwrap(), Verdict::fail("Bad"));
    }

    #[test]
    fn groups_set_on_made_rule() {
        let rule = make_in(|_, fail| fail("no"), ["admin", "audit"]);
        assert_eq!(rule.groups(), ["admin".to_string(), "audit".to_string()]);
        let retagged = rule.with_groups(["strict"]);
        assert_eq!(retagged.groups(), ["strict".to_string()]);
        assert_eq!(retagged.evaluate(&json!(1)).unwrap(), Verdict::fail("no"));
    }

    #[test]
    fn required_if_resolves_condition_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rule = required_if(Condition::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }));
        rule.evaluate(&json!("")).unwrap();
        rule.evaluate(&json!("x")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn required_if_emptiness() {
        let rule = required_if(true);
        for empty in [json!(null), json!(""), json!("   "), json!("0"), json!(0), json!(false), json!([]), json!({})] {
            assert_eq!(
                rule.evaluate(&empty).unwrap(),
                Verdict::fail(REQUIRED_MESSAGE),
                "{empty} should count as empty"
            );
        }
        for filled in [json!("aa"), json!(1), json!(true), json!([0])] {
            assert!(rule.evaluate(&filled).unwrap().is_pass(), "{filled} should pass");
        }
    }

    #[test]
    fn required_if_false_never_fails() {
        let rule = required_if(false);
        assert!(rule.evaluate(&json!("")).unwrap().is_pass());
    }

    #[test]
    fn required_if_custom_message() {
        let rule = required_if_with(true, "Name please");
        assert_eq!(rule.evaluate(&json!("")).unwrap(), Verdict::fail("Name please"));
    }
}
