//! The rule evaluator interface and rule composition
//!
//! Every rule, built-in or custom, implements [`Rule`]. The orchestrator
//! only ever sees `dyn Rule`: it calls [`Rule::evaluate`] and reads
//! [`Rule::groups`], and never branches on the concrete rule type.
//!
//! # Example
//!
//! ```
//! use sluice::rule::{Rule, RuleExt, Verdict};
//! use sluice::rule::builtin::not_blank;
//! use serde_json::json;
//!
//! let rule = not_blank("Name is required");
//! assert_eq!(rule.evaluate(&json!("Ada")).unwrap(), Verdict::Pass);
//! assert_eq!(
//!     rule.evaluate(&json!("  ")).unwrap(),
//!     Verdict::fail("Name is required")
//! );
//!
//! let admin_only = not_blank("Role is required").in_groups(["admin"]);
//! assert_eq!(admin_only.groups(), ["admin".to_string()]);
//! ```

pub mod builtin;
pub mod custom;
pub mod node;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;

pub use custom::{make, make_in, required_if, required_if_with, Condition, Custom, CustomBuilder, Fail};
pub use node::RuleNode;

/// Outcome of evaluating a single rule against a value.
///
/// `Fail` carries the message to report for the attribute. A rule that
/// could not run at all returns an `Err` from [`Rule::evaluate`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Verdict {
    /// The value satisfies the rule.
    Pass,
    /// The value violates the rule.
    Fail(String),
}

impl Verdict {
    /// Create a passing verdict.
    #[inline]
    pub fn pass() -> Self {
        Verdict::Pass
    }

    /// Create a failing verdict with a message.
    #[inline]
    pub fn fail(message: impl Into<String>) -> Self {
        Verdict::Fail(message.into())
    }

    /// Pass when `ok` holds, otherwise fail with `message`.
    ///
    /// # Example
    ///
    /// ```
    /// use sluice::rule::Verdict;
    ///
    /// assert_eq!(Verdict::check(true, "nope"), Verdict::Pass);
    /// assert_eq!(Verdict::check(false, "nope"), Verdict::fail("nope"));
    /// ```
    #[inline]
    pub fn check(ok: bool, message: impl Into<String>) -> Self {
        if ok {
            Verdict::Pass
        } else {
            Verdict::Fail(message.into())
        }
    }

    /// Check if the value passed.
    #[inline]
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Check if the value failed.
    #[inline]
    pub fn is_fail(&self) -> bool {
        matches!(self, Verdict::Fail(_))
    }

    /// The failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(message) => Some(message),
        }
    }

    /// Convert into a `Result`, with the failure message as the error.
    pub fn into_result(self) -> Result<(), String> {
        match self {
            Verdict::Pass => Ok(()),
            Verdict::Fail(message) => Err(message),
        }
    }
}

impl From<Result<(), String>> for Verdict {
    fn from(result: Result<(), String>) -> Self {
        match result {
            Ok(()) => Verdict::Pass,
            Err(message) => Verdict::Fail(message),
        }
    }
}

/// A unit of validation logic applied to one attribute value.
///
/// Rules are shared behind `Arc` and may be evaluated from several
/// validators at once, so they must be `Send + Sync`. Evaluation takes
/// `&self`; a rule that needs to record something uses interior mutability.
///
/// # Example
///
/// ```
/// use sluice::rule::{Rule, Verdict};
/// use sluice::BoxError;
/// use serde_json::Value;
///
/// #[derive(Debug)]
/// struct Even;
///
/// impl Rule for Even {
///     fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError> {
///         let n = value.as_i64().ok_or("expected an integer")?;
///         Ok(Verdict::check(n % 2 == 0, "Must be even"))
///     }
///
///     fn name(&self) -> &str {
///         "even"
///     }
/// }
///
/// assert_eq!(Even.evaluate(&Value::from(4)).unwrap(), Verdict::Pass);
/// assert!(Even.evaluate(&Value::from("four")).is_err());
/// ```
pub trait Rule: fmt::Debug + Send + Sync {
    /// Evaluate the rule against a raw value.
    ///
    /// Return `Ok(Verdict::Fail(..))` for invalid input. Reserve `Err` for
    /// failures that mean validation could not be performed.
    ///
    /// Implementations should not panic. A panic unwinds out of the run and
    /// leaves the validator in [`RunState::Aborted`](crate::RunState::Aborted);
    /// wrap panicking code in [`Custom`] to get an `Err` instead.
    fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError>;

    /// Validation groups this rule belongs to.
    ///
    /// An empty slice means the rule is in the default group and applies
    /// to every run.
    fn groups(&self) -> &[String] {
        &[]
    }

    /// Short name used in logs and execution errors.
    fn name(&self) -> &str {
        "rule"
    }
}

impl<R: Rule + ?Sized> Rule for Arc<R> {
    #[inline]
    fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError> {
        (**self).evaluate(value)
    }

    fn groups(&self) -> &[String] {
        (**self).groups()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<R: Rule + ?Sized> Rule for Box<R> {
    #[inline]
    fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError> {
        (**self).evaluate(value)
    }

    fn groups(&self) -> &[String] {
        (**self).groups()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Extension trait for tagging and sharing rules.
pub trait RuleExt: Rule + Sized {
    /// Place the rule in the given validation groups.
    ///
    /// The rule is skipped by runs that do not select any of these groups.
    fn in_groups<I, S>(self, groups: I) -> Grouped<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Grouped {
            rule: self,
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Erase the concrete type and share the rule.
    fn shared(self) -> Arc<dyn Rule>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<R: Rule> RuleExt for R {}

/// A rule restricted to a set of validation groups.
///
/// Created by [`RuleExt::in_groups`].
#[derive(Debug, Clone)]
pub struct Grouped<R> {
    rule: R,
    groups: Vec<String>,
}

impl<R> Grouped<R> {
    /// The wrapped rule.
    pub fn inner(&self) -> &R {
        &self.rule
    }

    /// Unwrap the rule, dropping the group tags.
    pub fn into_inner(self) -> R {
        self.rule
    }
}

impl<R: Rule> Rule for Grouped<R> {
    #[inline]
    fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError> {
        self.rule.evaluate(value)
    }

    fn groups(&self) -> &[String] {
        &self.groups
    }

    fn name(&self) -> &str {
        self.rule.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct NonNull;

    impl Rule for NonNull {
        fn evaluate(&self, value: &Value) -> Result<Verdict, BoxError> {
            Ok(Verdict::check(!value.is_null(), "missing"))
        }

        fn name(&self) -> &str {
            "non_null"
        }
    }

    #[test]
    fn verdict_accessors() {
        assert!(Verdict::pass().is_pass());
        assert!(Verdict::fail("x").is_fail());
        assert_eq!(Verdict::fail("x").message(), Some("x"));
        assert_eq!(Verdict::pass().message(), None);
        assert_eq!(Verdict::fail("x").into_result(), Err("x".to_string()));
        assert_eq!(Verdict::from(Ok(())), Verdict::Pass);
    }

    #[test]
    fn ungrouped_rule_has_no_tags() {
        assert!(NonNull.groups().is_empty());
    }

    #[test]
    fn grouped_rule_delegates() {
        let rule = NonNull.in_groups(["admin", "audit"]);
        assert_eq!(rule.groups(), ["admin".to_string(), "audit".to_string()]);
        assert_eq!(rule.name(), "non_null");
        assert_eq!(rule.evaluate(&Value::Null).unwrap(), Verdict::fail("missing"));
        assert_eq!(rule.evaluate(&json!(1)).unwrap(), Verdict::Pass);
    }

    #[test]
    fn shared_rule_keeps_behaviour() {
        let rule = NonNull.in_groups(["admin"]).shared();
        assert_eq!(rule.groups(), ["admin".to_string()]);
        assert_eq!(rule.evaluate(&json!("a")).unwrap(), Verdict::Pass);
    }
}
