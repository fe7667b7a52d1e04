//! Testing utilities for rules and validators
//!
//! This module provides a stub rule with a fixed outcome that counts its
//! invocations, assertion macros for validators, and property-based testing
//! strategies behind the `proptest` feature.
//!
//! # Examples
//!
//! ## StubRule
//!
//! ```rust
//! use sluice::testing::StubRule;
//! use sluice::{sequentially, Validator};
//!
//! let first = StubRule::fail("first");
//! let second = StubRule::fail("second");
//! let mut validator = Validator::new([("x", sequentially![first.clone(), second.clone()])]);
//!
//! validator.validate().unwrap();
//! assert_eq!(first.calls(), 1);
//! assert_eq!(second.calls(), 0);
//! ```
//!
//! ## Assertion Macros
//!
//! ```rust
//! use sluice::rule::builtin::not_blank;
//! use sluice::{assert_fails_with, assert_passes, Validator};
//! use serde_json::json;
//!
//! let mut ok = Validator::make([("name", json!("Ada"))], [("name", not_blank("Name is required"))]);
//! assert_passes!(ok);
//!
//! let mut missing = Validator::new([("name", not_blank("Name is required"))]);
//! assert_fails_with!(missing, "name", "Name is required");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::error::BoxError;
use crate::rule::{Rule, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Pass,
    Fail(String),
    Error(String),
}

/// A rule with a fixed outcome that records how often it ran.
///
/// Clones share the invocation counter, so a clone can be handed to a
/// validator while the original is kept for assertions.
///
/// # Example
///
/// ```rust
/// use sluice::rule::Rule;
/// use sluice::testing::StubRule;
/// use serde_json::Value;
///
/// let stub = StubRule::error("backend offline").named("lookup");
/// assert!(stub.evaluate(&Value::Null).is_err());
/// assert_eq!(stub.name(), "lookup");
/// assert_eq!(stub.calls(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct StubRule {
    outcome: Outcome,
    name: String,
    calls: Arc<AtomicUsize>,
}

impl StubRule {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            outcome,
            name: "stub".to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A rule that always passes.
    pub fn pass() -> Self {
        Self::with_outcome(Outcome::Pass)
    }

    /// A rule that always fails with `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Fail(message.into()))
    }

    /// A rule that can never run and returns `message` as its error.
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Error(message.into()))
    }

    /// Rename the rule.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// How many times this rule or any of its clones was evaluated.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Rule for StubRule {
    fn evaluate(&self, _value: &Value) -> Result<Verdict, BoxError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Pass => Ok(Verdict::Pass),
            Outcome::Fail(message) => Ok(Verdict::Fail(message.clone())),
            Outcome::Error(message) => Err(message.clone().into()),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Assert that a validator passes.
///
/// Runs `validate()` and panics with the collected errors if it fails or
/// aborts.
#[macro_export]
macro_rules! assert_passes {
    ($validator:expr) => {
        match $validator.validate() {
            Ok(true) => {}
            Ok(false) => panic!("Expected validation to pass, got errors: {}", $validator.errors()),
            Err(e) => panic!("Expected validation to pass, got error: {}", e),
        }
    };
}

/// Assert that a validator fails with `message` as the first error of `attribute`.
#[macro_export]
macro_rules! assert_fails_with {
    ($validator:expr, $attribute:expr, $message:expr) => {
        match $validator.validate() {
            Ok(false) => {
                assert_eq!($validator.errors().first($attribute), Some($message));
            }
            Ok(true) => panic!("Expected validation to fail for {:?}, got success", $attribute),
            Err(e) => panic!("Expected validation to fail for {:?}, got error: {}", $attribute, e),
        }
    };
}

/// Strategies for raw input values.
#[cfg(feature = "proptest")]
pub mod strategies {
    use proptest::prelude::*;
    use serde_json::Value;

    /// Any scalar JSON value: null, booleans, integers and short strings.
    pub fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,16}".prop_map(Value::from),
        ]
    }

    /// Non-empty printable strings that contain no whitespace.
    pub fn word() -> impl Strategy<Value = Value> {
        "[!-~]{1,16}".prop_map(Value::from)
    }
}
