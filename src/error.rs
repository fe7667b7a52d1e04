//! Error types for rule registration and validation runs
//!
//! A failed validation is *not* an error: it is reported through
//! [`Errors`](crate::Errors) and a `false` return from
//! [`Validator::validate`](crate::Validator::validate). The variants here
//! cover the cases where validation could not be performed at all.
//!
//! # Examples
//!
//! ```
//! use sluice::{Error, Registry};
//!
//! let registry = Registry::new();
//! match registry.get("uppercase") {
//!     Err(Error::UnknownRule(name)) => assert_eq!(name, "uppercase"),
//!     _ => panic!("Expected UnknownRule"),
//! }
//! ```

/// Boxed error returned by a rule evaluator that could not run.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running a [`Validator`](crate::Validator).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A rule was registered in a shape that cannot be evaluated.
    ///
    /// Raised when a custom rule has no callback, when a pattern does not
    /// compile, or when an empty rule node is reached during a run.
    #[error("invalid rule configuration: {0}")]
    Configuration(String),

    /// A rule evaluator failed unexpectedly; the run was aborted.
    #[error("rule `{rule}` failed to run for attribute `{attribute}`: {source}")]
    RuleExecution {
        /// Attribute being validated when the rule failed.
        attribute: String,
        /// Name of the rule that failed.
        rule: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// A rule was referenced by name but never registered.
    #[error("no rule registered under the name `{0}`")]
    UnknownRule(String),

    /// A capability was called by name but never supplied.
    #[error("undefined method `{0}`")]
    UndefinedMethod(String),
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration(message.into())
    }

    /// Create a rule execution error.
    pub fn rule_execution(
        attribute: impl Into<String>,
        rule: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::RuleExecution {
            attribute: attribute.into(),
            rule: rule.into(),
            source: source.into(),
        }
    }

    /// Returns true if this error aborted a validation run.
    pub fn is_rule_execution(&self) -> bool {
        matches!(self, Error::RuleExecution { .. })
    }

    /// Returns true if this error comes from a malformed registration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
