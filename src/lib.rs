//! # Sluice
//!
//! Declarative input validation: attach rules to named attributes, run them
//! against raw input, and get back the failure messages per attribute plus
//! the values that passed.
//!
//! ## Pieces
//!
//! - [`rule::Rule`] is the one evaluator interface. Built-in rules live in
//!   [`rule::builtin`]; closures become rules through [`rule::make`].
//! - [`rule::RuleNode`] composes rules per attribute: a list runs every
//!   member, a sequential group stops at the first failure.
//! - [`Validator`] runs the rules and fills [`Errors`] and [`ValidatedInput`].
//!
//! A failing input is not an error: [`Validator::validate`] returns
//! `Ok(false)`. `Err` means validation could not be performed.
//!
//! ## Quick Example
//!
//! ```rust
//! use sluice::rule::builtin::{email, length, not_blank};
//! use sluice::{list, sequentially, Validator};
//! use serde_json::json;
//!
//! let mut validator = Validator::make(
//!     [("email", json!("ada@example")), ("password", json!("secret"))],
//!     [
//!         ("email", sequentially![not_blank("Email is required"), email("Invalid email")]),
//!         ("password", list![not_blank("Password is required"), length(8, 20)]),
//!     ],
//! );
//!
//! match validator.validate() {
//!     Ok(true) => println!("valid: {:?}", validator.validated_all()),
//!     Ok(false) => {
//!         for (attribute, messages) in validator.errors() {
//!             println!("{attribute}: {messages:?}");
//!         }
//!     }
//!     Err(err) => eprintln!("could not validate: {err}"),
//! }
//!
//! assert_eq!(validator.errors().first("email"), Some("Invalid email"));
//! assert_eq!(
//!     validator.errors().first("password"),
//!     Some("This value is too short. It should have 8 characters or more.")
//! );
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod compose;
pub mod error;
pub mod group;
pub mod registry;
pub mod rule;
pub mod support;
pub mod testing;
pub mod validator;

// Re-exports
pub use error::{BoxError, Error, Result};
pub use group::{ValidationGroup, DEFAULT_GROUP};
pub use registry::Registry;
pub use rule::{Rule, RuleExt, RuleNode, Verdict};
pub use support::{Errors, ValidatedInput};
pub use validator::{Attribute, Capability, RunState, Schema, Validator, ValidatorBuilder};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::group::ValidationGroup;
    pub use crate::registry::Registry;
    pub use crate::rule::builtin::{email, length, matches, max_length, min_length, not_blank};
    pub use crate::rule::{make, make_in, required_if, Condition, Rule, RuleExt, RuleNode, Verdict};
    pub use crate::support::{Errors, ValidatedInput};
    pub use crate::validator::{Attribute, Schema, Validator};
    pub use crate::{list, sequentially};
}
