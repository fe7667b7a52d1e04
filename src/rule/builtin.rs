//! Atomic rules shipped with the crate
//!
//! These are ordinary [`Rule`] implementations with no special standing in
//! the engine. Like most format checks, [`Email`], [`Matches`] and
//! [`Length`] accept `null` and the empty string so they can be combined
//! with [`NotBlank`] to decide presence separately.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::{Rule, Verdict};
use crate::error::{BoxError, Error, Result};

static HTML5_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("static email pattern compiles")
});

/// Returns true for values that count as "empty".
///
/// `null`, `false`, `0`, `0.0`, `""`, `"0"`, `[]` and `{}` are empty.
/// Strings are not trimmed here.
///
/// # Example
///
/// ```
/// use sluice::rule::builtin::is_empty_value;
/// use serde_json::json;
///
/// assert!(is_empty_value(&json!("0")));
/// assert!(is_empty_value(&json!([])));
/// assert!(!is_empty_value(&json!(" ")));
/// ```
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

/// Text form of a scalar value; `None` for `null`.
fn scalar_text(value: &Value) -> std::result::Result<Option<Cow<'_, str>>, BoxError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(Cow::Borrowed(s.as_str()))),
        Value::Number(n) => Ok(Some(Cow::Owned(n.to_string()))),
        Value::Bool(b) => Ok(Some(Cow::Owned(b.to_string()))),
        Value::Array(_) | Value::Object(_) => {
            Err(format!("expected a scalar value, got {}", kind(value)).into())
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Rejects `null`, `false`, empty collections and blank strings.
#[derive(Debug, Clone)]
pub struct NotBlank {
    message: String,
}

/// Create a [`NotBlank`] rule.
pub fn not_blank(message: impl Into<String>) -> NotBlank {
    NotBlank {
        message: message.into(),
    }
}

impl Rule for NotBlank {
    fn evaluate(&self, value: &Value) -> std::result::Result<Verdict, BoxError> {
        let blank = match value {
            Value::Null | Value::Bool(false) => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            Value::Bool(true) | Value::Number(_) => false,
        };
        Ok(Verdict::check(!blank, &*self.message))
    }

    fn name(&self) -> &str {
        "not_blank"
    }
}

/// Accepts addresses matching the HTML5 `input[type=email]` syntax.
#[derive(Debug, Clone)]
pub struct Email {
    message: String,
}

/// Create an [`Email`] rule.
///
/// # Example
///
/// ```
/// use sluice::rule::{builtin::email, Rule};
/// use serde_json::json;
///
/// let rule = email("Invalid email");
/// assert!(rule.evaluate(&json!("abc@gmail.com")).unwrap().is_pass());
/// assert!(rule.evaluate(&json!("abcd12312313")).unwrap().is_fail());
/// ```
pub fn email(message: impl Into<String>) -> Email {
    Email {
        message: message.into(),
    }
}

impl Rule for Email {
    fn evaluate(&self, value: &Value) -> std::result::Result<Verdict, BoxError> {
        match scalar_text(value)? {
            None => Ok(Verdict::Pass),
            Some(text) if text.is_empty() => Ok(Verdict::Pass),
            Some(text) => Ok(Verdict::check(HTML5_EMAIL.is_match(&text), &*self.message)),
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Accepts values matching a regular expression.
#[derive(Debug, Clone)]
pub struct Matches {
    pattern: Regex,
    message: String,
}

/// Create a [`Matches`] rule.
///
/// # Errors
///
/// Returns [`Error::Configuration`] when the pattern does not compile.
///
/// # Example
///
/// ```
/// use sluice::rule::{builtin::matches, Rule, Verdict};
/// use serde_json::json;
///
/// let rule = matches(r"^\w+$", "Invalid value").unwrap();
/// assert_eq!(rule.evaluate(&json!("abcd12345")).unwrap(), Verdict::Pass);
/// assert_eq!(
///     rule.evaluate(&json!("abcd12345@#$")).unwrap(),
///     Verdict::fail("Invalid value")
/// );
/// assert!(matches("(", "broken").is_err());
/// ```
pub fn matches(pattern: &str, message: impl Into<String>) -> Result<Matches> {
    let pattern = Regex::new(pattern)
        .map_err(|err| Error::configuration(format!("invalid pattern `{pattern}`: {err}")))?;
    Ok(Matches {
        pattern,
        message: message.into(),
    })
}

impl Matches {
    /// The compiled pattern.
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }
}

impl Rule for Matches {
    fn evaluate(&self, value: &Value) -> std::result::Result<Verdict, BoxError> {
        match scalar_text(value)? {
            None => Ok(Verdict::Pass),
            Some(text) if text.is_empty() => Ok(Verdict::Pass),
            Some(text) => Ok(Verdict::check(self.pattern.is_match(&text), &*self.message)),
        }
    }

    fn name(&self) -> &str {
        "matches"
    }
}

/// Bounds the character length of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    min: usize,
    max: usize,
}

/// Create a [`Length`] rule with inclusive bounds.
///
/// # Example
///
/// ```
/// use sluice::rule::{builtin::length, Rule, Verdict};
/// use serde_json::json;
///
/// let rule = length(3, 5);
/// assert_eq!(rule.evaluate(&json!("abcd")).unwrap(), Verdict::Pass);
/// assert_eq!(
///     rule.evaluate(&json!("ab")).unwrap(),
///     Verdict::fail("This value is too short. It should have 3 characters or more.")
/// );
/// ```
pub fn length(min: usize, max: usize) -> Length {
    Length { min, max }
}

/// Create a [`Length`] rule with only a lower bound.
pub fn min_length(min: usize) -> Length {
    Length {
        min,
        max: usize::MAX,
    }
}

/// Create a [`Length`] rule with only an upper bound.
pub fn max_length(max: usize) -> Length {
    Length { min: 0, max }
}

impl Rule for Length {
    fn evaluate(&self, value: &Value) -> std::result::Result<Verdict, BoxError> {
        let Some(text) = scalar_text(value)? else {
            return Ok(Verdict::Pass);
        };
        let count = text.chars().count();
        if count < self.min {
            Ok(Verdict::fail(format!(
                "This value is too short. It should have {} characters or more.",
                self.min
            )))
        } else if count > self.max {
            Ok(Verdict::fail(format!(
                "This value is too long. It should have {} characters or less.",
                self.max
            )))
        } else {
            Ok(Verdict::Pass)
        }
    }

    fn name(&self) -> &str {
        "length"
    }
}
