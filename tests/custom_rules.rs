//! Custom predicates and conditional presence through a full validator run

use serde_json::{json, Value};
use sluice::rule::builtin::matches;
use sluice::rule::{make, required_if, Condition, Custom, RuleNode};
use sluice::{assert_fails_with, Error, RunState, Validator};

fn alphanumeric() -> Custom {
    make(|value, fail| {
        let ok = value
            .as_str()
            .is_some_and(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_'));
        if !ok {
            fail("Invalid value");
        }
    })
}

/// Runs one keywords scenario and checks every accessor agrees.
fn check_keywords(rule: impl Into<RuleNode>, input: &str, expected: bool, message: Option<&str>) {
    let mut validator = Validator::make([("keywords", json!(input))], [("keywords", rule)]);
    assert_eq!(validator.all().get("keywords"), Some(&json!(input)));
    assert_eq!(validator.validate().unwrap(), expected);
    assert_eq!(validator.passes().unwrap(), expected);
    assert_eq!(validator.fails().unwrap(), !expected);

    if expected {
        assert_eq!(validator.validated("keywords"), Some(&json!(input)));
        assert!(validator.errors().is_empty());
        for (attribute, value) in validator.safe() {
            assert_eq!(attribute, "keywords");
            assert_eq!(value, &json!(input));
        }
    } else {
        assert!(!validator.errors().is_empty());
        assert_eq!(validator.errors().first("keywords"), message);
        for reported in validator.errors().get("keywords") {
            assert_eq!(Some(reported), message);
        }
    }
}

#[test]
fn alphanumeric_only() {
    check_keywords(alphanumeric(), "abcd12345", true, None);
}

#[test]
fn alphanumeric_with_special_characters() {
    check_keywords(alphanumeric(), "abcd12345@#$%", false, Some("Invalid value"));
}

#[test]
fn pattern_rule_matches_custom_rule() {
    let pattern = || matches(r"^\w+$", "Invalid value").unwrap();
    check_keywords(pattern(), "abcd12345", true, None);
    check_keywords(pattern(), "abcd12345@#$", false, Some("Invalid value"));
}

#[test]
fn required_if_true_with_value() {
    check_keywords(required_if(true), "aa", true, None);
}

#[test]
fn required_if_true_when_empty() {
    check_keywords(required_if(true), "", false, Some("This field is required."));
}

#[test]
fn required_if_false_with_value() {
    check_keywords(required_if(false), "aa", true, None);
}

#[test]
fn required_if_lazy_false_when_empty() {
    check_keywords(required_if(Condition::lazy(|| false)), "", true, None);
}

#[test]
fn missing_input_is_null() {
    let mut validator = Validator::new([("keywords", required_if(true))]);
    assert_fails_with!(validator, "keywords", "This field is required.");
    assert_eq!(validator.all().len(), 0);
}

#[test]
fn default_message_names_the_value() {
    let mut validator = Validator::make(
        [("code", json!("vz"))],
        [("code", make(|value, fail| {
            if value.as_str().is_some_and(|s| s.len() < 3) {
                fail("");
            }
        }))],
    );
    assert_fails_with!(validator, "code", "Invalid: vz.");
}

#[test]
fn builder_without_callback_is_rejected() {
    let err = Custom::builder().message("Too short").build().unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn panicking_predicate_aborts_run() {
    let mut validator = Validator::make(
        [("a", json!(1)), ("b", json!(2))],
        [
            ("a", RuleNode::from(make(|_, _| {}))),
            ("b", RuleNode::from(make(|_, _| panic!("predicate bug")))),
        ],
    );

    let err = validator.validate().unwrap_err();
    match &err {
        Error::RuleExecution { attribute, rule, .. } => {
            assert_eq!(attribute, "b");
            assert_eq!(rule, "custom");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("predicate bug"));
    assert_eq!(validator.state(), RunState::Aborted);
    assert_eq!(validator.validated("a"), Some(&json!(1)));
}

#[test]
fn fallible_predicate_error_is_not_a_validation_failure() {
    let lookup = Custom::fallible(|value, fail| {
        let name = value.as_str().ok_or("expected a username")?;
        if name == "taken" {
            fail("Username is taken");
        }
        Ok(())
    })
    .with_name("username_lookup");

    let mut validator = Validator::make([("username", json!("taken"))], [("username", lookup.clone())]);
    assert_fails_with!(validator, "username", "Username is taken");

    let mut validator = Validator::make([("username", Value::Null)], [("username", lookup)]);
    let err = validator.validate().unwrap_err();
    assert!(err.is_rule_execution());
    assert!(validator.errors().is_empty());
}
