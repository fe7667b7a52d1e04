//! End-to-end behaviour of validation runs

use std::sync::Arc;

use serde_json::{json, Value};
use sluice::rule::builtin::{email, not_blank};
use sluice::testing::StubRule;
use sluice::rule::{Rule, Verdict};
use sluice::{list, sequentially, BoxError, Error, Registry, RuleNode, RunState, Validator};

#[test]
fn sequential_never_runs_after_a_failure() {
    let r1 = StubRule::fail("A");
    let r2 = StubRule::fail("B");
    let mut validator = Validator::new([("x", sequentially![r1.clone(), r2.clone()])]);

    assert!(!validator.validate().unwrap());
    assert_eq!(validator.errors().first("x"), Some("A"));
    assert_eq!(r1.calls(), 1);
    assert_eq!(r2.calls(), 0);
}

#[test]
fn list_reports_first_failure() {
    let r1 = StubRule::fail("A");
    let r2 = StubRule::fail("B");
    let mut validator = Validator::new([("x", list![r1.clone(), r2.clone()])]);

    assert!(!validator.validate().unwrap());
    assert_eq!(validator.errors().first("x"), Some("A"));
    assert_eq!(validator.errors().get("x").collect::<Vec<_>>(), ["A"]);
    assert_eq!(r2.calls(), 1);
}

#[test]
fn stop_on_first_failure_from_builder() {
    let mut validator = Validator::builder()
        .rule("a", StubRule::fail("A"))
        .rule("b", StubRule::fail("B"))
        .stop_on_first_failure(true)
        .build();
    assert!(!validator.validate().unwrap());
    assert_eq!(validator.errors().len(), 1);
    assert!(validator.errors().has("a"));
    assert_eq!(validator.state(), RunState::Failed);
}

#[test]
fn errors_follow_first_failure_order() {
    let mut validator = Validator::builder()
        .attributes(["z", "a", "m"])
        .rule("m", StubRule::fail("M"))
        .rule("z", StubRule::fail("Z"))
        .build();
    validator.validate().unwrap();
    let order: Vec<_> = validator.errors().iter().map(|(attr, _)| attr).collect();
    assert_eq!(order, ["z", "m"]);
    assert_eq!(validator.validated_all().keys().collect::<Vec<_>>(), ["a"]);
}

#[test]
fn incremental_rules_match_direct_list() {
    let mut incremental = Validator::make([("email", json!("nope"))], [("email", not_blank("required"))]);
    incremental
        .add_rule("email", email("Invalid email"))
        .add_rule("email", StubRule::fail("third"));

    let mut direct = Validator::make(
        [("email", json!("nope"))],
        [(
            "email",
            list![not_blank("required"), email("Invalid email"), StubRule::fail("third")],
        )],
    );

    assert_eq!(incremental.validate().unwrap(), direct.validate().unwrap());
    assert_eq!(incremental.errors(), direct.errors());
}

#[test]
fn sequential_group_keeps_stopping_after_merge() {
    let late = StubRule::fail("late");
    let mut validator = Validator::new([("x", sequentially![StubRule::fail("early")])]);
    validator.add_rule("x", late.clone());

    assert!(validator.rule("x").unwrap().is_sequential());
    validator.validate().unwrap();
    assert_eq!(validator.errors().first("x"), Some("early"));
    assert_eq!(late.calls(), 0);
}

#[test]
fn list_added_to_sequential_runs_beside_it() {
    let sibling = StubRule::fail("sibling");
    let mut validator = Validator::new([("x", sequentially![StubRule::pass()])]);
    validator.add_rule("x", list![sibling.clone()]);

    validator.validate().unwrap();
    assert_eq!(validator.errors().first("x"), Some("sibling"));
    assert_eq!(sibling.calls(), 1);
}

#[test]
fn passes_after_validate_does_not_rerun() {
    let rule = StubRule::pass();
    let mut validator = Validator::make([("x", json!(1))], [("x", rule.clone())]);
    assert!(validator.validate().unwrap());
    assert!(validator.passes().unwrap());
    assert!(!validator.fails().unwrap());
    assert_eq!(rule.calls(), 1);
}

#[test]
fn passes_reruns_after_an_aborted_run() {
    let flaky = StubRule::error("offline");
    let mut validator = Validator::new([
        ("a", RuleNode::from(StubRule::pass())),
        ("b", RuleNode::from(flaky.clone())),
    ]);

    assert!(validator.validate().unwrap_err().is_rule_execution());
    assert_eq!(validator.state(), RunState::Aborted);
    assert!(validator.validated("a").is_some());

    assert!(validator.passes().is_err());
    assert!(validator.fails().is_err());
    assert_eq!(flaky.calls(), 3);
}

#[derive(Debug)]
struct Explodes;

impl Rule for Explodes {
    fn evaluate(&self, _: &Value) -> Result<Verdict, BoxError> {
        panic!("explodes")
    }
}

#[test]
fn panicking_rule_leaves_run_aborted() {
    let mut validator = Validator::new([("x", not_blank("required"))]);
    validator.set_data([("x", json!("here"))]);
    assert!(validator.validate().unwrap());
    assert_eq!(validator.state(), RunState::Passed);

    validator.add_rule("y", Explodes);
    let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| validator.validate()));
    assert!(unwound.is_err());
    assert_eq!(validator.state(), RunState::Aborted);
}

#[test]
fn named_rules_from_registry() {
    let mut registry = Registry::new();
    registry.extend("uppercase", |value, fail| {
        if value.as_str().is_some_and(|s| s.chars().any(char::is_lowercase)) {
            fail("Uppercase only");
        }
    });
    let registry = Arc::new(registry);

    let mut validator = Validator::builder()
        .rule("code", not_blank("Code is required"))
        .registry(Arc::clone(&registry))
        .build();
    validator.add_named_rule("code", "uppercase").unwrap();
    validator.set_data([("code", json!("abc"))]);
    assert!(!validator.validate().unwrap());
    assert_eq!(validator.errors().first("code"), Some("Uppercase only"));

    let err = validator.add_named_rule("code", "lowercase").unwrap_err();
    assert!(matches!(err, Error::UnknownRule(name) if name == "lowercase"));

    let other = Validator::builder().registry(registry).build();
    assert!(format!("{other:?}").contains("uppercase"));
}

#[test]
fn capabilities_are_called_by_name() {
    let validator = Validator::builder()
        .rule("email", email("Invalid email"))
        .capability("describe", |v: &Validator, args: &[Value]| {
            let prefix = args.first().and_then(Value::as_str).unwrap_or("attributes");
            let names: Vec<_> = v.attributes().keys().cloned().collect();
            Ok(json!(format!("{prefix}: {}", names.join(", "))))
        })
        .build();

    assert_eq!(
        validator.call("describe", &[json!("fields")]).unwrap(),
        json!("fields: email")
    );
    assert!(matches!(
        validator.call("missing", &[]),
        Err(Error::UndefinedMethod(name)) if name == "missing"
    ));
}

#[test]
fn empty_sequence_is_a_configuration_error() {
    let mut validator = Validator::new([
        ("ok", RuleNode::from(StubRule::pass())),
        ("broken", RuleNode::Sequential(Vec::new())),
    ]);
    assert!(validator.validate().unwrap_err().is_configuration());
    assert_eq!(validator.state(), RunState::Aborted);
}

#[test]
fn state_follows_runs() {
    let mut validator = Validator::new([("x", not_blank("required"))]);
    assert_eq!(validator.state(), RunState::Idle);
    validator.validate().unwrap();
    assert_eq!(validator.state(), RunState::Failed);
    validator.set_data([("x", json!("here"))]);
    validator.validate().unwrap();
    assert_eq!(validator.state(), RunState::Passed);
}

#[test]
fn cloned_validators_are_independent() {
    let template = Validator::new([("x", not_blank("required"))]);
    let mut filled = template.clone();
    filled.set_data([("x", json!("value"))]);
    let mut empty = template;

    assert!(filled.validate().unwrap());
    assert!(!empty.validate().unwrap());
    assert!(filled.errors().is_empty());
}
