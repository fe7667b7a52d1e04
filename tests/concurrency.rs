//! Validators built from one shared rule set, run on separate tasks

use futures::future::join_all;
use serde_json::json;
use sluice::rule::builtin::{email, not_blank};
use sluice::rule::RuleExt;
use sluice::testing::StubRule;
use sluice::{sequentially, RuleNode, Validator};

#[tokio::test]
async fn independent_validators_share_rules() {
    let email_rules = sequentially![not_blank("Email is required"), email("Invalid email")];
    let counter = StubRule::pass();
    let audited = RuleNode::single(counter.clone().shared());
    let template = Validator::new([("email", email_rules), ("audit", audited)]);

    let inputs = ["ada@example.com", "nope", "", "grace@example.org", "x@y"];
    let handles = inputs.iter().map(|input| {
        let mut validator = template.clone();
        let input = input.to_string();
        tokio::spawn(async move {
            validator.set_data([("email", json!(input.clone()))]);
            let passed = validator.validate().unwrap();
            (input, passed, validator.errors().first("email").map(str::to_string))
        })
    });

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(
        results,
        vec![
            ("ada@example.com".to_string(), true, None),
            ("nope".to_string(), false, Some("Invalid email".to_string())),
            ("".to_string(), false, Some("Email is required".to_string())),
            ("grace@example.org".to_string(), true, None),
            ("x@y".to_string(), false, Some("Invalid email".to_string())),
        ]
    );
    assert_eq!(counter.calls(), inputs.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn blocking_runs_on_worker_threads() {
    let template = Validator::new([("name", not_blank("Name is required"))]);

    let handles = (0..16).map(|i| {
        let mut validator = template.clone();
        tokio::task::spawn_blocking(move || {
            if i % 2 == 0 {
                validator.set_data([("name", json!(format!("user-{i}")))]);
            }
            validator.validate().unwrap()
        })
    });

    let outcomes: Vec<bool> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    for (i, passed) in outcomes.into_iter().enumerate() {
        assert_eq!(passed, i % 2 == 0, "run {i}");
    }
}
