//! Login Form Example
//!
//! Validates a few login attempts against a schema and prints the outcome,
//! with debug logs from the validation runs.
//!
//! Run with: cargo run --example login_form --features tracing

use serde_json::{json, Value};
use sluice::prelude::*;

struct LoginForm;

impl Schema for LoginForm {
    fn attributes(&self) -> Vec<Attribute> {
        vec!["email".into(), "password".into(), ("remember_me", json!(true)).into()]
    }

    fn rules(&self) -> Vec<(String, RuleNode)> {
        vec![
            (
                "email".into(),
                sequentially![not_blank("Email is required"), email("Invalid email")],
            ),
            (
                "password".into(),
                sequentially![
                    not_blank("Password is required"),
                    length(8, 20),
                    make(|value, fail| {
                        let password = value.as_str().unwrap_or_default();
                        let mixed = password.chars().any(|c| c.is_ascii_digit())
                            && password.chars().any(|c| c.is_ascii_uppercase())
                            && password.chars().any(|c| !c.is_ascii_alphanumeric());
                        if !mixed {
                            fail("Use a digit, an uppercase letter and a symbol");
                        }
                    }),
                ],
            ),
        ]
    }
}

fn attempt(email: &str, password: &str) -> Result<()> {
    let mut validator = Validator::from_schema(LoginForm);
    validator.set_data([("email", json!(email)), ("password", json!(password))]);

    if validator.validate()? {
        let safe: Vec<(&str, &Value)> = validator.safe().iter().collect();
        println!("  {email:?} accepted: {safe:?}");
    } else {
        println!("  {email:?} rejected:");
        for (attribute, messages) in validator.errors() {
            println!("    {attribute}: {}", messages.join("; "));
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("Login Form Example");
    println!("==================\n");

    attempt("abc@gmail.com", "adfAas@df23")?;
    attempt("vz", "adfaasdf23")?;
    attempt("abc@gmail.com", "sdf23")?;
    attempt("", "")?;

    Ok(())
}
