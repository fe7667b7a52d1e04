//! Result collections of a validation run
//!
//! [`Errors`] holds failure messages per attribute and [`ValidatedInput`]
//! holds the values that passed. Both keep insertion order.

mod errors;
mod validated;

pub use errors::Errors;
pub use validated::ValidatedInput;

use serde_json::Value;

/// Placeholder replaced by the failing value in messages.
pub const VALUE_PLACEHOLDER: &str = "{{ value }}";

/// Substitute the failing value into a message.
///
/// `null` renders as the empty string, strings render without quotes and
/// everything else renders as JSON.
///
/// # Example
///
/// ```
/// use sluice::support::render_message;
/// use serde_json::json;
///
/// assert_eq!(render_message("Invalid: {{ value }}.", &json!("vz")), "Invalid: vz.");
/// assert_eq!(render_message("Invalid: {{ value }}.", &json!([1, 2])), "Invalid: [1,2].");
/// assert_eq!(render_message("Invalid: {{ value }}.", &json!(null)), "Invalid: .");
/// ```
pub fn render_message(message: &str, value: &Value) -> String {
    if !message.contains(VALUE_PLACEHOLDER) {
        return message.to_string();
    }
    let rendered = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    message.replace(VALUE_PLACEHOLDER, &rendered)
}
