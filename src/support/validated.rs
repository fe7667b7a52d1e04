use indexmap::IndexMap;
use serde_json::Value;

/// Values that passed their rules during a validation run.
///
/// # Example
///
/// ```
/// use sluice::ValidatedInput;
/// use serde_json::json;
///
/// let mut safe = ValidatedInput::new();
/// safe.add("email", json!("ada@example.com"));
/// safe.add("remember_me", json!(true));
///
/// assert_eq!(safe.get("email"), Some(&json!("ada@example.com")));
/// assert_eq!(safe.only(&["email"]).len(), 1);
/// assert_eq!(safe.except(&["email"]).keys().collect::<Vec<_>>(), ["remember_me"]);
/// assert_eq!(safe.only(&[]).len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInput {
    values: IndexMap<String, Value>,
}

impl ValidatedInput {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value; a later value for the same attribute replaces it.
    pub fn add(&mut self, attribute: impl Into<String>, value: Value) {
        self.values.insert(attribute.into(), value);
    }

    /// The validated value of an attribute.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Every validated value.
    pub fn all(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// The values of the listed attributes, or everything for an empty list.
    pub fn only(&self, attributes: &[&str]) -> IndexMap<String, Value> {
        if attributes.is_empty() {
            return self.values.clone();
        }
        self.project(|attribute| attributes.contains(&attribute))
    }

    /// The values of all other attributes, or everything for an empty list.
    pub fn except(&self, attributes: &[&str]) -> IndexMap<String, Value> {
        if attributes.is_empty() {
            return self.values.clone();
        }
        self.project(|attribute| !attributes.contains(&attribute))
    }

    fn project(&self, keep: impl Fn(&str) -> bool) -> IndexMap<String, Value> {
        self.values
            .iter()
            .filter(|(attribute, _)| keep(attribute))
            .map(|(attribute, value)| (attribute.clone(), value.clone()))
            .collect()
    }

    /// Returns true when nothing was validated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of validated attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate attributes with their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .map(|(attribute, value)| (attribute.as_str(), value))
    }

    pub(crate) fn clear(&mut self) {
        self.values.clear();
    }
}

impl<'a> IntoIterator for &'a ValidatedInput {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl From<ValidatedInput> for IndexMap<String, Value> {
    fn from(input: ValidatedInput) -> Self {
        input.values
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ValidatedInput {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
