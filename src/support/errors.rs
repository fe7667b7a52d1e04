use std::fmt;

use indexmap::IndexMap;

/// Failure messages recorded during a validation run, keyed by attribute.
///
/// Attributes appear in the order they first failed. Messages are kept in
/// the order they were added and an identical message is stored only once
/// per attribute.
///
/// # Example
///
/// ```
/// use sluice::Errors;
///
/// let mut errors = Errors::new();
/// errors.add("email", "Invalid email");
/// errors.add("email", "Invalid email");
/// errors.add("password", "Too short");
///
/// assert_eq!(errors.first("email"), Some("Invalid email"));
/// assert_eq!(errors.get("email").count(), 1);
/// assert_eq!(errors.get("name").count(), 0);
/// assert_eq!(errors.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Errors {
    messages: IndexMap<String, Vec<String>>,
}

impl Errors {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for an attribute, ignoring exact duplicates.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let messages = self.messages.entry(attribute.into()).or_default();
        if !messages.contains(&message) {
            messages.push(message);
        }
    }

    /// The earliest message recorded for an attribute.
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.messages
            .get(attribute)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Returns true if the attribute has any message.
    pub fn has(&self, attribute: &str) -> bool {
        self.messages
            .get(attribute)
            .is_some_and(|messages| !messages.is_empty())
    }

    /// The messages for an attribute, empty if it never failed.
    ///
    /// Each call starts a fresh iterator over the same messages.
    pub fn get<'a>(&'a self, attribute: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.messages
            .get(attribute)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// Snapshot of every attribute and its messages.
    pub fn all(&self) -> &IndexMap<String, Vec<String>> {
        &self.messages
    }

    /// Returns true when nothing failed.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of failed attributes.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Iterate attributes with their messages in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(attribute, messages)| (attribute.as_str(), messages.as_slice()))
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (attribute, messages)) in self.messages.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attribute}: {}", messages.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Errors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.messages.serialize(serializer)
    }
}
