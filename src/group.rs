//! Validation groups
//!
//! A run selects rules by group. Rules without tags are in the default
//! group and run on every pass; tagged rules run only when one of their
//! tags is selected.
//!
//! A [`ValidationGroup::Sequence`] checks groups one after another for each
//! attribute and stops at the first group in which the attribute fails.
//!
//! # Example
//!
//! ```
//! use sluice::ValidationGroup;
//!
//! assert_eq!(ValidationGroup::from("admin"), ValidationGroup::Groups(vec!["admin".into()]));
//! assert_eq!(
//!     ValidationGroup::sequence(["Default", "strict"]),
//!     ValidationGroup::Sequence(vec!["Default".into(), "strict".into()])
//! );
//! ```

use crate::rule::Rule;

/// Name of the group untagged rules belong to.
pub const DEFAULT_GROUP: &str = "Default";

/// Which rules a validation run applies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ValidationGroup {
    /// Only untagged rules and rules tagged [`DEFAULT_GROUP`].
    #[default]
    Default,
    /// Untagged rules plus rules tagged with any of these names.
    Groups(Vec<String>),
    /// Each name in turn, stopping per attribute at the first failing group.
    ///
    /// Untagged rules run in the `Default` step if the sequence has one,
    /// otherwise in the first step. A rule tagged with several listed groups
    /// runs once, in the earliest of them.
    Sequence(Vec<String>),
}

impl ValidationGroup {
    /// Select several groups at once.
    pub fn groups<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationGroup::Groups(names.into_iter().map(Into::into).collect())
    }

    /// Check groups in order.
    pub fn sequence<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ValidationGroup::Sequence(names.into_iter().map(Into::into).collect())
    }

    /// The ordered selection steps of a run.
    pub(crate) fn steps(&self) -> Vec<Selector<'_>> {
        match self {
            ValidationGroup::Default => vec![Selector {
                names: Names::Default,
                untagged: true,
                earlier: &[],
            }],
            ValidationGroup::Groups(names) => vec![Selector {
                names: Names::Many(names),
                untagged: true,
                earlier: &[],
            }],
            ValidationGroup::Sequence(names) => {
                let default_step = names
                    .iter()
                    .position(|name| name == DEFAULT_GROUP)
                    .unwrap_or(0);
                names
                    .iter()
                    .enumerate()
                    .map(|(idx, name)| Selector {
                        names: Names::One(name),
                        untagged: idx == default_step,
                        earlier: &names[..idx],
                    })
                    .collect()
            }
        }
    }
}

impl From<&str> for ValidationGroup {
    fn from(name: &str) -> Self {
        ValidationGroup::Groups(vec![name.to_string()])
    }
}

impl From<String> for ValidationGroup {
    fn from(name: String) -> Self {
        ValidationGroup::Groups(vec![name])
    }
}

impl From<Vec<String>> for ValidationGroup {
    fn from(names: Vec<String>) -> Self {
        ValidationGroup::Groups(names)
    }
}

impl<const N: usize> From<[&str; N]> for ValidationGroup {
    fn from(names: [&str; N]) -> Self {
        ValidationGroup::groups(names)
    }
}

impl<T: Into<ValidationGroup>> From<Option<T>> for ValidationGroup {
    fn from(group: Option<T>) -> Self {
        group.map_or(ValidationGroup::Default, Into::into)
    }
}

#[derive(Debug, Clone, Copy)]
enum Names<'a> {
    Default,
    One(&'a str),
    Many(&'a [String]),
}

/// One selection step: which tagged rules apply and whether untagged rules do.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Selector<'a> {
    names: Names<'a>,
    untagged: bool,
    /// Groups already checked in earlier steps of a sequence.
    earlier: &'a [String],
}

impl Selector<'_> {
    pub(crate) fn applies(&self, rule: &dyn Rule) -> bool {
        let tags = rule.groups();
        if tags.is_empty() {
            return self.untagged;
        }
        match self.names {
            Names::Default => tags.iter().any(|tag| tag == DEFAULT_GROUP),
            Names::One(name) => {
                tags.iter().any(|tag| tag == name)
                    && !tags.iter().any(|tag| self.earlier.contains(tag))
            }
            Names::Many(names) => tags.iter().any(|tag| names.contains(tag)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::builtin::not_blank;
    use crate::rule::RuleExt;

    #[test]
    fn default_applies_untagged_only() {
        let steps = ValidationGroup::Default.steps();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].applies(&not_blank("x")));
        assert!(!steps[0].applies(&not_blank("x").in_groups(["admin"])));
        assert!(steps[0].applies(&not_blank("x").in_groups([DEFAULT_GROUP])));
    }

    #[test]
    fn named_group_adds_tagged_rules() {
        let group = ValidationGroup::from("admin");
        let steps = group.steps();
        assert!(steps[0].applies(&not_blank("x")));
        assert!(steps[0].applies(&not_blank("x").in_groups(["admin", "audit"])));
        assert!(!steps[0].applies(&not_blank("x").in_groups(["audit"])));
    }

    #[test]
    fn lowercase_default_does_not_select_admin() {
        let group = ValidationGroup::from("default");
        let steps = group.steps();
        assert!(!steps[0].applies(&not_blank("x").in_groups(["admin"])));
    }

    #[test]
    fn sequence_places_untagged_in_default_step() {
        let group = ValidationGroup::sequence(["strict", "Default"]);
        let steps = group.steps();
        assert_eq!(steps.len(), 2);
        assert!(!steps[0].applies(&not_blank("x")));
        assert!(steps[1].applies(&not_blank("x")));
        assert!(steps[0].applies(&not_blank("x").in_groups(["strict"])));
        assert!(!steps[1].applies(&not_blank("x").in_groups(["strict"])));
    }

    #[test]
    fn sequence_without_default_runs_untagged_first() {
        let group = ValidationGroup::sequence(["first", "second"]);
        let steps = group.steps();
        assert!(steps[0].applies(&not_blank("x")));
        assert!(!steps[1].applies(&not_blank("x")));
    }

    #[test]
    fn sequence_runs_multi_tagged_rule_in_earliest_step() {
        let group = ValidationGroup::sequence(["first", "second", "third"]);
        let steps = group.steps();
        let rule = not_blank("x").in_groups(["third", "second"]);
        assert!(!steps[0].applies(&rule));
        assert!(steps[1].applies(&rule));
        assert!(!steps[2].applies(&rule));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(ValidationGroup::from(None::<&str>), ValidationGroup::Default);
        assert_eq!(
            ValidationGroup::from(Some("admin")),
            ValidationGroup::Groups(vec!["admin".to_string()])
        );
    }
}
