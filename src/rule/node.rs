//! Rule nodes: the composed rule structure attached to one attribute
//!
//! A node is a single rule, a list whose members all run, or a sequential
//! group that stops at its first failing member. Lists and sequential groups
//! hold nodes, so a sequential group can sit inside a list.
//!
//! # Example
//!
//! ```
//! use sluice::rule::builtin::{email, not_blank};
//! use sluice::rule::RuleNode;
//! use sluice::{list, sequentially};
//!
//! let flat = list![not_blank("Email is required"), email("Invalid email")];
//! assert!(flat.is_list());
//! assert_eq!(flat.len(), 2);
//!
//! let strict = sequentially![not_blank("Email is required"), email("Invalid email")];
//! assert!(strict.is_sequential());
//!
//! let single = RuleNode::from(email("Invalid email"));
//! assert!(single.is_single());
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{Rule, Verdict};
use crate::error::{Error, Result};
use crate::group::Selector;

/// The rules attached to one attribute.
#[derive(Debug, Clone)]
pub enum RuleNode {
    /// One rule, evaluated once.
    Single(Arc<dyn Rule>),
    /// Every member is evaluated; the first failure is reported.
    List(Vec<RuleNode>),
    /// Members are evaluated in order until one fails.
    Sequential(Vec<RuleNode>),
}

impl RuleNode {
    /// Wrap an already shared rule.
    pub fn single(rule: Arc<dyn Rule>) -> Self {
        RuleNode::Single(rule)
    }

    /// Build a list node.
    pub fn list<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RuleNode>,
    {
        RuleNode::List(members.into_iter().map(Into::into).collect())
    }

    /// Build a sequential group.
    pub fn sequential<I>(members: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<RuleNode>,
    {
        RuleNode::Sequential(members.into_iter().map(Into::into).collect())
    }

    /// Returns true for a single rule.
    pub fn is_single(&self) -> bool {
        matches!(self, RuleNode::Single(_))
    }

    /// Returns true for a list node.
    pub fn is_list(&self) -> bool {
        matches!(self, RuleNode::List(_))
    }

    /// Returns true for a sequential group.
    pub fn is_sequential(&self) -> bool {
        matches!(self, RuleNode::Sequential(_))
    }

    /// Number of direct members (1 for a single rule).
    pub fn len(&self) -> usize {
        match self {
            RuleNode::Single(_) => 1,
            RuleNode::List(members) | RuleNode::Sequential(members) => members.len(),
        }
    }

    /// Returns true for a list or group with no members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short description of the node's shape, for logs.
    pub fn shape(&self) -> &'static str {
        match self {
            RuleNode::Single(_) => "single",
            RuleNode::List(_) => "list",
            RuleNode::Sequential(_) => "sequential",
        }
    }

    /// Evaluate the node against `value`, returning the first failure message.
    ///
    /// Rules the selector does not apply are treated as passing.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for an empty list or group and
    /// [`Error::RuleExecution`] when a rule cannot run.
    pub(crate) fn evaluate(
        &self,
        attribute: &str,
        value: &Value,
        selector: &Selector<'_>,
    ) -> Result<Option<String>> {
        match self {
            RuleNode::Single(rule) => {
                if !selector.applies(rule.as_ref()) {
                    return Ok(None);
                }
                match rule.evaluate(value) {
                    Ok(Verdict::Pass) => Ok(None),
                    Ok(Verdict::Fail(message)) => Ok(Some(message)),
                    Err(source) => Err(Error::rule_execution(attribute, rule.name(), source)),
                }
            }
            RuleNode::List(members) => {
                if members.is_empty() {
                    return Err(empty_node(attribute, "list"));
                }
                let mut first = None;
                for member in members {
                    let failure = member.evaluate(attribute, value, selector)?;
                    if first.is_none() {
                        first = failure;
                    }
                }
                Ok(first)
            }
            RuleNode::Sequential(members) => {
                if members.is_empty() {
                    return Err(empty_node(attribute, "sequential group"));
                }
                for member in members {
                    if let Some(message) = member.evaluate(attribute, value, selector)? {
                        return Ok(Some(message));
                    }
                }
                Ok(None)
            }
        }
    }
}

fn empty_node(attribute: &str, shape: &str) -> Error {
    Error::configuration(format!("attribute `{attribute}` has an empty {shape}"))
}

impl<R: Rule + 'static> From<R> for RuleNode {
    fn from(rule: R) -> Self {
        RuleNode::Single(Arc::new(rule))
    }
}

impl From<Vec<RuleNode>> for RuleNode {
    fn from(members: Vec<RuleNode>) -> Self {
        RuleNode::List(members)
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Single(rule) => f.write_str(rule.name()),
            RuleNode::List(members) | RuleNode::Sequential(members) => {
                f.write_str(if self.is_list() { "[" } else { "seq[" })?;
                for (idx, member) in members.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Build a [`RuleNode::List`] from rules or nodes.
#[macro_export]
macro_rules! list {
    ($($rule:expr),* $(,)?) => {
        $crate::rule::RuleNode::List(vec![$($crate::rule::RuleNode::from($rule)),*])
    };
}

/// Build a [`RuleNode::Sequential`] group from rules or nodes.
#[macro_export]
macro_rules! sequentially {
    ($($rule:expr),* $(,)?) => {
        $crate::rule::RuleNode::Sequential(vec![$($crate::rule::RuleNode::from($rule)),*])
    };
}
