//! Merging rules registered for the same attribute
//!
//! Adding rules to an attribute that already has some never drops an
//! existing rule and never changes how an existing sequential group stops.
//!
//! | existing       | incoming        | result                      |
//! |----------------|-----------------|-----------------------------|
//! | none           | any node        | the incoming node           |
//! | `List(L)`      | single `r`      | `List(L + [r])`             |
//! | `List(L)`      | `List(L2)`      | `List(L + L2)`              |
//! | `List(L)`      | `Sequential(S)` | `List(L + [Sequential(S)])` |
//! | `Sequential(S)`| single `r`      | `Sequential(S + [r])`       |
//! | `Sequential(S)`| `List(L2)`      | `List([Sequential(S)] + L2)`|
//! | `Sequential(S)`| `Sequential(S2)`| `Sequential(S + S2)`        |
//! | `Single(r0)`   | single `r`      | `List([r0, r])`             |
//! | `Single(r0)`   | `List(L2)`      | `List([r0] + L2)`           |
//! | `Single(r0)`   | `Sequential(S)` | `List([r0, Sequential(S)])` |
//!
//! Duplicate rules are kept: adding the same rule twice runs it twice.
//!
//! # Example
//!
//! ```
//! use sluice::compose::merge;
//! use sluice::rule::builtin::{email, not_blank};
//! use sluice::sequentially;
//!
//! let node = merge(None, not_blank("required").into());
//! let node = merge(Some(node), email("invalid").into());
//! assert!(node.is_list());
//! assert_eq!(node.len(), 2);
//!
//! let strict = merge(None, sequentially![not_blank("required")]);
//! let strict = merge(Some(strict), email("invalid").into());
//! assert!(strict.is_sequential());
//! assert_eq!(strict.len(), 2);
//! ```

use crate::rule::RuleNode;

/// Merge `incoming` into the node already registered for an attribute.
pub fn merge(existing: Option<RuleNode>, incoming: RuleNode) -> RuleNode {
    let Some(existing) = existing else {
        return incoming;
    };

    #[cfg(feature = "tracing")]
    tracing::trace!(
        existing = existing.shape(),
        incoming = incoming.shape(),
        "merging rules"
    );

    match (existing, incoming) {
        (RuleNode::List(mut members), RuleNode::List(more)) => {
            members.extend(more);
            RuleNode::List(members)
        }
        (RuleNode::List(mut members), other) => {
            members.push(other);
            RuleNode::List(members)
        }
        (RuleNode::Sequential(mut steps), RuleNode::Sequential(more)) => {
            steps.extend(more);
            RuleNode::Sequential(steps)
        }
        (RuleNode::Sequential(steps), RuleNode::List(more)) => {
            let mut members = Vec::with_capacity(more.len() + 1);
            members.push(RuleNode::Sequential(steps));
            members.extend(more);
            RuleNode::List(members)
        }
        (RuleNode::Sequential(mut steps), single @ RuleNode::Single(_)) => {
            steps.push(single);
            RuleNode::Sequential(steps)
        }
        (single @ RuleNode::Single(_), RuleNode::List(more)) => {
            let mut members = Vec::with_capacity(more.len() + 1);
            members.push(single);
            members.extend(more);
            RuleNode::List(members)
        }
        (single @ RuleNode::Single(_), other) => RuleNode::List(vec![single, other]),
    }
}
