//! Community classification trees.
//!
//! A looking-glass backend ships a nested map that classifies communities
//! into human-readable reasons, e.g.
//!
//! ```json
//! {
//!     "reject_reasons": {
//!         "1234": {"1": "Prefix length out of bounds", "*": "Rejected: $1"}
//!     }
//! }
//! ```
//!
//! Each level of the map is keyed by the stringified community field at that
//! depth, with `"*"` acting as the wildcard fallback. Leaves are label
//! templates whose `$0`, `$1`, ... placeholders expand to the community's
//! positional field values.

use crate::models::MetaCommunity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key used at any tree level when no exact field value matches.
pub const WILDCARD: &str = "*";

/// A node of a community classification tree: either a label template leaf
/// or a branch keyed by stringified field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommunityTree {
    Leaf(String),
    Branch(HashMap<String, CommunityTree>),
}

impl CommunityTree {
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            CommunityTree::Leaf(template) => Some(template),
            CommunityTree::Branch(_) => None,
        }
    }

    /// Walks the tree one community field at a time, preferring the exact
    /// key over the `"*"` fallback at every level. The first wildcard taken
    /// is final; there is no backtracking over alternative wildcard paths.
    ///
    /// Returns `None` when the walk dead-ends, either because a field has
    /// neither an exact nor a wildcard key, or because the community is
    /// longer than the branch is deep. When the community is exhausted the
    /// remaining node is returned as-is; a `Branch` result means the tree is
    /// deeper than the community and is not a usable label.
    pub fn resolve(&self, community: &MetaCommunity) -> Option<&CommunityTree> {
        let mut node = self;
        for field in community.fields() {
            let branch = match node {
                CommunityTree::Branch(map) => map,
                CommunityTree::Leaf(_) => return None,
            };
            node = branch
                .get(&field.to_string())
                .or_else(|| branch.get(WILDCARD))?;
        }
        Some(node)
    }

    /// [`resolve`](CommunityTree::resolve) restricted to leaf results.
    pub fn resolve_label(&self, community: &MetaCommunity) -> Option<&str> {
        self.resolve(community)?.as_leaf()
    }
}

/// Resolves every community in `communities` against `tree`, keeping the
/// ones that reach a label leaf, in input order. A non-empty result doubles
/// as "this route carries at least one classified reason."
pub fn resolve_communities<'a>(
    tree: &'a CommunityTree,
    communities: &[MetaCommunity],
) -> Vec<(MetaCommunity, &'a str)> {
    communities
        .iter()
        .filter_map(|community| {
            tree.resolve_label(community)
                .map(|label| (community.clone(), label))
        })
        .collect()
}

/// Substitutes `$0`, `$1`, ... with the community's field values, in
/// increasing index order, replacing the first occurrence of each token.
///
/// Substitution is textual: in a template containing both `$1` and `$10`,
/// `$1` matches as a prefix of `$10`. Rendered labels in deployed
/// configurations depend on this, so it is pinned by test rather than fixed.
pub fn expand_vars(template: &str, community: &MetaCommunity) -> String {
    let mut label = template.to_string();
    for (i, field) in community.fields().iter().enumerate() {
        label = label.replacen(&format!("${}", i), &field.to_string(), 1);
    }
    label
}

/// Resolves a community to its fully expanded human-readable label.
pub fn readable_community(tree: &CommunityTree, community: &MetaCommunity) -> Option<String> {
    tree.resolve_label(community)
        .map(|template| expand_vars(template, community))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Community, ExtendedCommunity, LargeCommunity};

    fn reject_tree() -> CommunityTree {
        serde_json::from_str(
            r#"{
                "1234": {"1": "Filtered by $0:$1"},
                "*": {"*": "Unknown reason"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_exact() {
        let tree = reject_tree();
        let community = MetaCommunity::Plain(Community::new(1234, 1));
        assert_eq!(tree.resolve_label(&community), Some("Filtered by $0:$1"));
        assert_eq!(
            readable_community(&tree, &community),
            Some("Filtered by 1234:1".to_string())
        );
    }

    #[test]
    fn test_resolve_wildcard_fallback() {
        let tree = reject_tree();
        let community = MetaCommunity::Plain(Community::new(9999, 5));
        assert_eq!(
            readable_community(&tree, &community),
            Some("Unknown reason".to_string())
        );
    }

    #[test]
    fn test_short_community_resolves_to_branch_not_label() {
        // Tree expects two levels; a large community overruns it and a
        // plain community stops one level short on a three-level tree.
        let tree: CommunityTree =
            serde_json::from_str(r#"{"1234": {"1": {"2": "deep"}}}"#).unwrap();
        let community = MetaCommunity::Plain(Community::new(1234, 1));
        assert!(matches!(
            tree.resolve(&community),
            Some(CommunityTree::Branch(_))
        ));
        assert_eq!(tree.resolve_label(&community), None);
    }

    #[test]
    fn test_community_longer_than_tree() {
        let tree = reject_tree();
        let community = MetaCommunity::Large(LargeCommunity::new(1234, [1, 2]));
        assert_eq!(tree.resolve(&community), None);
    }

    #[test]
    fn test_dead_end_without_wildcard() {
        let tree: CommunityTree = serde_json::from_str(r#"{"1234": {"1": "x"}}"#).unwrap();
        let community = MetaCommunity::Plain(Community::new(1234, 2));
        assert_eq!(tree.resolve(&community), None);
    }

    #[test]
    fn test_wildcard_taken_is_final() {
        // 1234 -> "*" is taken over backtracking into the root "*" branch,
        // so the walk dead-ends even though "*"/"5" would have matched.
        let tree: CommunityTree = serde_json::from_str(
            r#"{
                "1234": {"*": {"9": "only nine"}},
                "*": {"5": "five"}
            }"#,
        )
        .unwrap();
        let community = MetaCommunity::Large(LargeCommunity::new(1234, [5, 5]));
        assert_eq!(tree.resolve(&community), None);
    }

    #[test]
    fn test_resolve_extended_community_by_tag() {
        let tree: CommunityTree =
            serde_json::from_str(r#"{"ro": {"*": {"*": "Route origin $1:$2"}}}"#).unwrap();
        let community = MetaCommunity::Extended(ExtendedCommunity::new("ro", [6695, 1000]));
        assert_eq!(
            readable_community(&tree, &community),
            Some("Route origin 6695:1000".to_string())
        );
    }

    #[test]
    fn test_resolve_communities_keeps_order_and_drops_failures() {
        let tree = reject_tree();
        let communities = vec![
            MetaCommunity::Plain(Community::new(1234, 1)),
            MetaCommunity::Large(LargeCommunity::new(1, [2, 3])),
            MetaCommunity::Plain(Community::new(9999, 5)),
        ];
        let resolved = resolve_communities(&tree, &communities);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].0, communities[0]);
        assert_eq!(resolved[0].1, "Filtered by $0:$1");
        assert_eq!(resolved[1].0, communities[2]);
        assert_eq!(resolved[1].1, "Unknown reason");
    }

    #[test]
    fn test_expand_vars_no_placeholders() {
        let community = MetaCommunity::Plain(Community::new(1, 2));
        assert_eq!(expand_vars("static label", &community), "static label");
    }

    #[test]
    fn test_expand_vars_first_occurrence_only() {
        let community = MetaCommunity::Plain(Community::new(7, 8));
        assert_eq!(expand_vars("$0 and $0", &community), "7 and $0");
    }

    #[test]
    fn test_expand_vars_prefix_collision_pinned() {
        // "$1" textually matches the prefix of "$10"; pinned, not fixed.
        let community = MetaCommunity::Large(LargeCommunity::new(1, [2, 3]));
        assert_eq!(expand_vars("code $10 then $1", &community), "code 20 then $1");
    }
}
