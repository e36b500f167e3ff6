//! Turn restrictions keyed by the `(from_node, via_node)` approach.
//!
//! Only two rule kinds matter for the intersection model: a ban forbids one
//! specific `(from, via, to)` turn, an only-turn mandates a single successor
//! for the whole approach.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::graph::NodeId;

#[derive(Debug, Default, Clone)]
pub struct RestrictionMap {
    only: FxHashMap<(NodeId, NodeId), NodeId>,
    banned: FxHashSet<(NodeId, NodeId, NodeId)>,
}

impl RestrictionMap {
    pub fn add_only(&mut self, from: NodeId, via: NodeId, to: NodeId) {
        self.only.insert((from, via), to);
    }

    pub fn add_ban(&mut self, from: NodeId, via: NodeId, to: NodeId) {
        self.banned.insert((from, via, to));
    }

    /// Mandated successor node for the approach, if an only-turn exists.
    /// Callers must verify the target is actually reachable; a dangling
    /// only-turn is ignored rather than blocking the intersection.
    pub fn only_turn_target(&self, from: NodeId, via: NodeId) -> Option<NodeId> {
        self.only.get(&(from, via)).copied()
    }

    pub fn is_restricted(&self, from: NodeId, via: NodeId, to: NodeId) -> bool {
        self.banned.contains(&(from, via, to))
    }

    pub fn is_empty(&self) -> bool {
        self.only.is_empty() && self.banned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bans_apply_to_one_turn_only() {
        let mut map = RestrictionMap::default();
        map.add_ban(1, 2, 3);
        assert!(map.is_restricted(1, 2, 3));
        assert!(!map.is_restricted(1, 2, 4));
        assert!(!map.is_restricted(3, 2, 1));
    }

    #[test]
    fn only_turns_are_keyed_by_approach() {
        let mut map = RestrictionMap::default();
        map.add_only(1, 2, 3);
        assert_eq!(map.only_turn_target(1, 2), Some(3));
        assert_eq!(map.only_turn_target(2, 1), None);
    }

    #[test]
    fn empty_map_reports_empty() {
        let map = RestrictionMap::default();
        assert!(map.is_empty());
    }
}
