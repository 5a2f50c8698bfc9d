//! Arena-backed move tree for annotated games and puzzle solutions.
//!
//! Nodes live in a flat `Vec` and refer to each other by `NodeId`. Every node
//! owns an ordered child list: `children[0]` is the mainline continuation and
//! the rest are variations branching from the same position.

use serde::Serialize;
use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use std::ops::Index;

use crate::error::TreeError;

/// Typed index into a `GameTree` arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    /// The sentinel node holding the starting position.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a node came from. Merged review trees mix both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeOrigin {
    Solution,
    Candidate,
}

/// One ply of a move tree (or the root sentinel, which has an empty SAN).
#[derive(Debug, Clone)]
pub struct MoveNode {
    /// SAN as rendered by shakmaty, without check suffix.
    pub san: String,
    /// Canonical position key: FEN without the move counters.
    pub key: String,
    pub nags: Vec<u8>,
    pub comment: Option<String>,
    pub origin: NodeOrigin,
    position: Chess,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MoveNode {
    fn new(san: String, position: Chess, parent: Option<NodeId>, origin: NodeOrigin) -> Self {
        Self {
            san,
            key: position_key(&position),
            nags: Vec::new(),
            comment: None,
            origin,
            position,
            parent,
            children: Vec::new(),
        }
    }

    /// Board state AFTER this move (the starting position for the root).
    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn has_nag(&self, nag: u8) -> bool {
        self.nags.contains(&nag)
    }

    /// Full FEN of the position after this move.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }
}

/// A game or puzzle line with all of its variations.
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<MoveNode>,
    tags: Vec<(String, String)>,
    origin: NodeOrigin,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl Index<NodeId> for GameTree {
    type Output = MoveNode;

    fn index(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }
}

impl GameTree {
    /// Create an empty tree starting from `start`.
    pub fn new(start: Chess) -> Self {
        Self {
            nodes: vec![MoveNode::new(String::new(), start, None, NodeOrigin::Solution)],
            tags: Vec::new(),
            origin: NodeOrigin::Solution,
        }
    }

    /// Create an empty tree from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, TreeError> {
        let parsed: Fen = fen.trim().parse().map_err(|e| TreeError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e}"),
        })?;
        let position: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| TreeError::InvalidFen {
                    fen: fen.to_string(),
                    reason: format!("{e}"),
                })?;
        Ok(Self::new(position))
    }

    /// Relabel every node (and future pushes) with `origin`.
    pub fn into_origin(mut self, origin: NodeOrigin) -> Self {
        for node in &mut self.nodes {
            node.origin = origin;
        }
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> NodeOrigin {
        self.origin
    }

    pub fn root(&self) -> &MoveNode {
        &self.nodes[0]
    }

    pub fn start_position(&self) -> &Chess {
        self.root().position()
    }

    /// Number of plies in the tree, variations included.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True when the tree holds no moves at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self[id]
    }

    /// Mutable access for annotations. Structure (parent, children, position)
    /// can only change through `push_move`.
    pub fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self[id].children
    }

    /// Iterate every node id in insertion order, root first.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Append `san` as a new child of `parent`, using the tree's origin.
    pub fn push_move(&mut self, parent: NodeId, san: &str) -> Result<NodeId, TreeError> {
        self.push_move_as(parent, san, self.origin)
    }

    /// Append `san` as a new child of `parent` with an explicit origin.
    pub fn push_move_as(
        &mut self,
        parent: NodeId,
        san: &str,
        origin: NodeOrigin,
    ) -> Result<NodeId, TreeError> {
        let parsed: San = san
            .trim()
            .parse()
            .map_err(|_| TreeError::InvalidSan(san.to_string()))?;
        self.push_san(parent, &parsed, origin)
    }

    /// Append an already-parsed SAN. The move must be legal in the parent's
    /// position; the child's position is derived by playing it.
    pub fn push_san(
        &mut self,
        parent: NodeId,
        san: &San,
        origin: NodeOrigin,
    ) -> Result<NodeId, TreeError> {
        let before = &self[parent].position;
        let mv = san.to_move(before).map_err(|_| TreeError::IllegalMove {
            san: san.to_string(),
            fen: self[parent].fen(),
        })?;

        let rendered = San::from_move(before, mv).to_string();
        let mut after = before.clone();
        after.play_unchecked(mv);

        let id = NodeId(self.nodes.len());
        self.nodes
            .push(MoveNode::new(rendered, after, Some(parent), origin));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Convenience for building lines in code: push each SAN after the last.
    pub fn push_line(&mut self, parent: NodeId, sans: &[&str]) -> Result<NodeId, TreeError> {
        let mut current = parent;
        for san in sans {
            current = self.push_move(current, san)?;
        }
        Ok(current)
    }

    /// Child of `parent` reaching the position `key`, if any.
    pub fn find_child(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self[parent]
            .children
            .iter()
            .copied()
            .find(|&child| self[child].key == key)
    }

    /// Mainline continuation from `from` (exclusive), following `children[0]`.
    pub fn line_from(&self, from: NodeId) -> Vec<NodeId> {
        let mut line = Vec::new();
        let mut current = from;
        while let Some(&next) = self[current].children.first() {
            line.push(next);
            current = next;
        }
        line
    }

    /// The top-level mainline, ply 0 first.
    pub fn mainline(&self) -> Vec<NodeId> {
        self.line_from(NodeId::ROOT)
    }

    /// Mainline prefix whose nodes all carry `origin`. On a merged review
    /// tree, `mainline_of(NodeOrigin::Solution)` stops where the answer ran
    /// past the end of the solution.
    pub fn mainline_of(&self, origin: NodeOrigin) -> Vec<NodeId> {
        self.mainline()
            .into_iter()
            .take_while(|&id| self[id].origin == origin)
            .collect()
    }

    /// Alternates to mainline ply `index`: the variations sharing its parent.
    pub fn variations_at(&self, index: usize) -> &[NodeId] {
        let parent = if index == 0 {
            Some(NodeId::ROOT)
        } else {
            self.mainline().get(index - 1).copied()
        };
        match parent {
            Some(p) if !self[p].children.is_empty() => &self[p].children[1..],
            _ => &[],
        }
    }

    /// Position key after mainline ply `index`.
    pub fn position_at(&self, index: usize) -> Option<&str> {
        self.mainline()
            .get(index)
            .map(|&id| self[id].key.as_str())
    }

    /// Parent of mainline ply `index`: the root for ply 0, ply `index - 1`
    /// otherwise. `index == len` is allowed and names the last mainline node.
    pub fn mainline_anchor(&self, index: usize) -> Option<NodeId> {
        if index == 0 {
            return Some(NodeId::ROOT);
        }
        self.mainline().get(index - 1).copied()
    }

    /// Side to move in the starting position.
    pub fn start_turn(&self) -> Color {
        self.start_position().turn()
    }

    pub fn tags(&self) -> &[(String, String)] {
        &self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_tag(&mut self, name: &str, value: &str) {
        match self.tags.iter_mut().find(|(k, _)| k == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.tags.push((name.to_string(), value.to_string())),
        }
    }
}

/// Normalized FEN (position + side + castling + ep, no move counters).
pub fn position_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_line_builds_mainline() {
        let mut tree = GameTree::default();
        tree.push_line(NodeId::ROOT, &["e4", "e5", "Nf3"]).unwrap();

        let sans: Vec<&str> = tree
            .mainline()
            .iter()
            .map(|&id| tree[id].san.as_str())
            .collect();
        assert_eq!(sans, vec!["e4", "e5", "Nf3"]);
        assert_eq!(tree.len(), 3);
        assert!(!tree.is_empty());
    }

    #[test]
    fn test_illegal_move_is_rejected() {
        let mut tree = GameTree::default();
        let err = tree.push_move(NodeId::ROOT, "e5").unwrap_err();
        assert!(matches!(err, TreeError::IllegalMove { .. }));
        assert!(tree.is_empty());

        let err = tree.push_move(NodeId::ROOT, "zz9").unwrap_err();
        assert!(matches!(err, TreeError::InvalidSan(_)));
    }

    #[test]
    fn test_variations_at_lists_alternates() {
        let mut tree = GameTree::default();
        let e4 = tree.push_move(NodeId::ROOT, "e4").unwrap();
        tree.push_move(NodeId::ROOT, "d4").unwrap();
        tree.push_move(e4, "e5").unwrap();
        tree.push_move(e4, "c5").unwrap();

        let first: Vec<&str> = tree.variations_at(0).iter().map(|&id| tree[id].san.as_str()).collect();
        assert_eq!(first, vec!["d4"]);
        let second: Vec<&str> = tree.variations_at(1).iter().map(|&id| tree[id].san.as_str()).collect();
        assert_eq!(second, vec!["c5"]);
        assert!(tree.variations_at(5).is_empty());
    }

    #[test]
    fn test_position_at_follows_mainline() {
        let mut tree = GameTree::default();
        let e4 = tree.push_move(NodeId::ROOT, "e4").unwrap();
        let d4 = tree.push_move(NodeId::ROOT, "d4").unwrap();
        let e5 = tree.push_move(e4, "e5").unwrap();

        assert_eq!(tree.position_at(0), Some(tree[e4].key.as_str()));
        assert_eq!(tree.position_at(1), Some(tree[e5].key.as_str()));
        assert_ne!(tree.position_at(0), Some(tree[d4].key.as_str()));
        assert_eq!(tree.position_at(2), None);
    }

    #[test]
    fn test_mainline_of_stops_at_other_origin() {
        let mut tree = GameTree::default();
        let e5 = tree.push_line(NodeId::ROOT, &["e4", "e5"]).unwrap();
        tree.push_move_as(e5, "Nf3", NodeOrigin::Candidate).unwrap();

        assert_eq!(tree.mainline().len(), 3);
        assert_eq!(tree.mainline_of(NodeOrigin::Solution).len(), 2);
    }

    #[test]
    fn test_transposition_keys_match() {
        let mut a = GameTree::default();
        let end_a = a.push_line(NodeId::ROOT, &["Nf3", "Nf6", "Nc3"]).unwrap();
        let mut b = GameTree::default();
        let end_b = b.push_line(NodeId::ROOT, &["Nc3", "Nf6", "Nf3"]).unwrap();

        assert_eq!(a[end_a].key, b[end_b].key);
        assert_ne!(a[end_a].san, b[end_b].san);
    }

    #[test]
    fn test_from_fen_and_parent_links() {
        let mut tree = GameTree::from_fen("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        let mate = tree.push_move(NodeId::ROOT, "Ra8").unwrap();
        assert_eq!(tree.parent(mate), Some(NodeId::ROOT));
        assert_eq!(tree.start_turn(), Color::White);
        assert!(tree[mate].position().is_checkmate());

        assert!(GameTree::from_fen("not a fen").is_err());
    }

    #[test]
    fn test_find_child_by_key() {
        let mut tree = GameTree::default();
        let e4 = tree.push_move(NodeId::ROOT, "e4").unwrap();
        let key = tree[e4].key.clone();
        assert_eq!(tree.find_child(NodeId::ROOT, &key), Some(e4));
        assert_eq!(tree.find_child(e4, &key), None);
    }
}
