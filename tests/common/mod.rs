use chess_core::pgn::{parse_tree, parse_tree_as};
use chess_core::{GameTree, NodeId, NodeOrigin};

/// Build a solution tree from PGN movetext.
pub fn solution(pgn: &str) -> GameTree {
    parse_tree(pgn).unwrap_or_else(|e| panic!("invalid solution PGN {pgn:?}: {e}"))
}

/// Build a candidate tree from PGN movetext.
pub fn candidate(pgn: &str) -> GameTree {
    parse_tree_as(pgn, NodeOrigin::Candidate)
        .unwrap_or_else(|e| panic!("invalid candidate PGN {pgn:?}: {e}"))
}

/// Candidate playing the first `k` solution mainline moves.
#[allow(dead_code)]
pub fn mainline_prefix(tree: &GameTree, k: usize) -> GameTree {
    let mut prefix = GameTree::new(tree.start_position().clone()).into_origin(NodeOrigin::Candidate);
    let mut parent = NodeId::ROOT;
    for id in tree.mainline().into_iter().take(k) {
        parent = prefix
            .push_move(parent, &tree[id].san)
            .unwrap_or_else(|e| panic!("replaying mainline failed: {e}"));
    }
    prefix
}

/// SANs of a node list.
#[allow(dead_code)]
pub fn sans(tree: &GameTree, ids: &[NodeId]) -> Vec<String> {
    ids.iter().map(|&id| tree[id].san.clone()).collect()
}
