//! Review tree JSON for the board renderer.

use serde_json::Value as JsonValue;

use crate::tree::{GameTree, NodeId};

/// Convert a whole tree to nested JSON, rooted at the starting position.
pub fn tree_to_json(tree: &GameTree) -> JsonValue {
    node_to_json(tree, NodeId::ROOT)
}

fn node_to_json(tree: &GameTree, id: NodeId) -> JsonValue {
    let node = &tree[id];

    // Children keep tree order: index 0 is the mainline continuation
    let children: Vec<JsonValue> = node
        .children()
        .iter()
        .map(|&child| node_to_json(tree, child))
        .collect();

    let san = if node.is_root() { None } else { Some(node.san.as_str()) };

    serde_json::json!({
        "id": id.index(),
        "san": san,
        "fen": node.fen(),
        "nags": node.nags,
        "comment": node.comment,
        "origin": node.origin,
        "children": children,
    })
}
