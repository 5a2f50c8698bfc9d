//! Chess move trees and the PGN collaborator that builds them.
//!
//! `tree` holds the arena data model, `pgn` converts between PGN text and
//! trees, and `review` renders a tree as nested JSON for a board renderer.

pub mod error;
pub mod pgn;
pub mod review;
pub mod tree;

pub use error::TreeError;
pub use tree::{GameTree, MoveNode, NodeId, NodeOrigin};
