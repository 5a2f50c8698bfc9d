//! Ply-by-ply alignment of a candidate line against a solution tree.
//!
//! The candidate mainline is walked alongside the solution mainline. At each
//! ply the candidate's position is compared with the principal continuation
//! of the solution line being followed, then with its alternates in listed
//! order. The first alternate that matches switches the walk onto that
//! alternate's own continuation. A ply with no match ends the walk: every
//! later ply is `Unmatched`.
//!
//! Only solution-origin nodes take part, so a merged review tree aligns the
//! same way as the solution it was built from.

use chess_core::{GameTree, NodeId, NodeOrigin};
use tracing::debug;

/// Outcome of comparing one candidate ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlyMatch {
    /// Candidate reached the principal continuation of the followed line.
    Mainline(NodeId),
    /// Candidate reached an alternate; `rank` is its 1-based position among
    /// the alternates.
    Alternate { node: NodeId, rank: usize },
    Unmatched,
}

impl PlyMatch {
    pub fn is_matched(&self) -> bool {
        !matches!(self, PlyMatch::Unmatched)
    }

    pub fn solution_node(&self) -> Option<NodeId> {
        match *self {
            PlyMatch::Mainline(node) | PlyMatch::Alternate { node, .. } => Some(node),
            PlyMatch::Unmatched => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedPly {
    /// Index into the solution mainline
    pub index: usize,
    /// The solution mainline node at `index`
    pub mainline_node: NodeId,
    /// Candidate node compared at this ply, if the candidate got this far
    pub candidate: Option<NodeId>,
    pub outcome: PlyMatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    pub start_index: usize,
    pub plies: Vec<AlignedPly>,
}

impl Alignment {
    /// Index of the first ply the candidate failed to match.
    pub fn divergence(&self) -> Option<usize> {
        self.plies
            .iter()
            .find(|ply| !ply.outcome.is_matched())
            .map(|ply| ply.index)
    }

    pub fn matched_count(&self) -> usize {
        self.plies.iter().filter(|ply| ply.outcome.is_matched()).count()
    }
}

/// Align `candidate`'s mainline against `solution`, starting at solution ply
/// `start_index`. The candidate's first move is compared with that ply.
pub fn align(solution: &GameTree, start_index: usize, candidate: &GameTree) -> Alignment {
    let mainline = solution.mainline_of(NodeOrigin::Solution);
    let mut plies = Vec::with_capacity(mainline.len().saturating_sub(start_index));

    let Some(mut line_parent) = solution.mainline_anchor(start_index) else {
        return Alignment { start_index, plies };
    };
    let mut candidate_parent = Some(NodeId::ROOT);

    for (index, &mainline_node) in mainline.iter().enumerate().skip(start_index) {
        let candidate_node = candidate_parent
            .and_then(|parent| candidate.children(parent).first().copied());

        let outcome = match candidate_node {
            Some(node) => match_ply(solution, line_parent, &candidate[node].key),
            None => PlyMatch::Unmatched,
        };

        match outcome.solution_node() {
            Some(next) => {
                line_parent = next;
                candidate_parent = candidate_node;
            }
            None => {
                if candidate_node.is_some() {
                    debug!(index, "Candidate left the solution tree");
                }
                candidate_parent = None;
            }
        }

        plies.push(AlignedPly {
            index,
            mainline_node,
            candidate: candidate_node,
            outcome,
        });
    }

    Alignment { start_index, plies }
}

/// Compare a candidate position against the children of `line_parent`:
/// principal continuation first, then alternates in listed order.
fn match_ply(solution: &GameTree, line_parent: NodeId, key: &str) -> PlyMatch {
    let children: Vec<NodeId> = solution
        .children(line_parent)
        .iter()
        .copied()
        .filter(|&child| solution[child].origin == NodeOrigin::Solution)
        .collect();
    let Some((&principal, alternates)) = children.split_first() else {
        return PlyMatch::Unmatched;
    };

    if solution[principal].key == key {
        return PlyMatch::Mainline(principal);
    }

    alternates
        .iter()
        .position(|&alt| solution[alt].key == key)
        .map(|i| {
            debug!(san = %solution[alternates[i]].san, rank = i + 1, "Matched alternate");
            PlyMatch::Alternate {
                node: alternates[i],
                rank: i + 1,
            }
        })
        .unwrap_or(PlyMatch::Unmatched)
}
