//! Splice a candidate's moves into a solution tree for review.
//!
//! The merge is a union keyed on position: candidate moves that reach a
//! position already present under the same solution node are followed, not
//! copied, and everything else is grafted as a trailing variation. Existing
//! solution nodes are never edited or removed.

use chess_core::{GameTree, NodeId, NodeOrigin};
use tracing::{debug, info};

use crate::error::ExamError;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    /// Candidate nodes copied into the solution tree
    pub grafted_nodes: usize,
    /// Candidate nodes that landed on an existing solution node
    pub reused_nodes: usize,
}

/// Merge the whole of `candidate` (mainline and explored variations) into
/// `solution`, anchored at the parent of solution mainline ply `start_index`.
///
/// On error `solution` is left untouched.
pub fn merge_candidate_into_solution(
    candidate: &GameTree,
    start_index: usize,
    solution: &mut GameTree,
) -> Result<MergeSummary, ExamError> {
    let anchor = solution
        .mainline_anchor(start_index)
        .ok_or_else(|| ExamError::StartOutOfRange {
            index: start_index,
            len: solution.mainline().len(),
        })?;

    let mut summary = MergeSummary::default();
    if candidate.is_empty() {
        return Ok(summary);
    }

    if candidate.root().key != solution[anchor].key {
        return Err(ExamError::StartMismatch {
            candidate: candidate.root().key.clone(),
            anchor: solution[anchor].key.clone(),
        });
    }

    let mut working = solution.clone();
    merge_children(candidate, NodeId::ROOT, &mut working, anchor, &mut summary)?;
    *solution = working;

    info!(
        grafted = summary.grafted_nodes,
        reused = summary.reused_nodes,
        "Merged candidate into solution"
    );
    Ok(summary)
}

/// Merge into a copy of `solution`, leaving the template as it was.
pub fn review_tree(
    solution: &GameTree,
    candidate: &GameTree,
    start_index: usize,
) -> Result<GameTree, ExamError> {
    let mut review = solution.clone();
    merge_candidate_into_solution(candidate, start_index, &mut review)?;
    Ok(review)
}

fn merge_children(
    candidate: &GameTree,
    candidate_parent: NodeId,
    solution: &mut GameTree,
    solution_parent: NodeId,
    summary: &mut MergeSummary,
) -> Result<(), ExamError> {
    for &child in candidate.children(candidate_parent) {
        match solution.find_child(solution_parent, &candidate[child].key) {
            Some(existing) => {
                summary.reused_nodes += 1;
                merge_children(candidate, child, solution, existing, summary)?;
            }
            None => {
                debug!(san = %candidate[child].san, "Grafting candidate branch");
                graft(candidate, child, solution, solution_parent, summary)?;
            }
        }
    }
    Ok(())
}

/// Copy `node` and its whole subtree under `solution_parent`, replaying each
/// SAN so positions stay consistent with their parents.
fn graft(
    candidate: &GameTree,
    node: NodeId,
    solution: &mut GameTree,
    solution_parent: NodeId,
    summary: &mut MergeSummary,
) -> Result<(), ExamError> {
    let source = &candidate[node];
    let id = solution.push_move_as(solution_parent, &source.san, NodeOrigin::Candidate)?;
    let copy = solution.node_mut(id);
    copy.nags = source.nags.clone();
    copy.comment = source.comment.clone();
    summary.grafted_nodes += 1;

    for &child in candidate.children(node) {
        graft(candidate, child, solution, id, summary)?;
    }
    Ok(())
}
