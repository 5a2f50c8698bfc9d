//! Partial-credit scoring of a candidate line against a solution tree.
//!
//! Every solution mainline ply has a maximum. A candidate earns a ply's
//! credit by reaching it (or an accepted alternate) through alignment. Totals
//! are plain sums; rounding happens only for display.

use chess_core::pgn::comment_command;
use chess_core::{GameTree, NodeId, NodeOrigin};
use serde::Serialize;

use crate::align::{align, PlyMatch};
use crate::config::ScoringConfig;

/// Credit record for one solution mainline ply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub move_index: usize,
    pub awarded: f64,
    pub max: f64,
    pub matched: bool,
}

/// Score of one candidate against one solution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProblemScore {
    pub entries: Vec<ScoreEntry>,
    pub user: f64,
    pub solution: f64,
}

impl ProblemScore {
    fn from_entries(entries: Vec<ScoreEntry>) -> Self {
        let user = entries.iter().map(|e| e.awarded).sum();
        let solution = entries.iter().map(|e| e.max).sum();
        Self {
            entries,
            user,
            solution,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.user >= self.solution
    }
}

/// Value of a single ply.
///
/// An explicit `[%score N]` comment command wins, then the bonus glyph, then
/// the alternate rate for the first move of an alternate, then the default.
pub fn ply_value(tree: &GameTree, id: NodeId, is_alternate: bool, config: &ScoringConfig) -> f64 {
    let node = &tree[id];

    if let Some(explicit) = node
        .comment
        .as_deref()
        .and_then(|c| comment_command(c, "score"))
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
    {
        return explicit;
    }

    if node.has_nag(config.bonus_nag) {
        config.bonus_glyph_value
    } else if is_alternate {
        config.alternate_variation_value
    } else {
        config.default_move_value
    }
}

/// Maximum achievable score: the sum of mainline ply values. Alternates never
/// raise the maximum, and neither do candidate moves merged past the end.
pub fn compute_max_score(solution: &GameTree, config: &ScoringConfig) -> f64 {
    solution
        .mainline_of(NodeOrigin::Solution)
        .into_iter()
        .map(|id| ply_value(solution, id, false, config))
        .sum()
}

/// Per-ply credit for `candidate` from solution ply `start_index` onward.
pub fn score_entries(
    solution: &GameTree,
    start_index: usize,
    candidate: &GameTree,
    config: &ScoringConfig,
) -> Vec<ScoreEntry> {
    align(solution, start_index, candidate)
        .plies
        .into_iter()
        .map(|ply| {
            let max = ply_value(solution, ply.mainline_node, false, config);
            let earned = match ply.outcome {
                PlyMatch::Mainline(node) => ply_value(solution, node, false, config),
                PlyMatch::Alternate { node, .. } => ply_value(solution, node, true, config),
                PlyMatch::Unmatched => 0.0,
            };
            ScoreEntry {
                move_index: ply.index,
                awarded: earned.min(max),
                max,
                matched: ply.outcome.is_matched(),
            }
        })
        .collect()
}

/// Score `candidate` against `solution` from ply `start_index`.
pub fn score_variation(
    solution: &GameTree,
    start_index: usize,
    candidate: &GameTree,
    config: &ScoringConfig,
) -> ProblemScore {
    ProblemScore::from_entries(score_entries(solution, start_index, candidate, config))
}

/// Round to one decimal place for display.
pub fn round_for_display(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(sans: &[&str]) -> GameTree {
        let mut tree = GameTree::default();
        tree.push_line(NodeId::ROOT, sans).unwrap();
        tree
    }

    #[test]
    fn test_scenario_scores() {
        let config = ScoringConfig::default();
        let solution = line(&["e4", "e5", "Nf3"]);
        assert_eq!(compute_max_score(&solution, &config), 3.0);

        let partial = score_variation(&solution, 0, &line(&["e4", "e5", "Nc3"]), &config);
        assert_eq!((partial.user, partial.solution), (2.0, 3.0));

        let wrong = score_variation(&solution, 0, &line(&["d4"]), &config);
        assert_eq!((wrong.user, wrong.solution), (0.0, 3.0));

        let full = score_variation(&solution, 0, &line(&["e4", "e5", "Nf3"]), &config);
        assert_eq!((full.user, full.solution), (3.0, 3.0));
        assert!(full.is_perfect());
    }

    #[test]
    fn test_bonus_and_informational_values() {
        let config = ScoringConfig::default();
        let mut solution = GameTree::default();
        let e4 = solution.push_move(NodeId::ROOT, "e4").unwrap();
        let e5 = solution.push_move(e4, "e5").unwrap();
        let nf3 = solution.push_move(e5, "Nf3").unwrap();
        solution.node_mut(e5).comment = Some("Forced [%score 0]".to_string());
        solution.node_mut(nf3).nags.push(config.bonus_nag);

        assert_eq!(ply_value(&solution, e4, false, &config), 1.0);
        assert_eq!(ply_value(&solution, e5, false, &config), 0.0);
        assert_eq!(ply_value(&solution, nf3, false, &config), 2.0);
        assert_eq!(compute_max_score(&solution, &config), 3.0);

        let entries = score_entries(&solution, 0, &line(&["e4", "e5"]), &config);
        assert_eq!(entries[1].awarded, 0.0);
        assert!(entries[1].matched);
        assert!(!entries[2].matched);
    }

    #[test]
    fn test_alternate_credit_is_capped_by_mainline_max() {
        let config = ScoringConfig {
            alternate_variation_value: 5.0,
            ..ScoringConfig::default()
        };
        let mut solution = GameTree::default();
        solution.push_line(NodeId::ROOT, &["e4", "e5"]).unwrap();
        solution.push_move(NodeId::ROOT, "d4").unwrap();

        let score = score_variation(&solution, 0, &line(&["d4"]), &config);
        assert_eq!(score.entries[0].awarded, 1.0);
        assert!(score.user <= score.solution);
    }

    #[test]
    fn test_repeated_alternate_uses_first_listing() {
        let config = ScoringConfig::default();
        let mut solution = GameTree::default();
        solution.push_move(NodeId::ROOT, "e4").unwrap();
        let first = solution.push_move(NodeId::ROOT, "d4").unwrap();
        let second = solution.push_move(NodeId::ROOT, "d4").unwrap();
        solution.node_mut(first).comment = Some("[%score 0.25]".to_string());
        solution.node_mut(second).comment = Some("[%score 0.75]".to_string());

        let score = score_variation(&solution, 0, &line(&["d4"]), &config);
        assert_eq!(score.entries[0].awarded, 0.25);
        assert_eq!((score.user, score.solution), (0.25, 1.0));
    }

    #[test]
    fn test_empty_solution_scores_zero() {
        let config = ScoringConfig::default();
        let score = score_variation(&GameTree::default(), 0, &line(&["e4"]), &config);
        assert_eq!((score.user, score.solution), (0.0, 0.0));
        assert!(score.entries.is_empty());
    }

    #[test]
    fn test_round_for_display() {
        assert_eq!(round_for_display(2.0 / 3.0), 0.7);
        assert_eq!(round_for_display(1.25), 1.3);
        assert_eq!(round_for_display(0.0), 0.0);
    }
}
