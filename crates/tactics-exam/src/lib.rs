//! Tactics exam scoring engine.
//!
//! Compares a user's answer tree against a solution tree, awards partial
//! credit per ply, and merges the answer into a copy of the solution so both
//! lines can be reviewed on one board. Everything here is synchronous and
//! works on in-memory `chess_core::GameTree` values.

pub mod align;
pub mod config;
pub mod error;
pub mod exam;
pub mod merge;
pub mod score;

pub use config::ScoringConfig;
pub use error::ExamError;
pub use exam::{parse_exam, score_exam, Problem, Scores, Tally};
pub use merge::{merge_candidate_into_solution, review_tree, MergeSummary};
pub use score::{compute_max_score, score_variation, ProblemScore, ScoreEntry};
