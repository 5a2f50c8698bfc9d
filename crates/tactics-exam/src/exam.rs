//! Multi-problem exams and their aggregate `Scores`.

use chess_core::pgn::parse_games;
use chess_core::GameTree;
use serde::Serialize;
use shakmaty::Color;
use tracing::info;

use crate::config::ScoringConfig;
use crate::error::ExamError;
use crate::score::{round_for_display, score_variation};

/// One exam problem: a solution tree and the side the solver plays.
#[derive(Debug, Clone)]
pub struct Problem {
    pub solution: GameTree,
    pub orientation: Color,
}

impl Problem {
    /// Orientation comes from an `Orientation` tag, else the side to move.
    pub fn new(solution: GameTree) -> Self {
        let orientation = match solution.tag("Orientation").map(str::to_ascii_lowercase) {
            Some(side) if side == "white" => Color::White,
            Some(side) if side == "black" => Color::Black,
            _ => solution.start_turn(),
        };
        Self {
            solution,
            orientation,
        }
    }

    /// An empty candidate from this problem's starting position.
    pub fn blank_answer(&self) -> GameTree {
        GameTree::new(self.solution.start_position().clone())
    }
}

/// Parse every game of an exam PGN as a problem.
pub fn parse_exam(pgn: &str) -> Result<Vec<Problem>, ExamError> {
    Ok(parse_games(pgn)?.into_iter().map(Problem::new).collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    pub user: f64,
    pub solution: f64,
}

impl Tally {
    pub fn rounded(&self) -> Tally {
        Tally {
            user: round_for_display(self.user),
            solution: round_for_display(self.solution),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scores {
    pub total: Tally,
    pub problems: Vec<Tally>,
}

impl Scores {
    /// Percentage of available points earned, 0 when nothing was available.
    pub fn percentage(&self) -> f64 {
        if self.total.solution > 0.0 {
            self.total.user / self.total.solution * 100.0
        } else {
            0.0
        }
    }
}

/// Score each answer against the problem at the same index, comparing from
/// solution ply `start_index`. A missing answer scores as a blank one.
pub fn score_exam(
    problems: &[Problem],
    answers: &[GameTree],
    start_index: usize,
    config: &ScoringConfig,
) -> Scores {
    let mut scores = Scores::default();

    for (i, problem) in problems.iter().enumerate() {
        let blank;
        let answer = match answers.get(i) {
            Some(answer) => answer,
            None => {
                blank = problem.blank_answer();
                &blank
            }
        };

        let result = score_variation(&problem.solution, start_index, answer, config);
        scores.total.user += result.user;
        scores.total.solution += result.solution;
        scores.problems.push(Tally {
            user: result.user,
            solution: result.solution,
        });
    }

    let total = scores.total.rounded();
    info!(
        problems = problems.len(),
        user = total.user,
        solution = total.solution,
        "Exam scored"
    );
    scores
}
