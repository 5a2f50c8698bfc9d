//! Integration tests: scoring properties of the tactics exam engine.
//!
//! Solutions and answers are parsed from PGN the same way exam files are.

mod common;

use common::{candidate, mainline_prefix, solution};
use tactics_exam::{compute_max_score, score_exam, score_variation, Problem, ScoringConfig, Tally};

const SOLUTIONS: &[&str] = &[
    "1. e4 e5 2. Nf3 *",
    "1. e4 e5 (1... c5 2. Nf3 d6) 2. Nf3 Nc6 3. Bb5 a6 *",
    r#"[FEN "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1"]

1. Ra8# *"#,
    r#"[FEN "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"]

1. Qxf7# $3 *"#,
];

#[test]
fn test_empty_candidate_scores_zero_of_max() {
    let config = ScoringConfig::default();
    for pgn in SOLUTIONS {
        let tree = solution(pgn);
        let blank = mainline_prefix(&tree, 0);
        let score = score_variation(&tree, 0, &blank, &config);

        assert_eq!(score.user, 0.0, "solution {pgn}");
        assert_eq!(score.solution, compute_max_score(&tree, &config), "solution {pgn}");
    }
}

#[test]
fn test_perfect_match_earns_full_credit() {
    let config = ScoringConfig::default();
    for pgn in SOLUTIONS {
        let tree = solution(pgn);
        let perfect = mainline_prefix(&tree, tree.mainline().len());
        let score = score_variation(&tree, 0, &perfect, &config);

        assert_eq!(score.user, score.solution, "solution {pgn}");
        assert!(score.entries.iter().all(|e| e.matched));
    }
}

#[test]
fn test_score_is_monotonic_in_correct_moves() {
    let config = ScoringConfig::default();
    for pgn in SOLUTIONS {
        let tree = solution(pgn);
        let mut previous = 0.0;
        for k in 0..=tree.mainline().len() {
            let score = score_variation(&tree, 0, &mainline_prefix(&tree, k), &config);
            assert!(score.user >= previous, "solution {pgn}, prefix {k}");
            assert!(score.user <= score.solution);
            previous = score.user;
        }
    }
}

#[test]
fn test_alternate_earns_configured_credit() {
    let config = ScoringConfig::default();
    let tree = solution(SOLUTIONS[1]);

    let score = score_variation(&tree, 0, &candidate("1. e4 c5 2. Nf3 d6"), &config);
    let credit: Vec<f64> = score.entries.iter().map(|e| e.awarded).collect();

    assert_eq!(&credit[..4], &[1.0, config.alternate_variation_value, 1.0, 1.0]);
    assert!(score.entries[1].matched);
    assert!(!score.entries[4].matched);
}

#[test]
fn test_concrete_scenario() {
    let config = ScoringConfig::default();
    let tree = solution(SOLUTIONS[0]);

    let cases = [
        ("1. e4 e5 2. Nc3", 2.0),
        ("1. d4", 0.0),
        ("1. e4 e5 2. Nf3", 3.0),
    ];
    for (answer, expected) in cases {
        let score = score_variation(&tree, 0, &candidate(answer), &config);
        assert_eq!(score.user, expected, "answer {answer}");
        assert_eq!(score.solution, 3.0);
    }
}

#[test]
fn test_bonus_glyph_raises_max() {
    let config = ScoringConfig::default();
    let tree = solution(SOLUTIONS[3]);
    assert_eq!(compute_max_score(&tree, &config), config.bonus_glyph_value);
}

#[test]
fn test_exam_totals_match_problem_sums() {
    let config = ScoringConfig::default();
    let problems: Vec<Problem> = SOLUTIONS.iter().map(|pgn| Problem::new(solution(pgn))).collect();
    let answers = vec![
        candidate("1. e4 e5 2. Nc3"),
        candidate("1. e4 c5 2. Nf3"),
        mainline_prefix(&problems[2].solution, 1),
    ];

    let scores = score_exam(&problems, &answers, 0, &config);
    let user: f64 = scores.problems.iter().map(|t| t.user).sum();
    let max: f64 = scores.problems.iter().map(|t| t.solution).sum();

    assert_eq!(scores.problems.len(), 4);
    assert_eq!(scores.problems[2], Tally { user: 1.0, solution: 1.0 });
    assert_eq!(scores.problems[3].user, 0.0);
    assert_eq!(scores.total, Tally { user, solution: max });
}
