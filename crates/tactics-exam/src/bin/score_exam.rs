//! Score tactics exam answers against an exam's solutions.
//!
//! Usage: cargo run --bin score-exam -- <exam.pgn> <answers.pgn | answers_dir> [--start N] [--review N] [--json]
//!
//! The exam file holds one game per problem. Each answers file holds one game
//! per problem in the same order; a directory is scored file by file.
//! `--start N` compares answers from solution ply N onward (answers then start
//! from the position before that ply, given with a FEN tag).
//! `--review N` prints problem N's solution with the answer merged in, as PGN
//! (or as JSON with `--json`).

use chess_core::pgn::{read_games, write_pgn};
use chess_core::review::tree_to_json;
use chess_core::{GameTree, NodeOrigin};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tactics_exam::{parse_exam, review_tree, score_exam, Problem, ScoringConfig};
use tracing::{info, warn};

const USAGE: &str = "<exam.pgn> <answers.pgn | answers_dir> [--start N] [--review N] [--json]";

#[derive(Debug, PartialEq)]
struct Options {
    exam: PathBuf,
    answers: PathBuf,
    start_index: usize,
    review: Option<usize>,
    as_json: bool,
}

/// Parse everything after the program name. A missing or malformed flag
/// value is an error rather than a silent default.
fn parse_args(args: &[String]) -> Result<Options, String> {
    let [exam, answers, rest @ ..] = args else {
        return Err("expected an exam file and an answers path".to_string());
    };

    let mut options = Options {
        exam: PathBuf::from(exam),
        answers: PathBuf::from(answers),
        start_index: 0,
        review: None,
        as_json: false,
    };

    let mut flags = rest.iter();
    while let Some(flag) = flags.next() {
        match flag.as_str() {
            "--start" => options.start_index = flag_value(flag, flags.next())?,
            "--review" => options.review = Some(flag_value(flag, flags.next())?),
            "--json" => options.as_json = true,
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(options)
}

fn flag_value(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got {value:?}"))
}

/// Read an answers file, substituting a blank answer for any game that
/// fails to parse.
fn load_answers(path: &Path, problems: &[Problem]) -> anyhow::Result<Vec<GameTree>> {
    let text = fs::read_to_string(path)?;
    let games = read_games(&text, NodeOrigin::Candidate)?;

    if games.len() != problems.len() {
        warn!(
            file = %path.display(),
            answers = games.len(),
            problems = problems.len(),
            "Answer count does not match problem count"
        );
    }

    let answers = games
        .into_iter()
        .zip(problems)
        .enumerate()
        .map(|(i, (game, problem))| match game {
            Ok(tree) => tree,
            Err(e) => {
                warn!(file = %path.display(), problem = i, "Unparsable answer, scoring as blank: {e}");
                problem.blank_answer().into_origin(NodeOrigin::Candidate)
            }
        })
        .collect();

    Ok(answers)
}

fn answer_files(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let pattern = format!("{}/*.pgn", path.display());
    let mut files: Vec<PathBuf> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    files.sort();
    Ok(files)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let _ = dotenvy::dotenv();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("score-exam");
    let options = match parse_args(args.get(1..).unwrap_or_default()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Usage: {program} {USAGE}");
            std::process::exit(1);
        }
    };
    let Options {
        exam: exam_path,
        answers: answers_path,
        start_index,
        review,
        as_json,
    } = options;

    let config = ScoringConfig::from_env()?;
    let problems = parse_exam(&fs::read_to_string(&exam_path)?)?;
    info!(exam = %exam_path.display(), problems = problems.len(), "Exam loaded");

    let files = answer_files(&answers_path)?;
    if files.is_empty() {
        eprintln!("No answer files found in {}", answers_path.display());
        std::process::exit(1);
    }

    for file in &files {
        let answers = load_answers(file, &problems)?;
        let scores = score_exam(&problems, &answers, start_index, &config);

        let rounded: Vec<_> = scores.problems.iter().map(|t| t.rounded()).collect();
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "total": scores.total.rounded(),
            "problems": rounded,
            "percentage": tactics_exam::score::round_for_display(scores.percentage()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);

        if let Some(index) = review {
            let Some(problem) = problems.get(index) else {
                warn!(index, "No such problem to review");
                continue;
            };
            let blank = problem.blank_answer();
            let answer = answers.get(index).unwrap_or(&blank);
            let merged = match review_tree(&problem.solution, answer, start_index) {
                Ok(merged) => merged,
                Err(e) => {
                    warn!(index, "Could not merge answer for review: {e}");
                    continue;
                }
            };

            if as_json {
                println!("{}", serde_json::to_string_pretty(&tree_to_json(&merged))?);
            } else {
                println!("{}", write_pgn(&merged));
            }
        }
    }

    Ok(())
}
