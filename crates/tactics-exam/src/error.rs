//! Scoring engine error types

use chess_core::TreeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExamError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Move tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Start index {index} is past the end of a {len}-ply mainline")]
    StartOutOfRange { index: usize, len: usize },

    #[error("Candidate starts from '{candidate}' but the solution anchor is '{anchor}'")]
    StartMismatch { candidate: String, anchor: String },
}
