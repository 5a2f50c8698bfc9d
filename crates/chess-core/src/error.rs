//! Move tree and PGN errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("Invalid SAN '{0}'")]
    InvalidSan(String),

    #[error("Illegal move '{san}' in position {fen}")]
    IllegalMove { san: String, fen: String },

    #[error("Variation opened before any move")]
    OrphanVariation,

    #[error("PGN read error: {0}")]
    Io(#[from] std::io::Error),
}
