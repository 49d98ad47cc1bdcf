use std::path::PathBuf;

/// Errors raised while reading, expanding and writing PGN games.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Input file '{}' not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error("FEN parsing error: {0}")]
    Fen(#[from] shakmaty::fen::ParseFenError),

    #[error("Position setup error: {0}")]
    PositionSetup(#[from] shakmaty::PositionError<shakmaty::Chess>),

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Invalid options file: {0}")]
    Options(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
