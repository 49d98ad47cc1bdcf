//! Expands the variation tree of PGN games into standalone linear games.
//!
//! Every line through a game's move tree becomes its own game with the
//! source headers. A line that stops early but reaches a position from the
//! primary line continues with the primary line's remaining moves, so every
//! move order reaching a position can be drilled to the end.

pub mod config;
pub mod driver;
pub mod error;
pub mod expand;
pub mod pgn;

pub use config::ExpandOptions;
pub use driver::{expand_file, expand_reader, ExpandSummary};
pub use error::{Error, Result};
pub use expand::expand_game;
