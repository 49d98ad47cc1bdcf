//! PGN reading, the in-memory game tree, and PGN writing.

pub mod reader;
pub mod tree;
pub mod writer;

pub use {
    reader::{read_games, GameBuilder, PgnGames},
    tree::{Game, GameTree, Mainline, Node, NodeId},
    writer::{game_to_pgn, PgnWriter},
};
