//! Turns a branching game into one linear game per line.

pub mod materialize;
pub mod paths;
pub mod position;

pub use {
    materialize::materialize,
    paths::{enumerate, MainlineIndex, Path, PathEnumerator},
    position::{positions_equal, PositionKey},
};

use crate::{config::ExpandOptions, pgn::Game};

/// Lazily materializes every line of `game`, in enumeration order.
pub fn expand_game<'a>(
    game: &'a Game,
    options: &'a ExpandOptions,
) -> impl Iterator<Item = Game> + 'a {
    PathEnumerator::new(&game.tree, options.merge_transpositions)
        .map(move |path| materialize(game, &path, options))
}
