use crate::{
    config::ExpandOptions,
    pgn::{Game, GameTree, NodeId},
};

use super::paths::Path;

/// Builds a linear game replaying `path` from the source game's start.
///
/// Headers are copied verbatim and in order. Each move keeps its comment and
/// NAGs unless `options` strips them.
pub fn materialize(source: &Game, path: &Path, options: &ExpandOptions) -> Game {
    let mut tree = GameTree::new(source.tree.start_position().clone());
    let mut cursor = NodeId::ROOT;

    for &id in path.nodes() {
        let node = source.tree.node(id);
        let Some(mv) = node.mv() else {
            continue;
        };
        cursor = tree.add_move(cursor, mv.clone());
        let copy = tree.node_mut(cursor);
        if !options.strip_comments {
            copy.comment = node.comment.clone();
            copy.starting_comment = node.starting_comment.clone();
        }
        if !options.strip_nags {
            copy.nags = node.nags.clone();
        }
    }

    debug_assert!(tree.is_linear());
    let mut game = Game::new(source.headers().to_vec(), tree);
    game.outcome = source.outcome.clone();
    game
}
