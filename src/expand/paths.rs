//! Enumeration of every line through a game tree.
//!
//! [`PathEnumerator`] walks the tree depth-first with an explicit stack, so
//! stack usage does not grow with game length, and yields one [`Path`] per
//! leaf. Children are visited in stored order, index 0 first, which makes the
//! output order deterministic: the primary line always comes out first.
//!
//! A line that stops before the primary line does may transpose into it. When
//! the leaf's position also occurs on the primary line, the primary line's
//! moves after the earliest such occurrence are appended to the path.

use std::collections::HashMap;

use log::debug;

use crate::pgn::{GameTree, NodeId};

use super::position::PositionKey;

/// One root-to-leaf line, possibly extended with a primary line suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    nodes: Vec<NodeId>,
    /// Length of the path before the primary line suffix was appended.
    own_len: usize,
}

impl Path {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether moves from the primary line were spliced onto this path.
    pub fn is_merged(&self) -> bool {
        self.own_len < self.nodes.len()
    }

    /// The moves inherited from the primary line.
    pub fn inherited(&self) -> &[NodeId] {
        &self.nodes[self.own_len..]
    }
}

/// Primary line positions, indexed once per game.
#[derive(Debug)]
pub struct MainlineIndex {
    line: Vec<NodeId>,
    first_seen: HashMap<PositionKey, usize>,
}

impl MainlineIndex {
    pub fn new(tree: &GameTree) -> Self {
        let line: Vec<NodeId> = tree.mainline().collect();
        let mut first_seen = HashMap::with_capacity(line.len());
        for (i, &id) in line.iter().enumerate() {
            first_seen
                .entry(PositionKey::new(tree.node(id).position()))
                .or_insert(i);
        }
        Self { line, first_seen }
    }

    pub fn line(&self) -> &[NodeId] {
        &self.line
    }

    /// Primary line moves strictly after the earliest node matching `key`.
    pub fn continuation_after(&self, key: &PositionKey) -> Option<&[NodeId]> {
        self.first_seen.get(key).map(|&i| &self.line[i + 1..])
    }

    fn last(&self) -> Option<NodeId> {
        self.line.last().copied()
    }
}

struct Frame {
    node: NodeId,
    /// Number of moves on the path once `node` is included.
    depth: usize,
}

pub struct PathEnumerator<'a> {
    tree: &'a GameTree,
    index: MainlineIndex,
    merge_transpositions: bool,
    stack: Vec<Frame>,
    current: Vec<NodeId>,
}

impl<'a> PathEnumerator<'a> {
    pub fn new(tree: &'a GameTree, merge_transpositions: bool) -> Self {
        Self {
            tree,
            index: MainlineIndex::new(tree),
            merge_transpositions,
            stack: vec![Frame {
                node: NodeId::ROOT,
                depth: 0,
            }],
            current: Vec::new(),
        }
    }

    fn finish(&self, leaf: NodeId) -> Path {
        let mut nodes = self.current.clone();
        let own_len = nodes.len();
        // The primary line's own leaf has nothing left to inherit.
        if self.merge_transpositions && Some(leaf) != self.index.last() {
            let key = PositionKey::new(self.tree.node(leaf).position());
            if let Some(suffix) = self.index.continuation_after(&key) {
                debug!(
                    "Line ending in {} transposes into the primary line, inheriting {} moves",
                    self.tree
                        .node(leaf)
                        .san()
                        .map(|san| san.to_string())
                        .unwrap_or_default(),
                    suffix.len()
                );
                nodes.extend_from_slice(suffix);
            }
        }
        Path { nodes, own_len }
    }
}

impl Iterator for PathEnumerator<'_> {
    type Item = Path;

    fn next(&mut self) -> Option<Path> {
        let tree = self.tree;
        while let Some(Frame { node, depth }) = self.stack.pop() {
            if node != NodeId::ROOT {
                self.current.truncate(depth - 1);
                self.current.push(node);
            }

            let children = tree.node(node).children();
            if children.is_empty() {
                if self.current.is_empty() {
                    continue;
                }
                return Some(self.finish(node));
            }

            // Reverse push so index 0 is popped first.
            for &child in children.iter().rev() {
                self.stack.push(Frame {
                    node: child,
                    depth: depth + 1,
                });
            }
        }
        None
    }
}

/// Enumerates the lines of `tree` with transposition merging enabled.
pub fn enumerate(tree: &GameTree) -> PathEnumerator<'_> {
    PathEnumerator::new(tree, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::read_games;

    fn tree_of(pgn: &str) -> GameTree {
        read_games(pgn).unwrap().remove(0).tree
    }

    fn lines(tree: &GameTree) -> Vec<Vec<String>> {
        enumerate(tree)
            .map(|path| tree.san_line(path.nodes()))
            .collect()
    }

    #[test]
    fn unbranched_game_is_a_single_path() {
        let tree = tree_of("1. e4 e5 2. Nf3 Nc6 3. Bb5 *");
        assert_eq!(lines(&tree), vec![vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]]);
    }

    #[test]
    fn each_first_move_alternative_is_a_path() {
        let tree = tree_of("1. e4 (1. d4) (1. c4) (1. Nf3) *");
        assert_eq!(
            lines(&tree),
            vec![vec!["e4"], vec!["d4"], vec!["c4"], vec!["Nf3"]]
        );
    }

    #[test]
    fn empty_game_has_no_paths() {
        let tree = tree_of("[Event \"Empty\"]\n\n*");
        assert_eq!(enumerate(&tree).count(), 0);
    }

    #[test]
    fn variation_inherits_primary_line_after_transposition() {
        // The d4 line reaches the position after 1. e4 e5 2. d4 by another order.
        let tree = tree_of("1. e4 (1. d4 e5 2. e4) e5 2. d4 exd4 3. Qxd4 *");
        let paths: Vec<Path> = enumerate(&tree).collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            tree.san_line(paths[1].nodes()),
            vec!["d4", "e5", "e4", "exd4", "Qxd4"]
        );
        assert!(paths[1].is_merged());
        assert_eq!(tree.san_line(paths[1].inherited()), vec!["exd4", "Qxd4"]);
        assert!(!paths[0].is_merged());
    }

    #[test]
    fn variation_returning_to_first_move_inherits_reply() {
        // The knight dance ends in the position after 1. e4.
        let tree = tree_of("[Event \"Test\"]\n\n1. e4 (1. Nf3 Nf6 2. Ng1 Ng8 3. e4) e5 *");
        assert_eq!(
            lines(&tree),
            vec![
                vec!["e4", "e5"],
                vec!["Nf3", "Nf6", "Ng1", "Ng8", "e4", "e5"],
            ]
        );
    }

    #[test]
    fn different_position_is_left_as_is() {
        let tree = tree_of("1. e4 (1. d4 d5 2. e4) e5 *");
        assert_eq!(
            lines(&tree),
            vec![vec!["e4", "e5"], vec!["d4", "d5", "e4"]]
        );
    }

    #[test]
    fn merge_uses_earliest_primary_line_occurrence() {
        // Primary line revisits the position after 1. Nf3 at ply 5.
        let tree = tree_of("1. Nf3 (1. Nh3 Nf6 2. Ng1 Ng8 3. Nf3) 1... Nf6 2. Ng1 Ng8 3. Nf3 d5 *");
        let index = MainlineIndex::new(&tree);
        let line = index.line().to_vec();
        let key = PositionKey::new(tree.node(line[4]).position());
        assert_eq!(index.continuation_after(&key), Some(&line[1..]));

        let all = lines(&tree);
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[1],
            vec!["Nh3", "Nf6", "Ng1", "Ng8", "Nf3", "Nf6", "Ng1", "Ng8", "Nf3", "d5"]
        );
    }

    #[test]
    fn return_to_starting_position_does_not_merge() {
        let tree = tree_of("1. e4 (1. Nf3 Nf6 2. Ng1 Ng8) e5 *");
        let paths: Vec<Path> = enumerate(&tree).collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            tree.san_line(paths[1].nodes()),
            vec!["Nf3", "Nf6", "Ng1", "Ng8"]
        );
        assert!(!paths[1].is_merged());
    }

    #[test]
    fn primary_line_ending_in_repetition_is_not_extended() {
        // 3. Nf3 repeats the position after 1. Nf3.
        let tree = tree_of("1. Nf3 (1. e4) 1... Nf6 2. Ng1 Ng8 3. Nf3 *");
        let paths: Vec<Path> = enumerate(&tree).collect();
        assert_eq!(paths.len(), 2);
        assert_eq!(
            tree.san_line(paths[0].nodes()),
            vec!["Nf3", "Nf6", "Ng1", "Ng8", "Nf3"]
        );
        assert!(!paths[0].is_merged());
        assert_eq!(tree.san_line(paths[1].nodes()), vec!["e4"]);
    }

    #[test]
    fn nested_variations_come_out_depth_first() {
        let tree = tree_of("1. e4 e5 (1... c5 2. Nf3 (2. c3) 2... d6) 2. Nf3 (2. Bc4) 2... Nc6 *");
        assert_eq!(
            lines(&tree),
            vec![
                vec!["e4", "e5", "Nf3", "Nc6"],
                vec!["e4", "e5", "Bc4"],
                vec!["e4", "c5", "Nf3", "d6"],
                vec!["e4", "c5", "c3"],
            ]
        );
    }

    #[test]
    fn merging_can_be_disabled() {
        let tree = tree_of("1. e4 (1. d4 e5 2. e4) e5 2. d4 exd4 *");
        let paths: Vec<_> = PathEnumerator::new(&tree, false)
            .map(|path| tree.san_line(path.nodes()))
            .collect();
        assert_eq!(paths[1], vec!["d4", "e5", "e4"]);
    }

    #[test]
    fn long_games_do_not_recurse() {
        let moves: String = (1..=300)
            .map(|n| match n % 2 {
                1 => format!("{n}. Nf3 Nf6 "),
                _ => format!("{n}. Ng1 Ng8 "),
            })
            .collect();
        let tree = tree_of(&format!("{moves}*"));
        let paths: Vec<Path> = enumerate(&tree).collect();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 600);
    }
}
