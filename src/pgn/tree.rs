//! In-memory game tree.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The root
//! holds the starting position and no move. A node's children are kept in
//! the order they were recorded: index 0 is the primary continuation, every
//! later index is an alternative. Traversal code relies on that order, so it
//! must never be replaced by an unordered collection.

use pgn_reader::Nag;
use shakmaty::{san::SanPlus, Chess, Move};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

impl Default for NodeId {
    fn default() -> Self {
        NodeId::ROOT
    }
}

/// A single position in the tree together with the move that reached it.
#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// `None` only for the root.
    played: Option<(Move, SanPlus)>,
    position: Chess,
    pub comment: Option<String>,
    /// Comment written before the move, used when a variation opens with one.
    pub starting_comment: Option<String>,
    pub nags: Vec<Nag>,
}

impl Node {
    fn new(parent: Option<NodeId>, played: Option<(Move, SanPlus)>, position: Chess) -> Self {
        Self {
            parent,
            children: Vec::new(),
            played,
            position,
            comment: None,
            starting_comment: None,
            nags: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn mv(&self) -> Option<&Move> {
        self.played.as_ref().map(|(mv, _)| mv)
    }

    pub fn san(&self) -> Option<&SanPlus> {
        self.played.as_ref().map(|(_, san)| san)
    }

    /// Position after this node's move (the starting position for the root).
    pub fn position(&self) -> &Chess {
        &self.position
    }
}

#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<Node>,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl GameTree {
    pub fn new(start: Chess) -> Self {
        Self {
            nodes: vec![Node::new(None, None, start)],
        }
    }

    pub fn root(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn start_position(&self) -> &Chess {
        self.root().position()
    }

    /// Number of moves stored in the tree, over all variations.
    pub fn move_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.move_count() == 0
    }

    /// Appends `mv` as the last child of `parent`. The move must be legal in
    /// the parent's position; callers resolve it against that position first.
    pub fn add_move(&mut self, parent: NodeId, mv: Move) -> NodeId {
        let mut position = self.nodes[parent.0].position.clone();
        let san = SanPlus::from_move_and_play_unchecked(&mut position, &mv);
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(parent), Some((mv, san)), position));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Walks index-0 children from the root. The root itself is not yielded.
    pub fn mainline(&self) -> Mainline<'_> {
        Mainline {
            tree: self,
            current: NodeId::ROOT,
        }
    }

    /// True when no node has more than one child.
    pub fn is_linear(&self) -> bool {
        self.nodes.iter().all(|node| node.children.len() <= 1)
    }

    pub fn san_line(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter()
            .filter_map(|&id| self.node(id).san())
            .map(|san| san.to_string())
            .collect()
    }
}

pub struct Mainline<'a> {
    tree: &'a GameTree,
    current: NodeId,
}

impl Iterator for Mainline<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = *self.tree.node(self.current).children.first()?;
        self.current = next;
        Some(next)
    }
}

/// One source or generated game: ordered headers plus a move tree.
#[derive(Debug, Clone, Default)]
pub struct Game {
    headers: Vec<(String, String)>,
    pub tree: GameTree,
    /// Comment written before the first move.
    pub comment: Option<String>,
    /// Termination marker found at the end of the movetext, if any.
    pub outcome: Option<String>,
    /// Problems met while reading the record. The tree holds the moves read
    /// before each of them.
    pub errors: Vec<String>,
}

impl Game {
    pub fn new(headers: Vec<(String, String)>, tree: GameTree) -> Self {
        Self {
            headers,
            tree,
            comment: None,
            outcome: None,
            errors: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Marker closing the movetext: the `Result` header wins, then the parsed
    /// outcome, then `*`.
    pub fn result(&self) -> &str {
        self.header("Result")
            .or(self.outcome.as_deref())
            .unwrap_or("*")
    }
}
