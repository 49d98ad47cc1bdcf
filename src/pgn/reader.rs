//! Builds [`Game`] trees from PGN text.
//!
//! [`GameBuilder`] is a `pgn_reader::Visitor`: the reader streams tokens and
//! the builder keeps a cursor into the tree. Opening a variation moves the
//! cursor back to the parent of the last move, so the variation's first move
//! becomes a sibling of the move it replaces.

use std::io::Read;

use log::{debug, warn};
use pgn_reader::{BufferedReader, Nag, RawComment, RawHeader, Skip, Visitor};
use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    CastlingMode, Chess, Outcome, Position,
};

use crate::error::{Error, Result};

use super::tree::{Game, GameTree, NodeId};

#[derive(Debug, Default)]
pub struct GameBuilder {
    games_seen: usize,
    headers: Vec<(String, String)>,
    tree: GameTree,
    cursor: NodeId,
    variation_stack: Vec<NodeId>,
    /// Set right after `(` until the variation's first move is read.
    variation_start: bool,
    /// Set after an unplayable move until the enclosing variation closes.
    skipping: bool,
    pending_starting_comment: Option<String>,
    game_comment: Option<String>,
    outcome: Option<String>,
    errors: Vec<String>,
}

fn append_comment(slot: &mut Option<String>, text: &str) {
    match slot {
        Some(existing) => {
            existing.push(' ');
            existing.push_str(text);
        }
        None => *slot = Some(text.to_string()),
    }
}

fn starting_position(headers: &[(String, String)]) -> Result<Chess> {
    let header = |key: &str| {
        headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };
    let Some(fen) = header("FEN") else {
        return Ok(Chess::default());
    };
    let chess960 = header("Variant")
        .map(|v| v.to_lowercase().replace(' ', "").contains("960"))
        .unwrap_or(false);
    let fen = Fen::from_ascii(fen.trim().as_bytes())?;
    let position: Chess = fen.into_position(CastlingMode::from_chess960(chess960))?;
    Ok(position)
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_error(&mut self, error: Error) {
        warn!("Game #{}: {}", self.games_seen, error);
        self.errors.push(error.to_string());
    }
}

impl Visitor for GameBuilder {
    type Result = Game;

    fn begin_game(&mut self) {
        self.games_seen += 1;
        self.headers.clear();
        self.tree = GameTree::default();
        self.cursor = NodeId::ROOT;
        self.variation_stack.clear();
        self.variation_start = false;
        self.skipping = false;
        self.pending_starting_comment = None;
        self.game_comment = None;
        self.outcome = None;
        self.errors.clear();
    }

    fn header(&mut self, key: &[u8], value: RawHeader<'_>) {
        let key = String::from_utf8_lossy(key).into_owned();
        let value = value.decode_utf8_lossy().into_owned();
        self.headers.push((key, value));
    }

    fn end_headers(&mut self) -> Skip {
        match starting_position(&self.headers) {
            Ok(start) => {
                self.tree = GameTree::new(start);
                Skip(false)
            }
            Err(e) => {
                self.record_error(e);
                Skip(true)
            }
        }
    }

    fn san(&mut self, san_plus: SanPlus) {
        if self.skipping {
            return;
        }
        let position = self.tree.node(self.cursor).position();
        match san_plus.san.to_move(position) {
            Ok(mv) => {
                let id = self.tree.add_move(self.cursor, mv);
                if let Some(comment) = self.pending_starting_comment.take() {
                    self.tree.node_mut(id).starting_comment = Some(comment);
                }
                self.cursor = id;
                self.variation_start = false;
            }
            Err(e) => {
                let move_number = self.tree.node(self.cursor).position().fullmoves();
                let reason = match san_plus.san {
                    San::Null => "null moves are not supported".to_string(),
                    _ => e.to_string(),
                };
                self.record_error(Error::IllegalMove(format!(
                    "{san_plus} at move {move_number}: {reason}"
                )));
                // Keep what was read so far, drop the rest of this line.
                self.skipping = true;
                self.pending_starting_comment = None;
            }
        }
    }

    fn nag(&mut self, nag: Nag) {
        if self.skipping {
            return;
        }
        if self.cursor == NodeId::ROOT {
            debug!("Ignoring NAG ${} before the first move", nag.0);
            return;
        }
        self.tree.node_mut(self.cursor).nags.push(nag);
    }

    fn comment(&mut self, comment: RawComment<'_>) {
        if self.skipping {
            return;
        }
        let text = String::from_utf8_lossy(comment.as_bytes());
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.variation_start {
            append_comment(&mut self.pending_starting_comment, text);
        } else if self.cursor == NodeId::ROOT {
            append_comment(&mut self.game_comment, text);
        } else {
            append_comment(&mut self.tree.node_mut(self.cursor).comment, text);
        }
    }

    fn begin_variation(&mut self) -> Skip {
        if self.skipping {
            return Skip(true);
        }
        match self.tree.node(self.cursor).parent() {
            Some(parent) => {
                self.variation_stack.push(self.cursor);
                self.cursor = parent;
                self.variation_start = true;
                self.pending_starting_comment = None;
                Skip(false)
            }
            None => {
                warn!(
                    "Skipping variation with no preceding move in game #{}",
                    self.games_seen
                );
                Skip(true)
            }
        }
    }

    fn end_variation(&mut self) {
        if let Some(cursor) = self.variation_stack.pop() {
            self.cursor = cursor;
        }
        self.variation_start = false;
        self.skipping = false;
        self.pending_starting_comment = None;
    }

    fn outcome(&mut self, outcome: Option<Outcome>) {
        self.outcome = Some(outcome.map_or_else(|| "*".to_string(), |o| o.to_string()));
    }

    fn end_game(&mut self) -> Self::Result {
        let mut game = Game::new(
            std::mem::take(&mut self.headers),
            std::mem::take(&mut self.tree),
        );
        game.comment = self.game_comment.take();
        game.outcome = self.outcome.take();
        game.errors = std::mem::take(&mut self.errors);
        debug!(
            "Parsed game #{} with {} moves",
            self.games_seen,
            game.tree.move_count()
        );
        game
    }
}

/// Streams games out of a PGN source, one tree at a time.
///
/// A record with an unplayable move or a bad `FEN` header still yields a
/// game: the moves read before the problem are kept and the problem is
/// listed in [`Game::errors`]. Only I/O failures end the stream with an
/// error.
pub struct PgnGames<R: Read> {
    reader: BufferedReader<R>,
    builder: GameBuilder,
}

impl<R: Read> PgnGames<R> {
    pub fn new(input: R) -> Self {
        Self {
            reader: BufferedReader::new(input),
            builder: GameBuilder::new(),
        }
    }
}

impl<R: Read> Iterator for PgnGames<R> {
    type Item = Result<Game>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_game(&mut self.builder) {
            Ok(Some(game)) => Some(Ok(game)),
            Ok(None) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

/// Parses every game in `pgn`.
pub fn read_games(pgn: &str) -> Result<Vec<Game>> {
    PgnGames::new(pgn.as_bytes()).collect()
}
