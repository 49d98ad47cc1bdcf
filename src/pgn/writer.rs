//! PGN serialization.
//!
//! Movetext is emitted as tokens and wrapped at [`LINE_WIDTH`] columns. The
//! primary line is walked iteratively; only nested variations recurse.

use std::io::Write;

use shakmaty::{Color, Position};

use crate::error::Result;

use super::tree::{Game, GameTree, NodeId};

pub const LINE_WIDTH: usize = 80;

pub struct PgnWriter<W: Write> {
    out: W,
    games_written: usize,
}

impl<W: Write> PgnWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            games_written: 0,
        }
    }

    pub fn games_written(&self) -> usize {
        self.games_written
    }

    /// Writes one game followed by a blank line.
    pub fn write_game(&mut self, game: &Game) -> Result<()> {
        self.out.write_all(game_to_pgn(game).as_bytes())?;
        self.out.write_all(b"\n\n")?;
        self.games_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn escape_header(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn comment_token(text: &str) -> String {
    format!("{{ {} }}", text.replace('}', "").trim())
}

struct Movetext<'a> {
    tree: &'a GameTree,
    tokens: Vec<String>,
}

impl<'a> Movetext<'a> {
    /// Pushes the tokens for a single move. Returns whether the next move
    /// needs an explicit number.
    fn push_move(&mut self, id: NodeId, force_number: bool) -> bool {
        let tree = self.tree;
        let node = tree.node(id);
        let Some(san) = node.san() else {
            return force_number;
        };
        if let Some(comment) = &node.starting_comment {
            self.tokens.push(comment_token(comment));
        }
        let before = node
            .parent()
            .map(|parent| tree.node(parent).position())
            .unwrap_or_else(|| tree.start_position());
        let number = before.fullmoves();
        match before.turn() {
            Color::White => self.tokens.push(format!("{number}.")),
            Color::Black if force_number || node.starting_comment.is_some() => {
                self.tokens.push(format!("{number}..."))
            }
            Color::Black => {}
        }
        self.tokens.push(san.to_string());
        for nag in &node.nags {
            self.tokens.push(format!("${}", nag.0));
        }
        match &node.comment {
            Some(comment) => {
                self.tokens.push(comment_token(comment));
                true
            }
            None => false,
        }
    }

    /// Writes the line continuing from `parent`, alternatives included.
    fn push_line(&mut self, parent: NodeId, mut force_number: bool) {
        let tree = self.tree;
        let mut current = parent;
        loop {
            let children = tree.node(current).children();
            let Some((&main, alternatives)) = children.split_first() else {
                break;
            };
            force_number = self.push_move(main, force_number);
            for &alternative in alternatives {
                self.tokens.push("(".to_string());
                let force = self.push_move(alternative, true);
                self.push_line(alternative, force);
                self.tokens.push(")".to_string());
                force_number = true;
            }
            current = main;
        }
    }
}

fn wrap(tokens: &[String]) -> String {
    let mut text = String::new();
    let mut line_len = 0;
    for token in tokens {
        let token = token.as_str();
        let glued = token == ")" || text.ends_with('(');
        if line_len > 0 && !glued && line_len + 1 + token.len() > LINE_WIDTH {
            text.push('\n');
            line_len = 0;
        } else if line_len > 0 && !glued {
            text.push(' ');
            line_len += 1;
        }
        text.push_str(token);
        line_len += token.len();
    }
    text
}

/// Renders a game as PGN text without the trailing blank line.
pub fn game_to_pgn(game: &Game) -> String {
    let mut text = String::new();
    for (key, value) in game.headers() {
        text.push_str(&format!("[{} \"{}\"]\n", key, escape_header(value)));
    }
    if !game.headers().is_empty() {
        text.push('\n');
    }

    let mut movetext = Movetext {
        tree: &game.tree,
        tokens: Vec::new(),
    };
    if let Some(comment) = &game.comment {
        movetext.tokens.push(comment_token(comment));
    }
    movetext.push_line(NodeId::ROOT, true);
    movetext.tokens.push(game.result().to_string());
    text.push_str(&wrap(&movetext.tokens));
    text
}
