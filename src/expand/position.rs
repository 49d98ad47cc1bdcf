//! Position equality used to detect transpositions.
//!
//! Two positions are the same when piece placement, side to move, castling
//! rights and the en passant square all match. Halfmove clock and fullmove
//! number are ignored, so the same position reached by different move orders
//! compares equal. The en passant square only counts when a capture is
//! actually legal, the same normalisation used for opening lookup.

use shakmaty::{Bitboard, Board, Chess, Color, EnPassantMode, Position, Square};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    board: Board,
    turn: Color,
    castling_rights: Bitboard,
    ep_square: Option<Square>,
}

impl PositionKey {
    pub fn new(position: &Chess) -> Self {
        Self {
            board: position.board().clone(),
            turn: position.turn(),
            castling_rights: position.castles().castling_rights(),
            ep_square: position.ep_square(EnPassantMode::Legal),
        }
    }
}

pub fn positions_equal(a: &Chess, b: &Chess) -> bool {
    PositionKey::new(a) == PositionKey::new(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{fen::Fen, san::San, CastlingMode};

    fn after(moves: &str) -> Chess {
        let mut pos = Chess::default();
        for token in moves.split_whitespace() {
            let mv = token.parse::<San>().unwrap().to_move(&pos).unwrap();
            pos.play_unchecked(&mv);
        }
        pos
    }

    fn from_fen(fen: &str) -> Chess {
        let fen = Fen::from_ascii(fen.as_bytes()).unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    #[test]
    fn transposed_move_orders_are_equal() {
        assert!(positions_equal(
            &after("e4 e5 Nf3 Nc6"),
            &after("Nf3 Nc6 e4 e5")
        ));
    }

    #[test]
    fn move_counters_are_ignored() {
        // Knight shuffle returns to the same placement two moves later.
        let a = after("Nf3 Nf6");
        let b = after("Nf3 Nf6 Ng1 Ng8 Nf3 Nf6");
        assert_ne!(a.fullmoves(), b.fullmoves());
        assert_ne!(a.halfmoves(), b.halfmoves());
        assert!(positions_equal(&a, &b));
    }

    #[test]
    fn side_to_move_matters() {
        let white = from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let black = from_fen("4k3/8/8/8/8/8/8/4K3 b - - 0 1");
        assert!(!positions_equal(&white, &black));
    }

    #[test]
    fn castling_rights_matter() {
        let with = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let without = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Qkq - 0 1");
        assert!(!positions_equal(&with, &without));
    }

    #[test]
    fn capturable_en_passant_square_matters() {
        let with_ep = from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        let without_ep = from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2");
        assert!(!positions_equal(&with_ep, &without_ep));
    }

    #[test]
    fn uncapturable_en_passant_square_is_ignored() {
        // 1. e4 sets e3 in the FEN but no black pawn can take.
        let pushed = after("e4");
        let plain = from_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        assert!(positions_equal(&pushed, &plain));
    }
}
