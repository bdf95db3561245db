use crate::{
    moves::moves::Castle,
    types::{
        pieces::{Color, Piece, PieceName},
        square::Square,
    },
};

use super::board::Board;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Builds a board from a FEN string. Malformed strings are a caller bug and
/// panic rather than limp along with a corrupt position.
pub fn build_board(fen_string: &str) -> Board {
    let mut board = Board::empty();
    let fields: Vec<&str> = fen_string.split_whitespace().collect();

    let mut iter = fields.iter();
    let placement = iter.next().expect("fen has a piece placement field");
    for (row, rank_str) in placement.split('/').enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            let name = match c.to_ascii_lowercase() {
                'k' => PieceName::King,
                'q' => PieceName::Queen,
                'r' => PieceName::Rook,
                'b' => PieceName::Bishop,
                'n' => PieceName::Knight,
                'p' => PieceName::Pawn,
                _ => panic!("unrecognized piece char {c}"),
            };
            board.place_piece(Piece::new(name, color), Square(rank * 8 + file));
            file += 1;
        }
    }

    board.stm = match iter.next().map(|s| s.chars().next().unwrap()) {
        Some('w') => Color::White,
        Some('b') => Color::Black,
        _ => panic!("invalid side to move"),
    };

    board.castling_rights = iter.next().map_or(0, |s| parse_castling(s));

    board.en_passant_square = iter.next().and_then(|s| find_en_passant_square(s));

    if let Some(half_moves) = iter.next() {
        if let Ok(half_moves) = half_moves.parse() {
            board.half_moves = half_moves;
        }
    }
    // Fullmove counter is not tracked; the hash history stands in for it

    board.zobrist_hash = board.generate_hash();
    board
}

fn parse_castling(buf: &str) -> u32 {
    buf.chars().fold(0, |x, ch| {
        x | match ch {
            'K' => Castle::WhiteKing as u32,
            'Q' => Castle::WhiteQueen as u32,
            'k' => Castle::BlackKing as u32,
            'q' => Castle::BlackQueen as u32,
            _ => 0,
        }
    })
}

fn find_en_passant_square(buf: &str) -> Option<Square> {
    let mut chars = buf.chars();
    let file = chars.next()?;
    if !('a'..='h').contains(&file) {
        return None;
    }
    let rank = chars.next()?.to_digit(10)? as u8 - 1;
    Some(Square(rank * 8 + (file as u8 - b'a')))
}

/// Reassembles the FEN fields of a `position fen ...` command, stopping
/// before any trailing `moves` list.
pub fn parse_fen_from_buffer(buf: &[&str]) -> String {
    buf.iter().skip(2).take(6).take_while(|s| **s != "moves").copied().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod fen_tests {
    use super::*;

    #[test]
    fn test_en_passant_square() {
        assert_eq!(Some(Square(0)), find_en_passant_square("a1"));
        assert_eq!(Some(Square(27)), find_en_passant_square("d4"));
        assert_eq!(Some(Square(62)), find_en_passant_square("g8"));
        assert_eq!(None, find_en_passant_square("-"));
    }

    #[test]
    fn test_parse_castling() {
        assert_eq!(parse_castling("KQkq"), 0b1111);
        assert_eq!(parse_castling("Kk"), Castle::WhiteKing as u32 | Castle::BlackKing as u32);
        assert_eq!(parse_castling("-"), 0);
    }

    #[test]
    fn test_starting_position() {
        let board = build_board(STARTING_FEN);
        assert_eq!(board.stm, Color::White);
        assert_eq!(board.castling_rights, 0b1111);
        assert_eq!(board.en_passant_square, None);
        assert_eq!(board.occupancies().count_bits(), 32);
        assert_eq!(board.piece_at(Square(4)), Piece::WhiteKing);
        assert_eq!(board.piece_at(Square(60)), Piece::BlackKing);
        assert_eq!(board.zobrist_hash, board.generate_hash());
    }

    #[test]
    fn test_position_with_en_passant() {
        let board = build_board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        assert_eq!(board.en_passant_square, Some(Square(43)));
    }
}
