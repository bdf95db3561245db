use core::fmt;

use strum_macros::EnumIter;

use crate::{
    board::board::Board,
    types::{pieces::PieceName, square::Square},
};

/// Cardinal directions from the point of view of the white side.
#[derive(EnumIter, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthWest,
    West,
    SouthWest,
    South,
    SouthEast,
    East,
    NorthEast,
}

impl Direction {
    pub fn opp(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthWest => Self::SouthEast,
            Self::West => Self::East,
            Self::SouthWest => Self::NorthEast,
            Self::South => Self::North,
            Self::SouthEast => Self::NorthWest,
            Self::East => Self::West,
            Self::NorthEast => Self::SouthWest,
        }
    }

    /// (file delta, rank delta)
    pub fn to_xy(self) -> (i8, i8) {
        match self {
            Self::North => (0, 1),
            Self::NorthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::SouthWest => (-1, -1),
            Self::South => (0, -1),
            Self::SouthEast => (1, -1),
            Self::East => (1, 0),
            Self::NorthEast => (1, 1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum MoveType {
    Normal = 0,
    Promotion = 1,
    EnPassant = 2,
    Castle = 3,
}

/// What a pawn may become on the back rank.
#[derive(Clone, Copy, Debug, EnumIter, PartialEq, Eq)]
pub enum Promotion {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl Promotion {
    pub fn name(self) -> PieceName {
        match self {
            Self::Queen => PieceName::Queen,
            Self::Rook => PieceName::Rook,
            Self::Bishop => PieceName::Bishop,
            Self::Knight => PieceName::Knight,
        }
    }
}

/// A move fits in 16 bits:
///
/// bit  0- 5: origin square (0 to 63)
/// bit  6-11: destination square (0 to 63)
/// bit 12-13: promotion piece
/// bit 14-15: move type: normal (0), promotion (1), en passant (2), castle (3)
///
/// `Move::NONE` doubles as the "no move" sentinel; a1a1 is never legal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move(u16);

impl Move {
    pub const NONE: Move = Move(0);

    fn full_move(origin: Square, destination: Square, promotion: u16, move_type: MoveType) -> Self {
        Move(origin.0 as u16 | (destination.0 as u16) << 6 | promotion << 12 | (move_type as u16) << 14)
    }

    pub fn new(origin: Square, destination: Square) -> Self {
        Self::full_move(origin, destination, 0, MoveType::Normal)
    }

    pub fn new_promotion(origin: Square, destination: Square, promotion: Promotion) -> Self {
        let promotion = match promotion {
            Promotion::Knight => 0,
            Promotion::Bishop => 1,
            Promotion::Rook => 2,
            Promotion::Queen => 3,
        };
        Self::full_move(origin, destination, promotion, MoveType::Promotion)
    }

    pub fn new_en_passant(origin: Square, destination: Square) -> Self {
        Self::full_move(origin, destination, 0, MoveType::EnPassant)
    }

    pub fn new_castle(origin: Square, destination: Square) -> Self {
        Self::full_move(origin, destination, 0, MoveType::Castle)
    }

    #[inline(always)]
    pub fn from(self) -> Square {
        Square((self.0 & 0b11_1111) as u8)
    }

    #[inline(always)]
    pub fn to(self) -> Square {
        Square((self.0 >> 6 & 0b11_1111) as u8)
    }

    #[inline(always)]
    pub fn move_type(self) -> MoveType {
        match self.0 >> 14 {
            0 => MoveType::Normal,
            1 => MoveType::Promotion,
            2 => MoveType::EnPassant,
            _ => MoveType::Castle,
        }
    }

    #[inline(always)]
    pub fn is_en_passant(self) -> bool {
        self.move_type() == MoveType::EnPassant
    }

    #[inline(always)]
    pub fn is_castle(self) -> bool {
        self.move_type() == MoveType::Castle
    }

    #[inline(always)]
    pub fn promotion(self) -> Option<Promotion> {
        if self.move_type() != MoveType::Promotion {
            return None;
        }
        match self.0 >> 12 & 0b11 {
            0 => Some(Promotion::Knight),
            1 => Some(Promotion::Bishop),
            2 => Some(Promotion::Rook),
            _ => Some(Promotion::Queen),
        }
    }

    /// Raw token, used as the index into the history tables.
    #[inline(always)]
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Rebuilds a move from its raw token, as the transposition table stores
    /// them.
    #[inline(always)]
    pub const fn from_u16(raw: u16) -> Self {
        Move(raw)
    }

    pub fn castle_type(self) -> Castle {
        debug_assert!(self.is_castle());
        match self.to() {
            Square(6) => Castle::WhiteKing,
            Square(2) => Castle::WhiteQueen,
            Square(62) => Castle::BlackKing,
            Square(58) => Castle::BlackQueen,
            _ => unreachable!(),
        }
    }

    /// Long algebraic notation as the UCI protocol prints moves.
    pub fn to_lan(self) -> String {
        let mut str = String::new();
        str += &self.from().to_string();
        str += &self.to().to_string();
        match self.promotion() {
            Some(Promotion::Queen) => str += "q",
            Some(Promotion::Rook) => str += "r",
            Some(Promotion::Bishop) => str += "b",
            Some(Promotion::Knight) => str += "n",
            None => (),
        }
        str
    }
}

/// Parses a long-algebraic move from the UCI stream. The board disambiguates
/// castling and en passant, which the notation leaves implicit.
pub fn from_lan(str: &str, board: &Board) -> Move {
    let vec: Vec<char> = str.chars().collect();

    let origin = Square((vec[0] as u8 - b'a') + (vec[1] as u8 - b'1') * 8);
    let dest = Square((vec[2] as u8 - b'a') + (vec[3] as u8 - b'1') * 8);

    if let Some(c) = vec.get(4) {
        let promotion = match c {
            'q' => Promotion::Queen,
            'r' => Promotion::Rook,
            'b' => Promotion::Bishop,
            'n' => Promotion::Knight,
            _ => panic!("invalid promotion piece"),
        };
        return Move::new_promotion(origin, dest, promotion);
    }

    let piece_moving = board.piece_at(origin).name();
    if piece_moving == PieceName::King && origin.dist(dest) == 2 {
        return Move::new_castle(origin, dest);
    }
    if piece_moving == PieceName::Pawn
        && board.en_passant_square == Some(dest)
        && origin.file() != dest.file()
    {
        return Move::new_en_passant(origin, dest);
    }
    Move::new(origin, dest)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Castle {
    WhiteKing = 1,
    WhiteQueen = 2,
    BlackKing = 4,
    BlackQueen = 8,
}

impl Castle {
    pub fn rook_from(self) -> Square {
        match self {
            Self::WhiteKing => Square(7),
            Self::WhiteQueen => Square(0),
            Self::BlackKing => Square(63),
            Self::BlackQueen => Square(56),
        }
    }

    pub fn rook_to(self) -> Square {
        match self {
            Self::WhiteKing => Square(5),
            Self::WhiteQueen => Square(3),
            Self::BlackKing => Square(61),
            Self::BlackQueen => Square(59),
        }
    }
}

/// Rights remaining after a move touches the indexed square.
#[rustfmt::skip]
pub const CASTLING_RIGHTS: [u32; 64] = [
    13, 15, 15, 15, 12, 15, 15, 14,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
    15, 15, 15, 15, 15, 15, 15, 15,
     7, 15, 15, 15,  3, 15, 15, 11,
];

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_lan())
    }
}

#[cfg(test)]
mod move_test {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_move_encoding() {
        let normal = Move::new(Square(10), Square(20));
        assert_eq!(normal.from(), Square(10));
        assert_eq!(normal.to(), Square(20));
        assert_eq!(normal.move_type(), MoveType::Normal);
        assert_eq!(normal.promotion(), None);

        let castle = Move::new_castle(Square(4), Square(2));
        assert!(castle.is_castle());
        assert_eq!(castle.castle_type(), Castle::WhiteQueen);
        assert_eq!(castle.promotion(), None);

        let ep = Move::new_en_passant(Square(36), Square(43));
        assert!(ep.is_en_passant());
        assert_eq!(ep.from(), Square(36));
        assert_eq!(ep.to(), Square(43));
    }

    #[test]
    fn test_promotion_encoding() {
        for promotion in Promotion::iter() {
            let m = Move::new_promotion(Square(52), Square(60), promotion);
            assert_eq!(m.move_type(), MoveType::Promotion);
            assert_eq!(m.promotion(), Some(promotion));
        }
    }

    #[test]
    fn test_lan() {
        assert_eq!(Move::new(Square(12), Square(28)).to_lan(), "e2e4");
        assert_eq!(
            Move::new_promotion(Square(48), Square(56), Promotion::Queen).to_lan(),
            "a7a8q"
        );
    }
}
