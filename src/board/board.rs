use core::fmt;

use crate::{
    board::zobrist::ZOBRIST,
    moves::{
        attack_boards::{king_attacks, knight_attacks, pawn_attacks},
        magics::{bishop_attacks, rook_attacks},
        moves::{
            Castle,
            Direction::{North, South},
            Move, CASTLING_RIGHTS,
        },
    },
    types::{
        bitboard::Bitboard,
        pieces::{Color, Piece, PieceName, NUM_PIECES},
        square::Square,
    },
};

/// Slot a null move occupies in the hash history. No real position hashes to
/// zero in practice, so the marker breaks repetition scans across it.
pub const NULL_MOVE_MARKER: u64 = 0;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    bitboards: [Bitboard; NUM_PIECES],
    color_occupancies: [Bitboard; 2],
    mailbox: [Piece; 64],
    /// Side to move
    pub stm: Color,
    pub castling_rights: u32,
    pub en_passant_square: Option<Square>,
    pub half_moves: usize,
    pub zobrist_hash: u64,
    /// Hash of every earlier position on the current line, oldest first.
    /// Applying a move pushes the pre-move hash; reverting pops it.
    pub hash_history: Vec<u64>,
}

/// Everything move application destroys and reversion needs back.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Undo {
    /// Occupant of the destination square before the move, `Piece::None` if
    /// it was empty. An en passant victim does not count; it never stood on
    /// the destination.
    pub capture: Piece,
    pub castling_rights: u32,
    pub en_passant_square: Option<Square>,
    pub half_moves: usize,
    pub zobrist_hash: u64,
}

impl Board {
    pub fn empty() -> Self {
        Self {
            bitboards: [Bitboard::EMPTY; NUM_PIECES],
            color_occupancies: [Bitboard::EMPTY; 2],
            mailbox: [Piece::None; 64],
            stm: Color::White,
            castling_rights: 0,
            en_passant_square: None,
            half_moves: 0,
            zobrist_hash: 0,
            hash_history: Vec::new(),
        }
    }

    pub fn bitboard(&self, side: Color, piece: PieceName) -> Bitboard {
        self.piece(piece) & self.color(side)
    }

    pub fn piece(&self, piece: PieceName) -> Bitboard {
        self.bitboards[piece]
    }

    pub fn color(&self, color: Color) -> Bitboard {
        self.color_occupancies[color]
    }

    pub fn occupancies(&self) -> Bitboard {
        self.color(Color::White) | self.color(Color::Black)
    }

    pub fn piece_at(&self, sq: Square) -> Piece {
        self.mailbox[sq]
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.bitboard(color, PieceName::King).lsb()
    }

    pub fn can_castle(&self, c: Castle) -> bool {
        self.castling_rights & c as u32 != 0
    }

    /// True when the side owns a piece besides its king and pawns. Handing
    /// over the turn in a pawn ending invites zugzwang blindness, so the
    /// null-move heuristic stays off without such material.
    pub fn has_non_pawns(&self, side: Color) -> bool {
        self.color(side) & !(self.piece(PieceName::King) | self.piece(PieceName::Pawn)) != Bitboard::EMPTY
    }

    pub fn attackers_for_side(&self, attacker: Color, sq: Square, occupancy: Bitboard) -> Bitboard {
        let diags = self.piece(PieceName::Queen) | self.piece(PieceName::Bishop);
        let orthos = self.piece(PieceName::Queen) | self.piece(PieceName::Rook);
        let pawn_attacks = pawn_attacks(sq, !attacker) & self.piece(PieceName::Pawn);
        let knight_attacks = knight_attacks(sq) & self.piece(PieceName::Knight);
        let bishop_attacks = bishop_attacks(sq, occupancy) & diags;
        let rook_attacks = rook_attacks(sq, occupancy) & orthos;
        let king_attacks = king_attacks(sq) & self.piece(PieceName::King);
        (pawn_attacks | knight_attacks | bishop_attacks | rook_attacks | king_attacks) & self.color(attacker)
    }

    pub fn square_under_attack(&self, attacker: Color, sq: Square) -> bool {
        self.attackers_for_side(attacker, sq, self.occupancies()) != Bitboard::EMPTY
    }

    pub fn in_check(&self, side: Color) -> bool {
        self.square_under_attack(!side, self.king_square(side))
    }

    pub(crate) fn place_piece(&mut self, piece: Piece, sq: Square) {
        self.mailbox[sq] = piece;
        self.bitboards[piece.name()] ^= sq.bitboard();
        self.color_occupancies[piece.color()] ^= sq.bitboard();
        self.zobrist_hash ^= ZOBRIST.piece_square_hashes[piece.color()][piece.name()][sq];
    }

    pub(crate) fn remove_piece(&mut self, sq: Square) {
        let piece = self.mailbox[sq];
        debug_assert!(piece != Piece::None);
        self.mailbox[sq] = Piece::None;
        self.bitboards[piece.name()] ^= sq.bitboard();
        self.color_occupancies[piece.color()] ^= sq.bitboard();
        self.zobrist_hash ^= ZOBRIST.piece_square_hashes[piece.color()][piece.name()][sq];
    }

    /// Applies a pseudolegal move. Whether the mover's king survives is the
    /// caller's question, asked through `in_check` afterwards; reversal goes
    /// through `undo_move` with the returned record on every path.
    pub fn make_move(&mut self, m: Move) -> Undo {
        let undo = Undo {
            capture: self.piece_at(m.to()),
            castling_rights: self.castling_rights,
            en_passant_square: self.en_passant_square,
            half_moves: self.half_moves,
            zobrist_hash: self.zobrist_hash,
        };
        self.hash_history.push(self.zobrist_hash);

        let piece_moving = self.piece_at(m.from());
        debug_assert!(piece_moving != Piece::None);

        if undo.capture != Piece::None {
            self.remove_piece(m.to());
        }
        self.remove_piece(m.from());
        match m.promotion() {
            Some(promo) => self.place_piece(Piece::new(promo.name(), self.stm), m.to()),
            None => self.place_piece(piece_moving, m.to()),
        }

        if m.is_castle() {
            let castle = m.castle_type();
            self.remove_piece(castle.rook_from());
            self.place_piece(Piece::new(PieceName::Rook, self.stm), castle.rook_to());
        } else if m.is_en_passant() {
            match self.stm {
                Color::White => self.remove_piece(m.to().shift(South)),
                Color::Black => self.remove_piece(m.to().shift(North)),
            }
        }

        if let Some(sq) = self.en_passant_square {
            self.zobrist_hash ^= ZOBRIST.en_passant[sq];
        }
        self.en_passant_square = None;
        if piece_moving.name() == PieceName::Pawn && m.from().rank().abs_diff(m.to().rank()) == 2 {
            let sq = match self.stm {
                Color::White => m.to().shift(South),
                Color::Black => m.to().shift(North),
            };
            self.en_passant_square = Some(sq);
            self.zobrist_hash ^= ZOBRIST.en_passant[sq];
        }

        if undo.capture == Piece::None && piece_moving.name() != PieceName::Pawn {
            self.half_moves += 1;
        } else {
            self.half_moves = 0;
        }

        self.zobrist_hash ^= ZOBRIST.castling[self.castling_rights as usize];
        self.castling_rights &= CASTLING_RIGHTS[m.from()] & CASTLING_RIGHTS[m.to()];
        self.zobrist_hash ^= ZOBRIST.castling[self.castling_rights as usize];

        self.stm = !self.stm;
        self.zobrist_hash ^= ZOBRIST.turn_hash;

        undo
    }

    pub fn undo_move(&mut self, m: Move, undo: &Undo) {
        self.stm = !self.stm;
        let mover = self.stm;

        match m.promotion() {
            Some(_) => {
                self.remove_piece(m.to());
                self.place_piece(Piece::new(PieceName::Pawn, mover), m.from());
            }
            None => {
                let piece = self.piece_at(m.to());
                self.remove_piece(m.to());
                self.place_piece(piece, m.from());
            }
        }

        if m.is_castle() {
            let castle = m.castle_type();
            self.remove_piece(castle.rook_to());
            self.place_piece(Piece::new(PieceName::Rook, mover), castle.rook_from());
        } else if m.is_en_passant() {
            let sq = match mover {
                Color::White => m.to().shift(South),
                Color::Black => m.to().shift(North),
            };
            self.place_piece(Piece::new(PieceName::Pawn, !mover), sq);
        }

        if undo.capture != Piece::None {
            self.place_piece(undo.capture, m.to());
        }

        self.castling_rights = undo.castling_rights;
        self.en_passant_square = undo.en_passant_square;
        self.half_moves = undo.half_moves;
        self.zobrist_hash = undo.zobrist_hash;
        self.hash_history.pop();
    }

    /// Hands the turn over without touching a piece. Returns the en passant
    /// square to feed back into `undo_null_move`.
    pub fn make_null_move(&mut self) -> Option<Square> {
        self.hash_history.push(NULL_MOVE_MARKER);
        self.stm = !self.stm;
        self.zobrist_hash ^= ZOBRIST.turn_hash;
        let prev = self.en_passant_square.take();
        if let Some(sq) = prev {
            self.zobrist_hash ^= ZOBRIST.en_passant[sq];
        }
        prev
    }

    pub fn undo_null_move(&mut self, prev_ep: Option<Square>) {
        self.hash_history.pop();
        self.stm = !self.stm;
        self.zobrist_hash ^= ZOBRIST.turn_hash;
        if let Some(sq) = prev_ep {
            self.zobrist_hash ^= ZOBRIST.en_passant[sq];
        }
        self.en_passant_square = prev_ep;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut str = String::new();

        for row in (0..8).rev() {
            str.push_str(&(row + 1).to_string());
            str.push_str(" | ");

            for col in 0..8 {
                let piece = self.piece_at(Square(row * 8 + col));
                str += &piece.char();
                str.push_str(" | ");
            }

            str.push('\n');
        }

        str.push_str("    a   b   c   d   e   f   g   h\n");

        write!(f, "{str}")
    }
}
