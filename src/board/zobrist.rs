use lazy_static::lazy_static;

use crate::{
    moves::magics::Rng,
    types::pieces::{Color, PieceName},
};

use super::board::Board;

pub struct Zobrist {
    pub piece_square_hashes: [[[u64; 64]; 6]; 2],
    pub turn_hash: u64,
    /// One key per castling-rights nibble
    pub castling: [u64; 16],
    pub en_passant: [u64; 64],
}

lazy_static! {
    pub static ref ZOBRIST: Zobrist = Zobrist::default();
}

impl Default for Zobrist {
    fn default() -> Self {
        let mut rng = Rng::default();
        let turn_hash = rng.next_u64();
        let mut piece_square_hashes = [[[0; 64]; 6]; 2];
        piece_square_hashes.iter_mut().flatten().flatten().for_each(|x| *x = rng.next_u64());
        let mut castling = [0; 16];
        castling.iter_mut().for_each(|x| *x = rng.next_u64());
        let mut en_passant = [0; 64];
        en_passant.iter_mut().for_each(|x| *x = rng.next_u64());
        Self { turn_hash, piece_square_hashes, castling, en_passant }
    }
}

impl Board {
    /// Rebuilds the hash from scratch. Move application maintains it
    /// incrementally; this is the reference the increments must agree with.
    pub fn generate_hash(&self) -> u64 {
        let mut hash = 0;

        for color in Color::iter() {
            for piece in PieceName::iter() {
                for sq in self.bitboard(color, piece) {
                    hash ^= ZOBRIST.piece_square_hashes[color][piece][sq];
                }
            }
        }

        if let Some(sq) = self.en_passant_square {
            hash ^= ZOBRIST.en_passant[sq];
        }

        hash ^= ZOBRIST.castling[self.castling_rights as usize];

        if self.stm == Color::Black {
            hash ^= ZOBRIST.turn_hash;
        }

        hash
    }
}
