use lazy_static::lazy_static;

use crate::{
    moves::attack_boards::{FILE_A, FILE_H, RANK1, RANK8},
    types::{bitboard::Bitboard, square::Square},
};

use super::moves::{Direction, Direction::*};

/// Magic bitboard scheme after the rustic chess engine by mvanthoor,
/// <https://github.com/mvanthoor/rustic/>. Magics are searched at startup
/// rather than baked in.

/// Xorshift generator seeded once; magic candidates want sparse bits.
pub struct Rng(u64);

impl Default for Rng {
    fn default() -> Self {
        Self(0xE926_E621_0D9E_3487)
    }
}

impl Rng {
    pub fn next_u64(&mut self) -> u64 {
        self.0 ^= self.0 << 21;
        self.0 ^= self.0 >> 35;
        self.0 ^= self.0 << 4;
        self.0
    }

    pub fn next_magic(&mut self) -> u64 {
        self.next_u64() & self.next_u64() & self.next_u64()
    }
}

/// Total slots across all squares when each mask uses exactly
/// `mask.count_bits()` index bits.
pub const ROOK_M_SIZE: usize = 102_400;
pub const BISHOP_M_SIZE: usize = 5248;

const R_DELTAS: [Direction; 4] = [North, South, East, West];
const B_DELTAS: [Direction; 4] = [NorthEast, NorthWest, SouthEast, SouthWest];

lazy_static! {
    static ref MAGICS: Magics = Magics::default();
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    MAGICS.rook_attacks(occupied, sq)
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    MAGICS.bishop_attacks(occupied, sq)
}

pub fn queen_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    rook_attacks(sq, occupied) | bishop_attacks(sq, occupied)
}

#[derive(Clone, Copy, Default)]
struct MagicEntry {
    mask: Bitboard,
    magic: u64,
    shift: u8,
    offset: usize,
}

struct Magics {
    rook_table: Vec<Bitboard>,
    rook_magics: [MagicEntry; 64],
    bishop_table: Vec<Bitboard>,
    bishop_magics: [MagicEntry; 64],
}

fn index(entry: &MagicEntry, occupied: Bitboard) -> usize {
    let blockers = occupied & entry.mask;
    let hash = blockers.0.wrapping_mul(entry.magic);
    entry.offset + (hash >> entry.shift) as usize
}

impl Magics {
    fn bishop_attacks(&self, occupied: Bitboard, sq: Square) -> Bitboard {
        self.bishop_table[index(&self.bishop_magics[sq], occupied)]
    }

    fn rook_attacks(&self, occupied: Bitboard, sq: Square) -> Bitboard {
        self.rook_table[index(&self.rook_magics[sq], occupied)]
    }
}

impl Default for Magics {
    fn default() -> Self {
        let mut rng = Rng::default();
        let mut rook_table = Vec::with_capacity(ROOK_M_SIZE);
        let mut rook_magics = [MagicEntry::default(); 64];
        let mut bishop_table = Vec::with_capacity(BISHOP_M_SIZE);
        let mut bishop_magics = [MagicEntry::default(); 64];

        for sq in Square::iter() {
            let (entry, mut table) = find_magic(sq, R_DELTAS, &mut rng, rook_table.len());
            rook_magics[sq] = entry;
            rook_table.append(&mut table);

            let (entry, mut table) = find_magic(sq, B_DELTAS, &mut rng, bishop_table.len());
            bishop_magics[sq] = entry;
            bishop_table.append(&mut table);
        }

        assert_eq!(ROOK_M_SIZE, rook_table.len());
        assert_eq!(BISHOP_M_SIZE, bishop_table.len());

        Self { rook_table, rook_magics, bishop_table, bishop_magics }
    }
}

fn find_magic(sq: Square, deltas: [Direction; 4], rng: &mut Rng, offset: usize) -> (MagicEntry, Vec<Bitboard>) {
    let edges = ((RANK1 | RANK8) & !ranks_of(sq)) | ((FILE_A | FILE_H) & !files_of(sq));
    let mask = sliding_attack(deltas, sq, Bitboard::EMPTY) & !edges;
    let shift = 64 - mask.count_bits() as u8;
    loop {
        let entry = MagicEntry { mask, magic: rng.next_magic(), shift, offset };
        if let Some(table) = make_table(deltas, sq, &entry) {
            return (entry, table);
        }
    }
}

/// Tries to build a collision-free attack table for one magic candidate,
/// enumerating every blocker subset of the mask via the carry-rippler trick.
fn make_table(deltas: [Direction; 4], sq: Square, entry: &MagicEntry) -> Option<Vec<Bitboard>> {
    let idx_bits = 64 - entry.shift;
    let mut table = vec![Bitboard::EMPTY; 1 << idx_bits];
    let mut blockers = Bitboard::EMPTY;
    loop {
        let moves = sliding_attack(deltas, sq, blockers);
        let slot = &mut table[index(entry, blockers) - entry.offset];
        if *slot == Bitboard::EMPTY {
            *slot = moves;
        } else if *slot != moves {
            return None;
        }

        blockers.0 = blockers.0.wrapping_sub(entry.mask.0) & entry.mask.0;
        if blockers == Bitboard::EMPTY {
            break;
        }
    }
    Some(table)
}

/// Rays in all four deltas, stopping on (and including) the first occupied
/// square. The origin square is never part of the attack set.
fn sliding_attack(deltas: [Direction; 4], sq: Square, occupied: Bitboard) -> Bitboard {
    let mut attack = Bitboard::EMPTY;
    for dir in deltas {
        let mut s = sq;
        while let Some(next) = s.checked_shift(dir) {
            attack |= next.bitboard();
            if occupied.occupied(next) {
                break;
            }
            s = next;
        }
    }
    attack
}

fn ranks_of(sq: Square) -> Bitboard {
    Bitboard(0xFFu64 << (8 * sq.rank()))
}

fn files_of(sq: Square) -> Bitboard {
    Bitboard(FILE_A.0 << sq.file())
}
