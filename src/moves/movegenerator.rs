use crate::{
    board::board::Board,
    types::{
        bitboard::Bitboard,
        pieces::{Color, PieceName},
        square::Square,
    },
};

use strum::IntoEnumIterator;

use super::{
    attack_boards::{king_attacks, knight_attacks, pawn_attacks, RANK2, RANK3, RANK6, RANK7},
    magics::{bishop_attacks, queen_attacks, rook_attacks},
    movelist::MoveList,
    moves::{Castle, Direction, Move, Promotion},
};

#[derive(Copy, Clone, PartialEq, Eq)]
pub enum MoveGenerationType {
    /// Captures, promotions and en passant only
    NoisyOnly,
    All,
}

impl Board {
    /// Generates pseudolegal moves. Whether a move leaves its own king in
    /// check is settled by whoever applies it.
    pub fn generate_moves(&self, gen_type: MoveGenerationType) -> MoveList {
        let mut moves = MoveList::default();

        self.generate_bitboard_moves(PieceName::Knight, gen_type, &mut moves);
        self.generate_bitboard_moves(PieceName::King, gen_type, &mut moves);
        self.generate_bitboard_moves(PieceName::Queen, gen_type, &mut moves);
        self.generate_bitboard_moves(PieceName::Rook, gen_type, &mut moves);
        self.generate_bitboard_moves(PieceName::Bishop, gen_type, &mut moves);
        self.generate_pawn_moves(gen_type, &mut moves);
        if gen_type == MoveGenerationType::All {
            self.generate_castling_moves(&mut moves);
        }
        moves
    }

    fn generate_bitboard_moves(&self, piece_name: PieceName, gen_type: MoveGenerationType, moves: &mut MoveList) {
        for sq in self.bitboard(self.stm, piece_name) {
            let occupancies = self.occupancies();
            let attacks = match piece_name {
                PieceName::King => king_attacks(sq),
                PieceName::Queen => queen_attacks(sq, occupancies),
                PieceName::Rook => rook_attacks(sq, occupancies),
                PieceName::Bishop => bishop_attacks(sq, occupancies),
                PieceName::Knight => knight_attacks(sq),
                PieceName::Pawn => unreachable!("pawns are generated separately"),
            };
            let targets = match gen_type {
                MoveGenerationType::NoisyOnly => attacks & self.color(!self.stm),
                MoveGenerationType::All => attacks & !self.color(self.stm),
            };
            for dest in targets {
                moves.push(Move::new(sq, dest));
            }
        }
    }

    fn generate_pawn_moves(&self, gen_type: MoveGenerationType, moves: &mut MoveList) {
        let pawns = self.bitboard(self.stm, PieceName::Pawn);
        let vacancies = !self.occupancies();
        let enemies = self.color(!self.stm);

        let (promo_rank, double_push_landing) = match self.stm {
            Color::White => (RANK7, RANK3),
            Color::Black => (RANK2, RANK6),
        };
        let non_promotions = pawns & !promo_rank;
        let promotions = pawns & promo_rank;

        let up = match self.stm {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        };
        let (up_left, up_right) = match self.stm {
            Color::White => (Direction::NorthWest, Direction::NorthEast),
            Color::Black => (Direction::SouthEast, Direction::SouthWest),
        };
        let down = up.opp();

        if gen_type == MoveGenerationType::All {
            // Single and double pushes
            let push_one = vacancies & non_promotions.shift(up);
            let push_two = vacancies & (push_one & double_push_landing).shift(up);
            for dest in push_one {
                moves.push(Move::new(dest.shift(down), dest));
            }
            for dest in push_two {
                moves.push(Move::new(dest.shift(down).shift(down), dest));
            }
        }

        // Promotions count as noisy whichever way they arise
        if promotions != Bitboard::EMPTY {
            let push_promotions = promotions.shift(up) & vacancies;
            let left_capture_promotions = promotions.shift(up_left) & enemies;
            let right_capture_promotions = promotions.shift(up_right) & enemies;
            for dest in push_promotions {
                gen_promotions(dest.shift(down), dest, moves);
            }
            for dest in left_capture_promotions {
                gen_promotions(dest.shift(up_left.opp()), dest, moves);
            }
            for dest in right_capture_promotions {
                gen_promotions(dest.shift(up_right.opp()), dest, moves);
            }
        }

        // Captures that do not promote
        if non_promotions != Bitboard::EMPTY {
            let left_captures = non_promotions.shift(up_left) & enemies;
            let right_captures = non_promotions.shift(up_right) & enemies;
            for dest in left_captures {
                moves.push(Move::new(dest.shift(up_left.opp()), dest));
            }
            for dest in right_captures {
                moves.push(Move::new(dest.shift(up_right.opp()), dest));
            }
        }

        if let Some(dest) = self.en_passant_square {
            for src in pawn_attacks(dest, !self.stm) & pawns {
                moves.push(Move::new_en_passant(src, dest));
            }
        }
    }

    fn generate_castling_moves(&self, moves: &mut MoveList) {
        if self.stm == Color::White {
            if self.can_castle(Castle::WhiteKing)
                && self.occupancies().empty(Square(5))
                && self.occupancies().empty(Square(6))
                && !self.square_under_attack(Color::Black, Square(4))
                && !self.square_under_attack(Color::Black, Square(5))
                && !self.square_under_attack(Color::Black, Square(6))
            {
                moves.push(Move::new_castle(Square(4), Square(6)));
            }

            if self.can_castle(Castle::WhiteQueen)
                && self.occupancies().empty(Square(1))
                && self.occupancies().empty(Square(2))
                && self.occupancies().empty(Square(3))
                && !self.square_under_attack(Color::Black, Square(2))
                && !self.square_under_attack(Color::Black, Square(3))
                && !self.square_under_attack(Color::Black, Square(4))
            {
                moves.push(Move::new_castle(Square(4), Square(2)));
            }
        } else {
            if self.can_castle(Castle::BlackKing)
                && self.occupancies().empty(Square(61))
                && self.occupancies().empty(Square(62))
                && !self.square_under_attack(Color::White, Square(60))
                && !self.square_under_attack(Color::White, Square(61))
                && !self.square_under_attack(Color::White, Square(62))
            {
                moves.push(Move::new_castle(Square(60), Square(62)));
            }

            if self.can_castle(Castle::BlackQueen)
                && self.occupancies().empty(Square(57))
                && self.occupancies().empty(Square(58))
                && self.occupancies().empty(Square(59))
                && !self.square_under_attack(Color::White, Square(58))
                && !self.square_under_attack(Color::White, Square(59))
                && !self.square_under_attack(Color::White, Square(60))
            {
                moves.push(Move::new_castle(Square(60), Square(58)));
            }
        }
    }
}

fn gen_promotions(src: Square, dest: Square, moves: &mut MoveList) {
    for promotion in Promotion::iter() {
        moves.push(Move::new_promotion(src, dest, promotion));
    }
}

#[cfg(test)]
mod movegen_tests {
    use crate::board::fen::{build_board, STARTING_FEN};

    use super::*;

    #[test]
    fn test_starting_position_move_count() {
        let board = build_board(STARTING_FEN);
        assert_eq!(board.generate_moves(MoveGenerationType::All).len(), 20);
        assert!(board.generate_moves(MoveGenerationType::NoisyOnly).is_empty());
    }

    #[test]
    fn test_noisy_only_finds_captures() {
        let board = build_board("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1");
        let noisy = board.generate_moves(MoveGenerationType::NoisyOnly);
        assert_eq!(noisy.len(), 1);
        assert_eq!(noisy[0].to_lan(), "e4d5");
    }

    #[test]
    fn test_en_passant_generation() {
        let board = build_board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1");
        let noisy = board.generate_moves(MoveGenerationType::NoisyOnly);
        assert!((0..noisy.len()).any(|i| noisy[i].to_lan() == "e5d6" && noisy[i].is_en_passant()));
    }

    #[test]
    fn test_promotion_generation() {
        let board = build_board("8/5P2/8/8/8/7k/8/6K1 w - - 0 1");
        let moves = board.generate_moves(MoveGenerationType::All);
        let promos = (0..moves.len()).filter(|&i| moves.get(i).m.promotion().is_some()).count();
        assert_eq!(promos, 4);
    }

    #[test]
    fn test_castling_blocked_through_check() {
        // Rook on e8 pins the castle path
        let board = build_board("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = board.generate_moves(MoveGenerationType::All);
        assert!(!(0..moves.len()).any(|i| moves.get(i).m.is_castle()));
    }

    #[test]
    fn test_castling_both_sides() {
        let board = build_board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let moves = board.generate_moves(MoveGenerationType::All);
        let castles: Vec<String> =
            (0..moves.len()).filter(|&i| moves.get(i).m.is_castle()).map(|i| moves.get(i).m.to_lan()).collect();
        assert!(castles.contains(&"e1g1".to_string()));
        assert!(castles.contains(&"e1c1".to_string()));
    }
}
