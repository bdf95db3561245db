use crate::{
    board::board::Board,
    moves::{
        movelist::MoveList,
        moves::{Move, MoveType, Promotion},
    },
    types::pieces::PieceName,
};

const TABLE_MOVE_BONUS: i32 = 16384;
const QUIET_KILLER_BONUS: i32 = 256;
const NOISY_KILLER_BONUS: i32 = 32;

/// Scores a move list for the lazy selection sort. The hash move towers over
/// everything, killers beat ordinary quiets unless a capture looks juicy,
/// and captures sort by most-valuable-victim, least-valuable-attacker.
pub fn score_moves(
    board: &Board,
    moves: &mut MoveList,
    table_move: Move,
    killers: &[Move; 2],
    killer_captures: &[Move; 2],
) {
    for entry in moves.arr.iter_mut() {
        let m = entry.m;
        let mut value = TABLE_MOVE_BONUS * i32::from(m == table_move);

        value += QUIET_KILLER_BONUS * i32::from(m == killers[0]);
        value += QUIET_KILLER_BONUS * i32::from(m == killers[1]);
        value += NOISY_KILLER_BONUS * i32::from(m == killer_captures[0]);
        value += NOISY_KILLER_BONUS * i32::from(m == killer_captures[1]);

        value += 5 * board.piece_at(m.to()).value();
        value -= board.piece_at(m.from()).value();

        if m.move_type() == MoveType::EnPassant {
            value += 2 * PieceName::Pawn.value();
        }
        if m.promotion() == Some(Promotion::Queen) {
            value += PieceName::Queen.value();
        }

        entry.score = value;
    }
}

#[cfg(test)]
mod ordering_tests {
    use crate::board::fen::build_board;
    use crate::moves::movegenerator::MoveGenerationType;

    use super::*;

    const NO_KILLERS: [Move; 2] = [Move::NONE; 2];

    #[test]
    fn test_table_move_first() {
        let board = build_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let mut moves = board.generate_moves(MoveGenerationType::All);
        let table_move = moves[7];
        score_moves(&board, &mut moves, table_move, &NO_KILLERS, &NO_KILLERS);
        assert_eq!(moves.pick_move(0).m, table_move);
    }

    #[test]
    fn test_capture_ordering_prefers_big_victims() {
        // Pawn can take the queen or the knight
        let board = build_board("4k3/8/8/1q1n4/2P5/8/8/4K3 w - - 0 1");
        let mut moves = board.generate_moves(MoveGenerationType::NoisyOnly);
        score_moves(&board, &mut moves, Move::NONE, &NO_KILLERS, &NO_KILLERS);
        let first = moves.pick_move(0).m;
        assert_eq!(first.to_lan(), "c4b5");
    }

    #[test]
    fn test_killer_beats_plain_quiet() {
        let board = build_board("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let mut moves = board.generate_moves(MoveGenerationType::All);
        let killer = moves[13];
        let killers = [killer, Move::NONE];
        score_moves(&board, &mut moves, Move::NONE, &killers, &NO_KILLERS);
        assert_eq!(moves.pick_move(0).m, killer);
    }
}
