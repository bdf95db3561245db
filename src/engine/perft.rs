use crate::{board::board::Board, moves::movegenerator::MoveGenerationType};

/// Counts leaf nodes of the legal move tree, the standard cross-check for
/// move generation and move application.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = board.generate_moves(MoveGenerationType::All);
    let mut total = 0;
    for i in 0..moves.len() {
        let m = moves[i];
        let undo = board.make_move(m);
        if !board.in_check(!board.stm) {
            total += perft(board, depth - 1);
        }
        board.undo_move(m, &undo);
    }
    total
}

/// Perft with a per-root-move breakdown, printed the way most engines answer
/// `go perft`, which makes divergence hunts against a reference engine quick.
pub fn split_perft(board: &mut Board, depth: u32) -> u64 {
    let moves = board.generate_moves(MoveGenerationType::All);
    let mut total = 0;
    for i in 0..moves.len() {
        let m = moves[i];
        let undo = board.make_move(m);
        if !board.in_check(!board.stm) {
            let count = perft(board, depth - 1);
            println!("{}: {count}", m.to_lan());
            total += count;
        }
        board.undo_move(m, &undo);
    }
    println!("\nNodes searched: {total}");
    total
}
