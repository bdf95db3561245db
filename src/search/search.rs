use std::time::Duration;

use crate::{
    board::board::Board,
    engine::transposition::EntryFlag,
    eval::evaluate,
    moves::{
        movegenerator::MoveGenerationType,
        movelist::MoveList,
        moves::{Move, MoveType, Promotion},
    },
    types::pieces::{Piece, PieceName},
};

use arrayvec::ArrayVec;

use super::{
    ordering::score_moves, quiescence::quiescence, NodeType, SearchContext, MATE, MAX_DEPTH,
    USE_FUTILITY_PRUNING, USE_INTERNAL_ITERATIVE_DEEPENING, USE_LATE_MOVE_REDUCTIONS,
    USE_NULL_MOVE_PRUNING, USE_RAZOR_PRUNING, USE_TRANSPOSITION_TABLE,
};

/// History success rate below which a late quiet move is worth reducing,
/// scaled like the history ratio itself (9830 / 16384 is roughly 60%)
const LMR_RATIO_LIMIT: u32 = 9830;

/// Root move list: the generated moves, the score each earned at the last
/// finished depth, and the best move seen so far.
pub struct RootMoveList {
    pub list: MoveList,
    pub best_move: Move,
}

impl RootMoveList {
    pub fn new(board: &Board) -> Self {
        Self { list: board.generate_moves(MoveGenerationType::All), best_move: Move::NONE }
    }
}

/// Picks a move for the side to move under a wall-clock budget, deepening
/// one ply at a time. Each finished depth re-sorts the root list, so the
/// next, deeper pass looks at the most promising moves first.
pub fn get_best_move(board: &mut Board, budget: Duration, logging: bool) -> Move {
    let mut ctx = SearchContext::new(board.stm, budget);
    let mut root_moves = RootMoveList::new(board);

    log::debug!(
        "search start: {:?} to move, budget {budget:?}, {} root moves",
        board.stm,
        root_moves.list.len()
    );

    if !logging {
        println!("{board}");
        println!("|  Depth  |  Score  |   Nodes   | Elapsed | Best |");
    }

    for depth in 1..MAX_DEPTH {
        let value = root_search(&mut ctx, board, &mut root_moves, depth);

        let elapsed = ctx.start.elapsed();
        let cp = 100 * value / PieceName::Pawn.value();
        if logging {
            println!(
                "info depth {depth} score cp {cp} time {} nodes {} pv {}",
                elapsed.as_millis(),
                ctx.total_nodes,
                root_moves.best_move.to_lan()
            );
        } else {
            println!(
                "|{:9}|{:9}|{:11}|{:9}| {} |",
                depth,
                cp,
                ctx.total_nodes,
                elapsed.as_secs(),
                root_moves.best_move.to_lan()
            );
        }

        // The next iteration costs a multiple of everything spent so far;
        // do not start what cannot finish
        if elapsed * 4 > budget {
            break;
        }
    }

    if !logging {
        println!("{}", ctx.stats);
    }

    root_moves.best_move
}

/// Searches every root move with the full window. Nothing prunes here and no
/// memoized score cuts the node off: each move gets a real score so the list
/// re-sorts honestly for the next iteration.
pub fn root_search(ctx: &mut SearchContext, board: &mut Board, root_moves: &mut RootMoveList, depth: i32) -> i32 {
    let mut alpha = -2 * MATE;
    let beta = 2 * MATE;
    let mut best = -2 * MATE;
    let mut valid = 0;

    for i in 0..root_moves.list.len() {
        let m = root_moves.list[i];
        let nodes_before = ctx.total_nodes;

        let undo = board.make_move(m);
        if board.in_check(!board.stm) {
            board.undo_move(m, &undo);
            // Sinks below every real score so the sort buries it
            root_moves.list.set_score(i, -6 * MATE);
            continue;
        }
        valid += 1;

        let value = if valid == 1 {
            -alpha_beta(ctx, board, -beta, -alpha, depth - 1, 1, NodeType::Pv)
        } else {
            let value = -alpha_beta(ctx, board, -alpha - 1, -alpha, depth - 1, 1, NodeType::Cut);
            if value > alpha {
                -alpha_beta(ctx, board, -beta, -alpha, depth - 1, 1, NodeType::Pv)
            } else {
                value
            }
        };

        board.undo_move(m, &undo);

        if value <= alpha {
            // Failed low; rank losers by how much work refuting them took
            root_moves.list.set_score(i, -(1 << 28) + (ctx.total_nodes - nodes_before) as i32);
        } else if value >= beta {
            root_moves.list.set_score(i, beta);
        } else {
            root_moves.list.set_score(i, value);
        }

        if value > best {
            best = value;
            root_moves.best_move = m;
            if value > alpha {
                alpha = value;
            }
        }

        if alpha >= beta {
            break;
        }
    }

    root_moves.list.sort_by_score();
    best
}

#[allow(clippy::too_many_arguments)]
pub fn alpha_beta(
    ctx: &mut SearchContext,
    board: &mut Board,
    mut alpha: i32,
    mut beta: i32,
    depth: i32,
    height: usize,
    node_type: NodeType,
) -> i32 {
    // Out of time: feed back the worst case for whoever we answer to, so a
    // truncated branch can never masquerade as a good one
    if ctx.out_of_time() {
        return if board.stm == ctx.evaluating_player { -MATE } else { MATE };
    }

    // Third visit of this position with the same side to move is a draw.
    // Only every other history slot can match, hence the stride.
    let repetitions =
        board.hash_history.iter().rev().skip(1).step_by(2).filter(|&&h| h == board.zobrist_hash).count();
    if repetitions >= 2 {
        return 0;
    }

    if depth <= 0 {
        return quiescence(ctx, board, alpha, beta, height);
    }

    ctx.total_nodes += 1;
    ctx.stats.total_nodes += 1;

    let mut table_move = Move::NONE;
    let mut old_alpha = alpha;

    if let Some(entry) = ctx.tt.probe(board.zobrist_hash) {
        table_move = entry.best_move();

        if USE_TRANSPOSITION_TABLE && entry.depth() >= depth && node_type != NodeType::Pv {
            let value = entry.value();
            match entry.flag() {
                EntryFlag::Exact => return value,
                EntryFlag::LowerBound => alpha = alpha.max(value),
                EntryFlag::UpperBound => beta = beta.min(value),
                EntryFlag::None => unreachable!(),
            }
            if alpha >= beta {
                return value;
            }
            // The store at the bottom classifies against the tightened bound
            old_alpha = alpha;
        }
    }

    // A whole knight below beta and the quiet lines already failing: settle
    // it tactically instead of searching on
    if USE_RAZOR_PRUNING
        && depth <= 3
        && node_type != NodeType::Pv
        && evaluate(board) + PieceName::Knight.value() < beta
    {
        let value = quiescence(ctx, board, alpha, beta, height);
        if value < beta {
            return value;
        }
    }

    // Hand the opponent a free shot; if they still cannot reach beta at
    // reduced depth, the real reply will not either
    if USE_NULL_MOVE_PRUNING
        && depth >= 3
        && node_type != NodeType::Pv
        && board.has_non_pawns(board.stm)
        && !board.in_check(board.stm)
        && evaluate(board) >= beta
    {
        let nodes_before = ctx.stats.total_nodes;

        let prev_ep = board.make_null_move();
        let value = -alpha_beta(ctx, board, -beta, -beta + 1, depth - 4, height + 1, NodeType::Cut);
        board.undo_null_move(prev_ep);

        if value >= beta {
            ctx.stats.success_nm += 1;
            return value;
        }
        ctx.stats.failed_nm += 1;
        ctx.stats.wasted_nm += ctx.stats.total_nodes - nodes_before;
    }

    // No hash move to lead the ordering at a PV node: a shallower pass here
    // plants one in the table
    if USE_INTERNAL_ITERATIVE_DEEPENING && depth >= 3 && table_move == Move::NONE && node_type == NodeType::Pv {
        if alpha_beta(ctx, board, alpha, beta, depth - 3, height, NodeType::Pv) <= alpha {
            alpha_beta(ctx, board, -MATE, beta, depth - 3, height, NodeType::Pv);
        }
        if let Some(entry) = ctx.tt.probe(board.zobrist_hash) {
            table_move = entry.best_move();
        }
    }

    let mut moves = board.generate_moves(MoveGenerationType::All);
    score_moves(board, &mut moves, table_move, &ctx.killer_moves[height], &ctx.killer_captures[height]);

    let in_check = board.in_check(board.stm);

    let mut played: ArrayVec<Move, 256> = ArrayVec::new();
    let mut best = -2 * MATE;
    let mut best_move = Move::NONE;
    let mut valid = 0;
    let mut optimal_value = -MATE;

    for i in 0..moves.len() {
        let current_move = moves.pick_move(i).m;

        // At the frontier a quiet move cannot gain more than a pawn over
        // the static score; skip it when even that cannot reach alpha
        if USE_FUTILITY_PRUNING
            && node_type != NodeType::Pv
            && valid >= 1
            && depth == 1
            && !in_check
            && current_move.move_type() == MoveType::Normal
            && board.piece_at(current_move.to()) == Piece::None
        {
            if optimal_value == -MATE {
                optimal_value = evaluate(board) + PieceName::Pawn.value();
            }
            if optimal_value <= alpha {
                continue;
            }
        }

        let undo = board.make_move(current_move);
        if board.in_check(!board.stm) {
            board.undo_move(current_move, &undo);
            continue;
        }

        played.push(current_move);
        valid += 1;

        // Late quiet moves with an unconvincing track record get one ply
        // less, as long as neither king is in danger
        let reduced = USE_LATE_MOVE_REDUCTIONS
            && ctx.history.ratio(current_move) < LMR_RATIO_LIMIT
            && valid >= 5
            && depth >= 3
            && !in_check
            && node_type != NodeType::Pv
            && ((current_move.move_type() == MoveType::Normal && undo.capture == Piece::None)
                || (current_move.move_type() == MoveType::Promotion
                    && current_move.promotion() != Some(Promotion::Queen)))
            && !board.in_check(board.stm);
        let new_depth = if reduced { depth - 2 } else { depth - 1 };

        let nodes_before = ctx.stats.total_nodes;
        let mut value;

        if valid == 1 || node_type != NodeType::Pv {
            value = -alpha_beta(ctx, board, -beta, -alpha, new_depth, height + 1, node_type);

            // Raised alpha on a reduced depth: the reduction is suspect,
            // pay for the full-depth verification
            if value > alpha && reduced {
                ctx.stats.failed_lmr += 1;
                ctx.stats.wasted_lmr += ctx.stats.total_nodes - nodes_before;
                value = -alpha_beta(ctx, board, -beta, -alpha, depth - 1, height + 1, node_type);
            } else if reduced {
                ctx.stats.success_lmr += 1;
            }
        } else {
            value = -alpha_beta(ctx, board, -alpha - 1, -alpha, new_depth, height + 1, NodeType::Cut);

            if value > alpha {
                if reduced {
                    ctx.stats.failed_lmr += 1;
                    ctx.stats.wasted_lmr += ctx.stats.total_nodes - nodes_before;
                }
                value = -alpha_beta(ctx, board, -beta, -alpha, depth - 1, height + 1, NodeType::Pv);
            } else if reduced {
                ctx.stats.success_lmr += 1;
            }
        }

        board.undo_move(current_move, &undo);

        if value > best {
            best = value;
            best_move = current_move;
            if value > alpha {
                alpha = value;
            }
        }

        if alpha >= beta {
            if undo.capture == Piece::None {
                ctx.push_killer_move(height, current_move);
            } else {
                ctx.push_killer_capture(height, current_move);
            }
            break;
        }
    }

    if valid == 0 {
        // Mate scores lose a point per ply so nearer mates win comparisons
        return if in_check { -MATE + height as i32 } else { 0 };
    }

    if best >= beta && best_move != Move::NONE {
        ctx.history.update(best_move, &played);
    }

    // Never memoize a deadline-truncated score
    if !ctx.out_of_time() {
        let flag = if best > old_alpha && best < beta {
            EntryFlag::Exact
        } else if best >= beta {
            EntryFlag::LowerBound
        } else {
            EntryFlag::UpperBound
        };
        ctx.tt.store(board.zobrist_hash, depth, flag, best, best_move);
    }

    best
}

#[cfg(test)]
mod search_tests {
    use std::time::Duration;

    use crate::board::fen::{build_board, STARTING_FEN};
    use crate::moves::moves::from_lan;

    use super::*;

    fn fixed_depth_search(fen: &str, depth: i32) -> (SearchContext, RootMoveList, i32) {
        let mut board = build_board(fen);
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let mut root_moves = RootMoveList::new(&board);
        let value = root_search(&mut ctx, &mut board, &mut root_moves, depth);
        (ctx, root_moves, value)
    }

    #[test]
    fn test_finds_back_rank_mate() {
        let (_, root_moves, value) = fixed_depth_search("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1", 2);
        assert_eq!(root_moves.best_move.to_lan(), "a1a8");
        assert!(value >= MATE - 2);
    }

    #[test]
    fn test_checkmated_position_scores_mate_at_root() {
        let mut board =
            build_board("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4");
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let value = alpha_beta(&mut ctx, &mut board, -2 * MATE, 2 * MATE, 3, 0, NodeType::Pv);
        assert_eq!(value, -MATE);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let mut board = build_board("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let value = alpha_beta(&mut ctx, &mut board, -2 * MATE, 2 * MATE, 4, 0, NodeType::Pv);
        assert_eq!(value, 0);
    }

    #[test]
    fn test_repetition_scores_zero() {
        let mut board = build_board(STARTING_FEN);
        // Same position, same side to move, already seen twice. The scan
        // starts two slots back, so matches sit at even indices here.
        board.hash_history = vec![board.zobrist_hash, 0, board.zobrist_hash, 0];
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let value = alpha_beta(&mut ctx, &mut board, -2 * MATE, 2 * MATE, 4, 2, NodeType::Pv);
        assert_eq!(value, 0);
    }

    #[test]
    fn test_avoids_repetition_when_winning() {
        let fen = "6k1/8/8/8/8/8/R7/6K1 w - - 0 1";
        let mut board = build_board(fen);
        let repeating = from_lan("a2b2", &board);

        // Seed the history so the position after Rb2 reads as seen twice
        let undo = board.make_move(repeating);
        let child_hash = board.zobrist_hash;
        board.undo_move(repeating, &undo);
        board.hash_history = vec![0, child_hash, 0, child_hash];

        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let mut root_moves = RootMoveList::new(&board);
        let value = root_search(&mut ctx, &mut board, &mut root_moves, 3);

        assert_ne!(root_moves.best_move, repeating);
        assert!(value > 300, "a rook up should not settle for the draw, got {value}");
    }

    #[test]
    fn test_quiescence_resolves_hanging_pawn() {
        let (_, root_moves, value) = fixed_depth_search("4k3/8/8/3p4/4P3/8/8/4K3 w - - 0 1", 1);
        assert_eq!(root_moves.best_move.to_lan(), "e4d5");
        assert!((50..300).contains(&value), "expected roughly a pawn, got {value}");
    }

    #[test]
    fn test_no_null_move_in_pawn_endings() {
        let (ctx, _, _) = fixed_depth_search("8/8/8/4k3/8/4P3/4K3/8 w - - 0 1", 4);
        assert_eq!(ctx.stats.success_nm + ctx.stats.failed_nm, 0);
    }

    #[test]
    fn test_search_leaves_board_untouched() {
        let mut board = build_board("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4");
        let before = board.clone();
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let mut root_moves = RootMoveList::new(&board);
        root_search(&mut ctx, &mut board, &mut root_moves, 4);
        assert_eq!(board, before);
    }

    #[test]
    fn test_expired_clock_returns_worst_case() {
        let mut board = build_board(STARTING_FEN);
        let mut ctx = SearchContext::new(board.stm, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let value = alpha_beta(&mut ctx, &mut board, -2 * MATE, 2 * MATE, 5, 1, NodeType::Pv);
        assert_eq!(value, -MATE);
        assert_eq!(ctx.total_nodes, 0);
    }

    #[test]
    fn test_depth_zero_delegates_to_quiescence() {
        let mut board = build_board("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let value = alpha_beta(&mut ctx, &mut board, -2 * MATE, 2 * MATE, 0, 1, NodeType::Pv);
        // No captures to try: the stand-pat score comes straight back and
        // only the quiescence node was counted
        assert_eq!(value, crate::eval::evaluate(&board));
        assert_eq!(ctx.total_nodes, 1);
    }

    #[test]
    fn test_driver_returns_a_legal_move() {
        let mut board = build_board(STARTING_FEN);
        let m = get_best_move(&mut board, Duration::from_millis(100), true);
        assert_ne!(m, Move::NONE);
        let legal = board.generate_moves(MoveGenerationType::All);
        assert!((0..legal.len()).any(|i| legal[i] == m));
    }

    #[test]
    fn test_deeper_search_still_finds_mate_through_table() {
        // Mate in 2: depth 4 must keep reporting the forced win
        let (_, root_moves, value) = fixed_depth_search("6k1/5ppp/8/8/8/8/8/R6K w - - 0 1", 4);
        assert_eq!(root_moves.best_move.to_lan(), "a1a8");
        assert!(value >= MATE - 2);
    }
}
