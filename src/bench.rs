use std::time::{Duration, Instant};

use crate::board::fen::build_board;
use crate::search::search::{root_search, RootMoveList};
use crate::search::SearchContext;

const BENCH_DEPTH: i32 = 6;

/// A short spread of openings, middlegames and endings. Fixed depth keeps
/// the node counts comparable across runs and machines.
const BENCH_POSITIONS: [&str; 6] = [
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r2q1rk1/ppp2ppp/3bbn2/3p4/8/1P1P2P1/PBPN1PBP/R2Q1RK1 b - - 3 10",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "8/8/1p6/p1p5/P1P5/1P2k3/4K3/8 w - - 0 1",
];

pub fn bench() {
    let start = Instant::now();
    let mut total_nodes = 0;

    for fen in BENCH_POSITIONS {
        let mut board = build_board(fen);
        let mut ctx = SearchContext::new(board.stm, Duration::from_secs(3600));
        let mut root_moves = RootMoveList::new(&board);
        for depth in 1..=BENCH_DEPTH {
            root_search(&mut ctx, &mut board, &mut root_moves, depth);
        }
        total_nodes += ctx.total_nodes;
        println!("{fen}: best {} nodes {}", root_moves.best_move.to_lan(), ctx.total_nodes);
    }

    let elapsed = start.elapsed();
    let nps = (total_nodes as f64 / elapsed.as_secs_f64()) as u64;
    println!("\n{total_nodes} nodes {nps} nps");
}
