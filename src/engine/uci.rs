use std::io;
use std::time::Duration;

use itertools::Itertools;

use crate::{
    board::{
        board::Board,
        fen::{self, build_board, parse_fen_from_buffer},
    },
    moves::moves::from_lan,
    search::search::get_best_move,
};

use super::perft::split_perft;

/// Stand-in budget for `go infinite` and malformed time controls
const EFFECTIVELY_FOREVER: Duration = Duration::from_secs(3600);

/// Rough share of the remaining clock to spend on one move
const CLOCK_DIVISOR: u64 = 30;

/// Blocking UCI loop. One command per line; unknown commands are reported
/// rather than silently eaten.
pub fn main_loop() {
    let mut board = build_board(fen::STARTING_FEN);
    let mut buffer = String::new();

    loop {
        buffer.clear();
        match io::stdin().read_line(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(_) => (),
        }
        let line = buffer.trim();

        if line == "uci" {
            println!("id name Cinder");
            println!("id author the Cinder authors");
            println!("uciok");
        } else if line == "isready" {
            println!("readyok");
        } else if line == "ucinewgame" {
            board = build_board(fen::STARTING_FEN);
        } else if line.starts_with("position") {
            parse_position(&mut board, line);
        } else if line.starts_with("go") {
            parse_go(&mut board, line);
        } else if line == "d" {
            println!("{board}");
        } else if line == "quit" || line == "stop" {
            break;
        } else if !line.is_empty() {
            println!("Command not handled: {line}");
        }
    }
}

fn parse_position(board: &mut Board, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if tokens.get(1) == Some(&"fen") {
        *board = build_board(&parse_fen_from_buffer(&tokens));
    } else {
        *board = build_board(fen::STARTING_FEN);
    }

    if let Some(idx) = tokens.iter().position(|&t| t == "moves") {
        for str in &tokens[idx + 1..] {
            let m = from_lan(str, board);
            board.make_move(m);
        }
    }
}

fn parse_go(board: &mut Board, line: &str) {
    if line.contains("perft") {
        let depth = line.split_whitespace().last().and_then(|d| d.parse().ok()).unwrap_or(1);
        split_perft(board, depth);
        return;
    }

    let budget = parse_time_controls(board, line);
    let m = get_best_move(board, budget, true);
    println!("bestmove {}", m.to_lan());
}

/// Maps UCI time controls onto a single wall-clock budget: `movetime` is
/// taken literally, a running clock gets a slice of the remainder plus the
/// increment.
fn parse_time_controls(board: &Board, line: &str) -> Duration {
    let mut time_left = [0u64; 2];
    let mut increment = [0u64; 2];

    for (key, value) in line.split_whitespace().skip(1).tuples() {
        let value: u64 = value.parse().unwrap_or(0);
        match key {
            "movetime" => return Duration::from_millis(value),
            "wtime" => time_left[0] = value,
            "btime" => time_left[1] = value,
            "winc" => increment[0] = value,
            "binc" => increment[1] = value,
            _ => (),
        }
    }

    let side = board.stm.idx();
    if time_left[side] > 0 {
        Duration::from_millis(time_left[side] / CLOCK_DIVISOR + increment[side])
    } else {
        EFFECTIVELY_FOREVER
    }
}

#[cfg(test)]
mod uci_tests {
    use crate::types::{pieces::Color, square::Square};

    use super::*;

    #[test]
    fn test_parse_position_startpos_with_moves() {
        let mut board = build_board(fen::STARTING_FEN);
        parse_position(&mut board, "position startpos moves e2e4 e7e5 g1f3");
        assert_eq!(board.stm, Color::Black);
        assert_eq!(board.hash_history.len(), 3);
        assert_eq!(board.zobrist_hash, board.generate_hash());
    }

    #[test]
    fn test_parse_position_fen() {
        let mut board = build_board(fen::STARTING_FEN);
        parse_position(&mut board, "position fen 4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1 moves e5d6");
        assert_eq!(board.stm, Color::Black);
        // The en passant capture removed the d5 pawn
        assert_eq!(board.occupancies().count_bits(), 3);
        assert!(board.occupancies().occupied(Square(43)));
    }

    #[test]
    fn test_movetime_budget() {
        let board = build_board(fen::STARTING_FEN);
        let budget = parse_time_controls(&board, "go movetime 2500");
        assert_eq!(budget, Duration::from_millis(2500));
    }

    #[test]
    fn test_clock_allocation_uses_own_clock() {
        let mut board = build_board(fen::STARTING_FEN);
        let budget = parse_time_controls(&board, "go wtime 60000 btime 1000 winc 100 binc 0");
        assert_eq!(budget, Duration::from_millis(60000 / CLOCK_DIVISOR + 100));

        board.stm = Color::Black;
        let budget = parse_time_controls(&board, "go wtime 60000 btime 30000 winc 0 binc 0");
        assert_eq!(budget, Duration::from_millis(30000 / CLOCK_DIVISOR));
    }

    #[test]
    fn test_infinite_budget_fallback() {
        let board = build_board(fen::STARTING_FEN);
        assert_eq!(parse_time_controls(&board, "go infinite"), EFFECTIVELY_FOREVER);
    }
}
