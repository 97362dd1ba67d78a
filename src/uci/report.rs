use crate::board::Move;

use super::format_uci_move;

pub fn print_ready() {
    println!("readyok");
}

pub fn print_bestmove(best_move: Option<Move>) {
    print_bestmove_with_ponder(best_move, None);
}

pub fn print_bestmove_with_ponder(best_move: Option<Move>, ponder_move: Option<Move>) {
    match best_move {
        Some(best_move) => {
            let uci_move = format_uci_move(&best_move);
            match ponder_move {
                Some(p) => println!("bestmove {} ponder {}", uci_move, format_uci_move(&p)),
                None => println!("bestmove {}", uci_move),
            }
        }
        None => println!("bestmove (none)"),
    }
}
