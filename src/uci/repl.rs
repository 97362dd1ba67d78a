//! The UCI main loop: reads commands from stdin, drives an
//! [`EngineController`], and writes UCI-formatted responses to stdout.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::board::{Board, PerftStats, SearchInfoCallback, SearchIterationInfo, Square};
use crate::engine::time::{build_search_request, TimeConfig, TimeControl};
use crate::engine::{EngineController, SearchParams};

use super::command::{parse_go_params, parse_uci_command, PerftMode, UciCommand};
use super::options::{parse_setoption, UciOptionAction, UciOptions};
use super::print::print_perft_info;
use super::report::print_ready;
use super::{debug_log, format_uci_move, parse_uci_move, try_parse_position_command};

const DEFAULT_HASH_MB: usize = 64;

/// Run the UCI loop to completion, returning the process exit code.
#[must_use]
pub fn run() -> i32 {
    let stdin = io::stdin();
    let mut controller = EngineController::new(DEFAULT_HASH_MB);
    let mut options = UciOptions::new(DEFAULT_HASH_MB);

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        debug_log::log_input(&line);

        let Some(command) = parse_uci_command(&line) else {
            continue;
        };

        if matches!(command, UciCommand::Quit) {
            controller.stop_search();
            break;
        }

        handle_command(&mut controller, &mut options, command);
    }

    0
}

fn send(line: &str) {
    println!("{line}");
    debug_log::log_output(line);
    let _ = io::stdout().flush();
}

fn handle_command(controller: &mut EngineController, options: &mut UciOptions, command: UciCommand) {
    match command {
        UciCommand::Uci => {
            let (params, nnue) = controller
                .with_search_state_ref(|s| (s.params().clone(), s.nnue_settings))
                .unwrap_or_default();
            options.print(&params, &nnue);
            // `UciOptions::print` writes directly via `println!`; mirror the
            // well-known final lines into the debug log for consistency.
            debug_log::log_output("uciok");
        }
        UciCommand::IsReady => {
            print_ready();
            debug_log::log_output("readyok");
        }
        UciCommand::UciNewGame => controller.new_game(),
        UciCommand::Position(parts) => {
            controller.stop_search();
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            if let Err(e) = try_parse_position_command(controller.board_mut(), &refs) {
                send(&format!("info string {e}"));
            }
        }
        UciCommand::Go(parts) => {
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            handle_go(controller, options, &refs);
        }
        UciCommand::Perft { depth, mode } => handle_perft(controller.board_mut(), depth, mode),
        UciCommand::SetOption(parts) => {
            let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
            handle_setoption(controller, options, &refs);
        }
        UciCommand::Debug(arg) => {
            let on = matches!(arg.as_deref(), Some("on"));
            controller.set_trace(on);
        }
        UciCommand::Display => handle_display(controller.board()),
        UciCommand::Stop => controller.stop_search(),
        UciCommand::PonderHit => controller.ponderhit(),
        UciCommand::Quit => unreachable!("handled in run()"),
        UciCommand::Unknown(line) => {
            send(&format!("info string unknown command: {line}"));
        }
    }
}

fn handle_setoption(controller: &mut EngineController, options: &mut UciOptions, parts: &[&str]) {
    let Some((name, value)) = parse_setoption(parts) else {
        send("info string malformed setoption command");
        return;
    };

    let action = controller
        .with_search_state(|state| options.apply_setoption(&name, value.as_deref(), state))
        .flatten();

    match action {
        Some(UciOptionAction::ReinitHash(mb)) => controller.resize_hash(mb),
        Some(UciOptionAction::SetThreads(n)) => controller.set_threads(n),
        Some(UciOptionAction::LoadNnue(path)) => {
            if let Err(e) = controller.load_nnue(&path) {
                send(&format!("info string failed to load NNUE network '{path}': {e}"));
            }
        }
        None => {}
    }
}

fn handle_go(controller: &mut EngineController, options: &UciOptions, parts: &[&str]) {
    let go = parse_go_params(parts);

    let has_time_info = go.movetime.is_some() || go.wtime.is_some() || go.btime.is_some();
    let infinite = go.infinite || !has_time_info;

    let time_control = if let Some(movetime) = go.movetime {
        TimeControl::move_time_ms(movetime)
    } else if has_time_info {
        let white_to_move = controller.board().white_to_move();
        let (time_left, inc) = if white_to_move {
            (go.wtime.unwrap_or(0), go.winc.unwrap_or(0))
        } else {
            (go.btime.unwrap_or(0), go.binc.unwrap_or(0))
        };
        TimeControl::Incremental {
            time_left_ms: time_left,
            inc_ms: inc,
            movestogo: go.movestogo,
        }
    } else {
        TimeControl::Infinite
    };

    // Best-effort: search to a depth proportional to the requested mate
    // distance when no explicit depth was given.
    let depth = go.depth.or(go.mate.map(|m| (m.saturating_mul(2) + 1).min(64)));

    let time_config = TimeConfig {
        move_overhead_ms: options.move_overhead_ms,
        soft_time_percent: options.soft_time_percent,
        hard_time_percent: options.hard_time_percent,
        default_max_nodes: options.default_max_nodes,
    };

    let (request, _) = build_search_request(
        time_control,
        depth,
        go.nodes,
        go.ponder,
        infinite,
        &time_config,
    );

    controller.set_max_nodes(request.max_nodes);

    let Some(tt) = controller.with_search_state_ref(|s| s.shared_tt()) else {
        return;
    };

    let callback: SearchInfoCallback = Arc::new(move |info: &SearchIterationInfo| {
        print_info_line(info, tt.hashfull_per_mille());
    });
    controller.set_info_callback(Some(callback));

    let search_moves = if go.search_moves.is_empty() {
        None
    } else {
        let board = controller.board_mut();
        let moves: Vec<_> = go
            .search_moves
            .iter()
            .filter_map(|uci| parse_uci_move(board, uci))
            .collect();
        if moves.is_empty() {
            None
        } else {
            Some(moves)
        }
    };

    let params = SearchParams {
        depth: request.depth,
        soft_time_ms: request.soft_time_ms,
        hard_time_ms: request.hard_time_ms,
        ponder: request.ponder,
        infinite: request.infinite,
        multi_pv: options.multi_pv,
        search_moves,
    };

    controller.start_search(params, |result| {
        let line = match result.best_move {
            Some(best) => match result.ponder_move {
                Some(p) => format!("bestmove {} ponder {}", format_uci_move(&best), format_uci_move(&p)),
                None => format!("bestmove {}", format_uci_move(&best)),
            },
            None => "bestmove (none)".to_string(),
        };
        send(&line);
    });
}

fn print_info_line(info: &SearchIterationInfo, hashfull: u32) {
    let score_str = match info.mate_in {
        Some(mate) => format!("mate {mate}"),
        None => format!("cp {}", info.score),
    };
    let line = format!(
        "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
        info.depth,
        info.seldepth,
        score_str,
        info.nodes,
        info.nps,
        hashfull,
        info.time_ms,
        info.pv
    );
    println!("{line}");
    debug_log::log_output(&line);
}

fn handle_perft(board: &mut Board, depth: usize, mode: PerftMode) {
    let start = std::time::Instant::now();
    match mode {
        PerftMode::Normal => {
            let nodes = board.perft(depth);
            print_perft_info(depth, nodes, start.elapsed());
        }
        PerftMode::Stats => {
            let stats = board.perft_with_stats(depth);
            print_perft_stats(depth, &stats, start.elapsed());
        }
        PerftMode::Divide => {
            let breakdown = board.perft_divide(depth);
            let mut total = 0u64;
            for (mv, nodes) in &breakdown {
                total += nodes;
                send(&format!("{} {}", format_uci_move(mv), nodes));
            }
            send(&format!("info string perft divide total {total}"));
            print_perft_info(depth, total, start.elapsed());
        }
    }
}

fn print_perft_stats(depth: usize, stats: &PerftStats, elapsed: std::time::Duration) {
    send(&format!(
        "info string perft depth {depth} nodes {} captures {} ep {} castles {} promotions {} checks {} discoverychecks {} doublechecks {} checkmates {} time {:?}",
        stats.nodes,
        stats.captures,
        stats.en_passant,
        stats.castles,
        stats.promotions,
        stats.checks,
        stats.discovery_checks,
        stats.double_checks,
        stats.checkmates,
        elapsed,
    ));
}

fn handle_display(board: &Board) {
    let mut out = String::new();
    out.push_str("\n  +---+---+---+---+---+---+---+---+\n");
    for rank in (0..8).rev() {
        out.push_str(&format!("{} ", rank + 1));
        for file in 0..8 {
            let sq = Square::new(rank, file);
            let ch = match board.piece_at(sq) {
                Some((color, piece)) => piece.to_fen_char(color),
                None => '.',
            };
            out.push_str(&format!("| {ch} "));
        }
        out.push_str("|\n  +---+---+---+---+---+---+---+---+\n");
    }
    out.push_str("    a   b   c   d   e   f   g   h\n");
    send(&out);
    send(&format!("Fen: {}", board.to_fen()));
    send(&format!("Key: {:016X}", board.hash()));
}
