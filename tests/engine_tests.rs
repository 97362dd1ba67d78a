use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::Duration;

use chess_engine::board::{search, Board, SearchConfig, SearchState};
use chess_engine::engine::{EngineController, SearchParams};

#[test]
fn depth_limited_search_returns_a_legal_move() {
    let mut board = Board::new();
    let mut state = SearchState::new(16);
    let stop = AtomicBool::new(false);

    let result = search(&mut board, &mut state, SearchConfig::depth(1), &stop);

    assert!(result.best_move.is_some());
}

#[test]
fn time_limited_search_completes_and_returns_a_move() {
    let (tx, rx) = mpsc::channel();
    let mut controller = EngineController::new(16);
    controller.set_info_callback(None);

    controller.start_search(
        SearchParams {
            depth: None,
            soft_time_ms: 50,
            hard_time_ms: 100,
            ponder: false,
            infinite: false,
            multi_pv: 1,
        },
        move |result| {
            let _ = tx.send(result);
        },
    );

    let result = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("search did not complete in time");
    assert!(result.best_move.is_some());
}
