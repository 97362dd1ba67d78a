//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - Alpha-beta search with null move pruning and LMR
//! - Quiescence search with stand-pat
//! - Move ordering (TT move, killers, MVV-LVA, history)
//! - Transposition table for move ordering and cutoffs

mod constants;
mod eval_cache;
mod move_order;
mod params;
pub(crate) mod repetition;
mod simple;
pub mod smp;
mod tables;

pub use eval_cache::EvalCache;

use parking_lot::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crate::tt::TranspositionTable;

use super::nnue::NnueNetwork;
use super::{Board, Move, Piece, MAX_PLY};
pub use params::SearchParams;
pub use tables::{CaptureHistoryTable, ContinuationHistoryTable, CounterMoveTable, HistoryTable, KillerTable};

/// Result of a search containing best move and ponder move
#[derive(Debug, Clone, Copy)]
pub struct SearchResult {
    /// The best move found
    pub best_move: Option<Move>,
    /// The expected opponent reply (for pondering)
    pub ponder_move: Option<Move>,
}

/// Default transposition table size in MB
pub const DEFAULT_TT_MB: usize = 1024;

/// Mate score constant
pub(crate) const MATE_SCORE: i32 = constants::MATE_THRESHOLD + MAX_PLY as i32;

/// Statistics tracked during search
pub struct SearchStats {
    pub nodes: u64,
    pub seldepth: u32,
    pub total_nodes: u64,
    pub max_nodes: u64,
    pub tt_hits: u64,
}

impl SearchStats {
    pub fn reset_search(&mut self) {
        self.nodes = 0;
        self.seldepth = 0;
        self.total_nodes = 0;
        self.tt_hits = 0;
    }

    pub fn reset_iteration(&mut self) {
        self.nodes = 0;
        self.seldepth = 0;
    }
}

/// Tables used during search (TT, killers, history, counter moves)
pub struct SearchTables {
    pub tt: Arc<TranspositionTable>,
    pub killer_moves: KillerTable,
    pub history: HistoryTable,
    pub counter_moves: CounterMoveTable,
    pub capture_history: CaptureHistoryTable,
    pub continuation_history: ContinuationHistoryTable,
    /// Loaded NNUE network, if `UseNNUE` has been enabled and a file loaded.
    pub nnue: Option<Arc<NnueNetwork>>,
    /// Zobrist-keyed cache of blended eval scores. Per-thread; only
    /// consulted when NNUE is enabled (classical eval alone is cheap
    /// enough not to need caching).
    pub eval_cache: EvalCache,
}

impl SearchTables {
    /// MVV-LVA score for a capture move, with a learned capture-history bonus.
    /// Looks up the captured piece from the board at the target square
    #[must_use]
    pub fn mvv_lva_score(&self, board: &Board, mv: &Move) -> i32 {
        if !mv.is_capture() {
            return 0;
        }

        // For en passant, captured piece is always a pawn
        if mv.is_en_passant() {
            return move_order::piece_value(Piece::Pawn) * 10;
        }

        let Some((_, attacker)) = board.piece_at(mv.from()) else {
            return 0;
        };

        // Look up what piece is on the target square
        let captured = match board.piece_at(mv.to()) {
            Some((_, piece)) => piece,
            None => return 0,
        };
        // Simple MVV-LVA: prioritize capturing high-value pieces
        move_order::piece_value(captured) * 10 + self.capture_history.score(attacker, captured)
    }

    /// Get history score for a move
    #[must_use]
    pub fn history_score(&self, mv: &Move) -> i32 {
        self.history.score(mv)
    }

    /// Update history on beta cutoff
    pub fn update_history(&mut self, mv: &Move, depth: u32) {
        self.history.update(mv, depth);
    }

    /// Reset history table
    pub fn reset_history(&mut self) {
        self.history.reset();
    }
}

/// `UseNNUE`/`NnueBlend`/`NnueScale`/`NnueSCReLU` option state.
#[derive(Clone, Copy, Debug)]
pub struct NnueSettings {
    pub enabled: bool,
    /// Neural/classical blend percent (0..=100)
    pub blend: i32,
    /// Neural output scale percent (10..=400)
    pub scale: i32,
    pub screlu: bool,
}

impl Default for NnueSettings {
    fn default() -> Self {
        NnueSettings {
            enabled: false,
            blend: 2,
            scale: 100,
            screlu: false,
        }
    }
}

/// Search state persisted across searches
pub struct SearchState {
    pub stats: SearchStats,
    pub tables: SearchTables,
    pub generation: u16,
    pub last_move: Move,
    pub hard_stop_at: Option<Instant>,
    pub params: SearchParams,
    pub nnue_settings: NnueSettings,
    pub trace: bool,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState {
            stats: SearchStats {
                nodes: 0,
                seldepth: 0,
                total_nodes: 0,
                max_nodes: 0,
                tt_hits: 0,
            },
            tables: SearchTables {
                tt: Arc::new(TranspositionTable::new(tt_mb)),
                killer_moves: KillerTable::default(),
                history: HistoryTable::default(),
                counter_moves: CounterMoveTable::default(),
                capture_history: CaptureHistoryTable::default(),
                continuation_history: ContinuationHistoryTable::default(),
                nnue: None,
                eval_cache: EvalCache::new(),
            },
            generation: 0,
            last_move: super::EMPTY_MOVE,
            hard_stop_at: None,
            params: SearchParams::default(),
            nnue_settings: NnueSettings::default(),
            trace: false,
        }
    }

    /// Build a worker's local state sharing the TT and NNUE network of the
    /// coordinating thread, but with fresh move-ordering tables.
    #[must_use]
    pub fn with_shared_tables(
        tt: Arc<TranspositionTable>,
        nnue: Option<Arc<NnueNetwork>>,
        generation: u16,
    ) -> Self {
        SearchState {
            stats: SearchStats {
                nodes: 0,
                seldepth: 0,
                total_nodes: 0,
                max_nodes: 0,
                tt_hits: 0,
            },
            tables: SearchTables {
                tt,
                killer_moves: KillerTable::default(),
                history: HistoryTable::default(),
                counter_moves: CounterMoveTable::default(),
                capture_history: CaptureHistoryTable::default(),
                continuation_history: ContinuationHistoryTable::default(),
                nnue,
                eval_cache: EvalCache::new(),
            },
            generation,
            last_move: super::EMPTY_MOVE,
            hard_stop_at: None,
            params: SearchParams::default(),
            nnue_settings: NnueSettings::default(),
            trace: false,
        }
    }

    /// Clone of the shared transposition table handle, for handing to SMP workers.
    #[must_use]
    pub fn shared_tt(&self) -> Arc<TranspositionTable> {
        Arc::clone(&self.tables.tt)
    }

    /// Load an NNUE network from disk and enable neural evaluation.
    pub fn load_nnue<P: AsRef<std::path::Path>>(&mut self, path: P) -> std::io::Result<()> {
        let network = NnueNetwork::load(path)?;
        self.tables.nnue = Some(Arc::new(network));
        self.nnue_settings.enabled = true;
        Ok(())
    }

    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.tables.tt.next_age();
        self.stats.reset_search();
        self.last_move = super::EMPTY_MOVE;
        self.hard_stop_at = None;
        // Decay history and clear tactical helpers to avoid stale biases.
        self.tables.history.decay();
        self.tables.killer_moves.reset();
        self.tables.counter_moves.reset();
    }

    pub fn set_max_nodes(&mut self, max_nodes: u64) {
        self.stats.max_nodes = max_nodes;
    }

    pub fn set_hard_stop_at(&mut self, stop_at: Option<Instant>) {
        self.hard_stop_at = stop_at;
    }

    pub fn params_mut(&mut self) -> &mut SearchParams {
        &mut self.params
    }

    #[must_use]
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    #[must_use]
    pub fn trace(&self) -> bool {
        self.trace
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    pub fn reset_tables(&mut self, tt_mb: usize) {
        self.tables.tt = Arc::new(TranspositionTable::new(tt_mb));
        self.stats.reset_search();
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        self.tables.tt.hashfull_per_mille()
    }

    /// Evaluate a position, blending classical and neural scores per the
    /// `NnueBlend`/`NnueScale` settings. Falls back to the classical
    /// evaluator whenever NNUE is disabled or no network is loaded.
    pub fn evaluate(&mut self, board: &Board) -> i32 {
        if !self.nnue_settings.enabled {
            return board.evaluate();
        }
        let Some(network) = self.tables.nnue.clone() else {
            return board.evaluate();
        };
        if let Some(cached) = self.tables.eval_cache.probe(board.hash) {
            return cached;
        }

        let classical = board.evaluate();
        let blend = self.nnue_settings.blend.clamp(0, 100);
        let score = if blend <= 0 {
            classical
        } else {
            let neural_raw = board.evaluate_nnue(&network, self.nnue_settings.screlu);
            let neural = neural_raw * self.nnue_settings.scale / 100;
            if blend >= 100 {
                neural
            } else {
                (neural * blend + classical * (100 - blend)) / 100
            }
        };

        self.tables.eval_cache.store(board.hash, score);
        score
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new(DEFAULT_TT_MB)
    }
}

/// Time limits for a search
pub struct SearchLimits {
    pub clock: std::sync::Arc<SearchClock>,
    pub stop: std::sync::Arc<AtomicBool>,
}

/// Clock for tracking search time limits
pub struct SearchClock {
    start_time: Mutex<Instant>,
    soft_deadline: Mutex<Option<Instant>>,
    hard_deadline: Mutex<Option<Instant>>,
}

impl SearchClock {
    #[must_use]
    pub fn new(
        start_time: Instant,
        soft_deadline: Option<Instant>,
        hard_deadline: Option<Instant>,
    ) -> Self {
        SearchClock {
            start_time: Mutex::new(start_time),
            soft_deadline: Mutex::new(soft_deadline),
            hard_deadline: Mutex::new(hard_deadline),
        }
    }

    pub fn reset(
        &self,
        start_time: Instant,
        soft_deadline: Option<Instant>,
        hard_deadline: Option<Instant>,
    ) {
        let mut start = self.start_time.lock();
        *start = start_time;
        let mut soft = self.soft_deadline.lock();
        *soft = soft_deadline;
        let mut hard = self.hard_deadline.lock();
        *hard = hard_deadline;
    }

    pub fn snapshot(&self) -> (Instant, Option<Instant>, Option<Instant>) {
        let start_time = *self.start_time.lock();
        let soft_deadline = *self.soft_deadline.lock();
        let hard_deadline = *self.hard_deadline.lock();
        (start_time, soft_deadline, hard_deadline)
    }
}

// ============================================================================
// UNIFIED SEARCH API
// ============================================================================

/// Configuration for a search operation.
///
/// This struct consolidates all search parameters into a single configuration
/// object, replacing the need for multiple `find_best_move_*` functions.
#[derive(Clone)]
pub struct SearchConfig {
    /// Maximum depth to search (None = unlimited, defaults to 64)
    pub max_depth: Option<u32>,
    /// Time limit in milliseconds (0 = unlimited)
    pub time_limit_ms: u64,
    /// Node limit (0 = unlimited)
    pub node_limit: u64,
    /// Whether to extract ponder move from TT after search
    pub extract_ponder: bool,
    /// Optional callback for iteration info
    pub info_callback: Option<SearchInfoCallback>,
    /// Restrict the search to these root moves (UCI `go searchmoves`); `None` searches all legal moves.
    pub root_moves: Option<Vec<Move>>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_depth: None,
            time_limit_ms: 0,
            node_limit: 0,
            extract_ponder: true,
            info_callback: None,
            root_moves: None,
        }
    }
}

impl SearchConfig {
    /// Create a depth-limited search config
    #[must_use]
    pub fn depth(max_depth: u32) -> Self {
        SearchConfig {
            max_depth: Some(max_depth),
            ..Default::default()
        }
    }

    /// Create a time-limited search config
    #[must_use]
    pub fn time(time_limit_ms: u64) -> Self {
        SearchConfig {
            time_limit_ms,
            ..Default::default()
        }
    }

    /// Create a config from SearchLimits
    #[must_use]
    pub fn from_limits(limits: &SearchLimits) -> Self {
        let (_, soft_deadline, _) = limits.clock.snapshot();
        let time_limit_ms = soft_deadline.map_or(0, |d| {
            d.saturating_duration_since(Instant::now()).as_millis() as u64
        });
        SearchConfig {
            time_limit_ms,
            ..Default::default()
        }
    }

    /// Set whether to extract ponder move
    #[must_use]
    pub fn with_ponder(mut self, extract_ponder: bool) -> Self {
        self.extract_ponder = extract_ponder;
        self
    }

    /// Set node limit
    #[must_use]
    pub fn with_nodes(mut self, node_limit: u64) -> Self {
        self.node_limit = node_limit;
        self
    }

    /// Attach a callback for iteration info reporting.
    #[must_use]
    pub fn with_info_callback(mut self, callback: SearchInfoCallback) -> Self {
        self.info_callback = Some(callback);
        self
    }

    /// Restrict the search to a specific set of root moves.
    #[must_use]
    pub fn with_root_moves(mut self, root_moves: Vec<Move>) -> Self {
        self.root_moves = Some(root_moves);
        self
    }
}

/// Information about a completed search iteration.
#[derive(Debug, Clone)]
pub struct SearchIterationInfo {
    pub depth: u32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub score: i32,
    pub mate_in: Option<i32>,
    pub pv: String,
    pub seldepth: u32,
    pub tt_hits: u64,
}

/// Callback type for iteration info.
pub type SearchInfoCallback = Arc<dyn Fn(&SearchIterationInfo) + Send + Sync>;

/// Extract ponder move by making best move and probing TT
fn extract_ponder_move(board: &mut Board, state: &SearchState, best_move: Move) -> Option<Move> {
    // Make the best move temporarily
    let info = board.make_move(best_move);

    // Probe TT for opponent's expected reply
    let ponder = state.tables.tt.probe(board.hash, 0).and_then(|entry| {
        entry.best_move().filter(|mv| {
            // Verify move is legal
            let moves = board.generate_moves();
            moves.iter().any(|m| m == mv)
        })
    });

    // Unmake the move
    board.unmake_move(best_move, info);

    ponder
}

/// Unified search function that accepts a configuration.
///
/// This is the preferred API for running searches. It consolidates
/// all the `find_best_move_*` variants into a single function.
///
/// # Example
/// ```ignore
/// let config = SearchConfig::depth(10).with_ponder(true);
/// let result = search(board, state, config, &stop);
/// ```
pub fn search(
    board: &mut Board,
    state: &mut SearchState,
    config: SearchConfig,
    stop: &AtomicBool,
) -> SearchResult {
    let max_depth = config.max_depth.unwrap_or(64);
    let info_callback = config.info_callback.clone();
    let best_move = simple::simple_search(
        board,
        state,
        max_depth,
        config.time_limit_ms,
        config.node_limit,
        stop,
        info_callback,
        config.root_moves.as_deref(),
    );

    let ponder_move = if config.extract_ponder {
        best_move.and_then(|mv| extract_ponder_move(board, state, mv))
    } else {
        None
    };

    SearchResult {
        best_move,
        ponder_move,
    }
}

// ============================================================================
// LEGACY API (for backward compatibility)
// ============================================================================

/// Find best move with fixed depth limit
pub fn find_best_move(
    board: &mut Board,
    state: &mut SearchState,
    max_depth: u32,
    stop: &AtomicBool,
) -> Option<Move> {
    simple::simple_search(board, state, max_depth, 0, 0, stop, None, None)
}

/// Find best move with fixed depth limit, returning ponder move too
pub fn find_best_move_with_ponder(
    board: &mut Board,
    state: &mut SearchState,
    max_depth: u32,
    stop: &AtomicBool,
) -> SearchResult {
    search(board, state, SearchConfig::depth(max_depth), stop)
}

/// Find best move with time control
pub fn find_best_move_with_time(
    board: &mut Board,
    state: &mut SearchState,
    limits: &SearchLimits,
) -> Option<Move> {
    let config = SearchConfig::from_limits(limits).with_ponder(false);
    search(board, state, config, &limits.stop).best_move
}

/// Find best move with time control, returning ponder move too
pub fn find_best_move_with_time_and_ponder(
    board: &mut Board,
    state: &mut SearchState,
    limits: &SearchLimits,
) -> SearchResult {
    let config = SearchConfig::from_limits(limits);
    search(board, state, config, &limits.stop)
}
