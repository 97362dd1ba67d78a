use crate::board::{SearchParams, SearchState, DEFAULT_TT_MB};

/// Print a UCI spin option.
fn print_spin(
    name: &str,
    default: impl std::fmt::Display,
    min: impl std::fmt::Display,
    max: impl std::fmt::Display,
) {
    println!("option name {name} type spin default {default} min {min} max {max}");
}

/// Print a UCI check option.
fn print_check(name: &str, default: bool) {
    println!(
        "option name {name} type check default {}",
        if default { "true" } else { "false" }
    );
}

/// Print a UCI string option.
fn print_string(name: &str, default: &str) {
    let shown = if default.is_empty() { "<empty>" } else { default };
    println!("option name {name} type string default {shown}");
}

pub enum UciOptionAction {
    ReinitHash(usize),
    SetThreads(usize),
    /// Load an NNUE network from the given path; re-applied after `UseNNUE`
    /// or `EvalFile` change so the caller can surface load errors.
    LoadNnue(String),
}

pub struct UciOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub default_max_nodes: u64,
    pub move_overhead_ms: u64,
    pub soft_time_percent: u64,
    pub hard_time_percent: u64,
    pub multi_pv: u32,
    pub ponder: bool,
    pub debug_log_file: String,
    pub use_nnue: bool,
    pub eval_file: String,
}

impl UciOptions {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        UciOptions {
            hash_mb,
            threads: 1,
            default_max_nodes: 0,
            move_overhead_ms: 50,
            soft_time_percent: 70,
            hard_time_percent: 90,
            multi_pv: 1,
            ponder: false,
            debug_log_file: String::new(),
            use_nnue: false,
            eval_file: String::new(),
        }
    }

    pub fn print(&self, params: &SearchParams, nnue: &crate::board::NnueSettings) {
        println!("id name chess_engine");
        println!("id author Dean Menezes");

        // Engine options
        print_spin("Hash", self.hash_mb, 1, 4096);
        print_spin("Threads", self.threads, 1, 64);
        print_spin("Move Overhead", self.move_overhead_ms, 0, 1000);
        print_spin("Soft Time Percent", self.soft_time_percent, 1, 100);
        print_spin("Hard Time Percent", self.hard_time_percent, 1, 100);
        print_spin("Max Nodes", self.default_max_nodes, 0_u64, u64::MAX);
        print_spin("MultiPV", self.multi_pv, 1, 64);
        print_check("Ponder", self.ponder);
        print_string("Debug Log File", &self.debug_log_file);

        // NNUE evaluation
        print_check("UseNNUE", self.use_nnue);
        print_string("EvalFile", &self.eval_file);
        print_spin("NnueBlend", nnue.blend, 0, 100);
        print_spin("NnueScale", nnue.scale, 10, 400);
        print_check("NnueSCReLU", nnue.screlu);

        // Tunable search parameters for SPSA
        print_spin("RFPMargin", params.rfp_margin, 50, 300);
        print_spin("NullMoveReduction", params.null_reduction, 1, 5);
        print_spin("FutilityMargin", params.futility_margin, 50, 250);
        print_spin("IIRMinDepth", params.iir_min_depth, 3, 8);
        print_spin("LMRMinDepth", params.lmr_min_depth, 2, 6);

        println!("uciok");
    }

    pub fn apply_setoption(
        &mut self,
        name: &str,
        value: Option<&str>,
        state: &mut SearchState,
    ) -> Option<UciOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_TT_MB)
                    .clamp(1, 4096);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Some(UciOptionAction::ReinitHash(mb));
                }
            }
            "threads" => {
                let threads = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, 64);
                if threads != self.threads {
                    self.threads = threads;
                    return Some(UciOptionAction::SetThreads(threads));
                }
            }
            "move overhead" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.move_overhead_ms = v;
                }
            }
            "soft time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.soft_time_percent = v.clamp(1, 100);
                }
            }
            "hard time percent" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.hard_time_percent = v.clamp(1, 100);
                }
            }
            "max nodes" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.default_max_nodes = v;
                }
            }
            "softtime" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.soft_time_percent = v.clamp(1, 100);
                }
            }
            "hardtime" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.hard_time_percent = v.clamp(1, 100);
                }
            }
            "nodes" => {
                if let Some(v) = value.and_then(|v| v.parse::<u64>().ok()) {
                    self.default_max_nodes = v;
                }
            }
            "multipv" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    self.multi_pv = v.clamp(1, 64);
                }
            }
            "ponder" => {
                if let Some(v) = value {
                    self.ponder = matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                }
            }
            "debug log file" => {
                self.debug_log_file = value.unwrap_or("").to_string();
                super::debug_log::set_path(&self.debug_log_file);
            }
            "usennue" => {
                if let Some(v) = value {
                    self.use_nnue =
                        matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                    state.nnue_settings.enabled = self.use_nnue;
                    if self.use_nnue && !self.eval_file.is_empty() {
                        return Some(UciOptionAction::LoadNnue(self.eval_file.clone()));
                    }
                }
            }
            "evalfile" => {
                if let Some(v) = value {
                    self.eval_file = v.to_string();
                    if self.use_nnue && !self.eval_file.is_empty() {
                        return Some(UciOptionAction::LoadNnue(self.eval_file.clone()));
                    }
                }
            }
            "nnueblend" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.nnue_settings.blend = v.clamp(0, 100);
                }
            }
            "nnuescale" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.nnue_settings.scale = v.clamp(10, 400);
                }
            }
            "nnuescrelu" => {
                if let Some(v) = value {
                    state.nnue_settings.screlu =
                        matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1");
                }
            }
            // Tunable search parameters for SPSA
            "rfpmargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().rfp_margin = v.clamp(50, 300);
                }
            }
            "nullmovereduction" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().null_reduction = v.clamp(1, 5);
                }
            }
            "futilitymargin" => {
                if let Some(v) = value.and_then(|v| v.parse::<i32>().ok()) {
                    state.params_mut().futility_margin = v.clamp(50, 250);
                }
            }
            "iirmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().iir_min_depth = v.clamp(3, 8);
                }
            }
            "lmrmindepth" => {
                if let Some(v) = value.and_then(|v| v.parse::<u32>().ok()) {
                    state.params_mut().lmr_min_depth = v.clamp(2, 6);
                }
            }
            _ => {}
        }
        None
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
