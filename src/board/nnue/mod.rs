//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! Provides neural network based position evaluation with a
//! 768 -> `hidden_size` -> 1 architecture and dual-perspective accumulators.
//! `hidden_size` (1..=4096) is read from the network file, so no incremental
//! update path is hardwired to a compile-time width.

pub mod network;

pub use network::{NnueAccumulator, NnueNetwork};

/// Weight quantization factor for feature weights.
pub const QA: i32 = 255;

/// Output weight quantization factor.
pub const QB: i32 = 64;

/// Evaluation scale factor.
pub const SCALE: i32 = 400;
