//! NNUE network structure and evaluation.
//!
//! Implements a 768 -> `hidden_size` -> 1 architecture with dual-perspective
//! accumulators. `hidden_size` is read from the network file rather than
//! fixed at compile time, so a single binary can load any trained network
//! within the supported range.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{QA, QB, SCALE};

/// Input feature size: 64 squares x 6 piece types x 2 colors.
pub const INPUT_SIZE: usize = 768;

const MAGIC: &[u8; 8] = b"SYKNNUE1";
const SUPPORTED_VERSION: u16 = 1;
const MIN_HIDDEN_SIZE: usize = 1;
const MAX_HIDDEN_SIZE: usize = 4096;

fn invalid_data(msg: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg.into())
}

/// NNUE accumulator storing hidden layer activations for both perspectives.
#[derive(Clone)]
pub struct NnueAccumulator {
    /// White's perspective accumulator.
    pub white: Vec<i16>,
    /// Black's perspective accumulator.
    pub black: Vec<i16>,
}

impl NnueAccumulator {
    /// Create a new accumulator initialized with the network's hidden biases.
    #[must_use]
    pub fn new(biases: &[i16]) -> Self {
        Self {
            white: biases.to_vec(),
            black: biases.to_vec(),
        }
    }

    /// Refresh accumulator from scratch given active features.
    pub fn refresh(
        &mut self,
        white_features: &[usize],
        black_features: &[usize],
        network: &NnueNetwork,
    ) {
        self.white.copy_from_slice(&network.hidden_bias);
        self.black.copy_from_slice(&network.hidden_bias);

        for &feat in white_features {
            add_weights(&mut self.white, network.feature_row(feat));
        }
        for &feat in black_features {
            add_weights(&mut self.black, network.feature_row(feat));
        }
    }

    /// Add a feature (piece placed on square) to both perspectives.
    #[inline]
    pub fn add_feature(&mut self, white_feat: usize, black_feat: usize, network: &NnueNetwork) {
        add_weights(&mut self.white, network.feature_row(white_feat));
        add_weights(&mut self.black, network.feature_row(black_feat));
    }

    /// Remove a feature (piece removed from square) from both perspectives.
    #[inline]
    pub fn sub_feature(&mut self, white_feat: usize, black_feat: usize, network: &NnueNetwork) {
        sub_weights(&mut self.white, network.feature_row(white_feat));
        sub_weights(&mut self.black, network.feature_row(black_feat));
    }
}

#[inline]
fn add_weights(acc: &mut [i16], weights: &[i16]) {
    for (a, w) in acc.iter_mut().zip(weights) {
        *a = a.saturating_add(*w);
    }
}

#[inline]
fn sub_weights(acc: &mut [i16], weights: &[i16]) {
    for (a, w) in acc.iter_mut().zip(weights) {
        *a = a.saturating_sub(*w);
    }
}

/// NNUE network weights, loaded from a `SYKNNUE1` file (see spec.md §6).
pub struct NnueNetwork {
    pub hidden_size: usize,
    /// Feature transformer weights, row-major: `feature_weights[feature * hidden_size + j]`.
    pub feature_weights: Vec<i16>,
    pub hidden_bias: Vec<i16>,
    /// Output weights for the side-to-move half.
    pub output_weights_stm: Vec<i16>,
    /// Output weights for the opponent half.
    pub output_weights_opp: Vec<i16>,
    pub output_bias: i32,
}

impl NnueNetwork {
    #[inline]
    fn feature_row(&self, feature: usize) -> &[i16] {
        let start = feature * self.hidden_size;
        &self.feature_weights[start..start + self.hidden_size]
    }

    /// Load a network from a `SYKNNUE1` file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(&mut BufReader::new(file))
    }

    /// Load a network from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> std::io::Result<Self> {
        Self::from_reader(&mut std::io::Cursor::new(data))
    }

    fn from_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(invalid_data("bad NNUE magic, expected SYKNNUE1"));
        }

        let version = read_u16(reader)?;
        if version != SUPPORTED_VERSION {
            return Err(invalid_data(format!(
                "unsupported NNUE version {version}, expected {SUPPORTED_VERSION}"
            )));
        }

        let hidden_size = read_u16(reader)? as usize;
        if !(MIN_HIDDEN_SIZE..=MAX_HIDDEN_SIZE).contains(&hidden_size) {
            return Err(invalid_data(format!(
                "NNUE hidden_size {hidden_size} out of range [{MIN_HIDDEN_SIZE}, {MAX_HIDDEN_SIZE}]"
            )));
        }

        let output_bias = read_i32(reader)?;
        let hidden_bias = read_i16_vec(reader, hidden_size)?;
        let feature_weights = read_i16_vec(reader, INPUT_SIZE * hidden_size)?;
        let output_weights_stm = read_i16_vec(reader, hidden_size)?;
        let output_weights_opp = read_i16_vec(reader, hidden_size)?;

        Ok(Self {
            hidden_size,
            feature_weights,
            hidden_bias,
            output_weights_stm,
            output_weights_opp,
            output_bias,
        })
    }

    /// Evaluate a position given its accumulator and side to move.
    ///
    /// `screlu` selects squared-CReLU activation; otherwise plain CReLU
    /// (clamp to `[0, QA]`) is used. Returns centipawns from the
    /// side-to-move's perspective.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, acc: &NnueAccumulator, white_to_move: bool, screlu: bool) -> i32 {
        let (us_acc, them_acc) = if white_to_move {
            (&acc.white, &acc.black)
        } else {
            (&acc.black, &acc.white)
        };

        let (us_output, them_output) = if screlu {
            (
                screlu_dot(us_acc, &self.output_weights_stm),
                screlu_dot(them_acc, &self.output_weights_opp),
            )
        } else {
            (
                crelu_dot(us_acc, &self.output_weights_stm),
                crelu_dot(them_acc, &self.output_weights_opp),
            )
        };

        let output = us_output + them_output + self.output_bias * QA;
        if screlu {
            output * SCALE / (QA * QA * QB)
        } else {
            output * SCALE / (QA * QB)
        }
    }
}

#[inline]
fn crelu_dot(acc: &[i16], weights: &[i16]) -> i32 {
    let mut sum = 0i32;
    for (&a, &w) in acc.iter().zip(weights) {
        let clamped = i32::from(a).clamp(0, QA);
        sum += clamped * i32::from(w);
    }
    sum
}

#[inline]
fn screlu_dot(acc: &[i16], weights: &[i16]) -> i32 {
    let mut sum = 0i32;
    for (&a, &w) in acc.iter().zip(weights) {
        let clamped = i32::from(a).clamp(0, QA);
        sum += clamped * clamped * i32::from(w);
    }
    sum
}

fn read_u16<R: Read>(reader: &mut R) -> std::io::Result<u16> {
    let mut buf = [0u8; 2];
    reader.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_i16_vec<R: Read>(reader: &mut R, len: usize) -> std::io::Result<Vec<i16>> {
    let mut out = Vec::with_capacity(len);
    let mut buf = [0u8; 2];
    for _ in 0..len {
        reader.read_exact(&mut buf)?;
        out.push(i16::from_le_bytes(buf));
    }
    Ok(out)
}

/// Compute the feature index for a piece at a square from a perspective.
#[inline]
#[must_use]
pub fn feature_index(
    piece_type: usize,
    piece_color: usize,
    square: usize,
    perspective: usize,
) -> usize {
    let (oriented_sq, oriented_color) = if perspective == 1 {
        (square ^ 56, 1 - piece_color)
    } else {
        (square, piece_color)
    };
    oriented_color * 384 + piece_type * 64 + oriented_sq
}
