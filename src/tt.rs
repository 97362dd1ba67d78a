//! Transposition table for caching search results.
//!
//! Uses Zobrist hashes to store and retrieve position evaluations, enabling
//! significant search tree pruning. Buckets are accessed without locks: each
//! slot is a `(key, data)` pair of atomics where `key = hash ^ data` (the
//! "lockless XOR trick"). A reader recomputes `hash` from the pair it loaded
//! and treats a mismatch as a miss, which is the only guarantee needed to
//! avoid returning a torn best-move under concurrent Lazy SMP access.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

use crate::board::Move;

/// Scores at or beyond this magnitude are mate scores and need root-relative
/// adjustment on store/probe. Mirrors `board::search::constants::MATE_THRESHOLD`;
/// duplicated here so this module stays independent of the search crate.
const MATE_THRESHOLD: i32 = 28000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// Score is the exact value.
    Exact,
    /// Score is at least this value (search failed high / beta cutoff).
    LowerBound,
    /// Score is at most this value (search failed low).
    UpperBound,
}

impl BoundType {
    const fn to_bits(self) -> u64 {
        match self {
            BoundType::Exact => 0,
            BoundType::LowerBound => 1,
            BoundType::UpperBound => 2,
        }
    }

    const fn from_bits(bits: u64) -> Self {
        match bits & 0b11 {
            0 => BoundType::Exact,
            1 => BoundType::LowerBound,
            _ => BoundType::UpperBound,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TTEntry {
    depth: u32,
    score: i32,
    bound_type: BoundType,
    best_move: Option<Move>,
}

impl TTEntry {
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn bound_type(&self) -> BoundType {
        self.bound_type
    }

    pub fn best_move(&self) -> Option<Move> {
        self.best_move
    }
}

/// Adjust a mate score from "distance to mate from this node" to
/// "distance to mate from the root", for storage.
fn to_tt_score(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply
    } else if score <= -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Inverse of `to_tt_score`: convert a root-relative stored mate score back
/// to "distance to mate from this node" for use at the current ply.
fn from_tt_score(score: i32, ply: i32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply
    } else if score <= -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

fn pack(best_move: u16, score: i16, depth: u8, bound: BoundType, age: u8) -> u64 {
    u64::from(best_move)
        | (u64::from(score as u16) << 16)
        | (u64::from(depth) << 32)
        | (bound.to_bits() << 40)
        | (u64::from(age) << 42)
}

fn unpack(data: u64) -> (u16, i16, u8, BoundType, u8) {
    let best_move = (data & 0xFFFF) as u16;
    let score = ((data >> 16) & 0xFFFF) as u16 as i16;
    let depth = ((data >> 32) & 0xFF) as u8;
    let bound = BoundType::from_bits((data >> 40) & 0b11);
    let age = ((data >> 42) & 0xFF) as u8;
    (best_move, score, depth, bound, age)
}

/// One lockless slot: `key` always equals `hash ^ data` for whichever write
/// landed last. A slot that has never been written reads as `(0, 0)`, which
/// decodes to an empty entry.
struct Slot {
    key: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    const fn empty() -> Self {
        Slot {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn load(&self) -> (u64, u64) {
        let key = self.key.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (key, data)
    }

    fn write(&self, hash: u64, data: u64) {
        self.data.store(data, Ordering::Relaxed);
        self.key.store(hash ^ data, Ordering::Relaxed);
    }
}

const BUCKET_SIZE: usize = 4;

pub struct TranspositionTable {
    buckets: Vec<[Slot; BUCKET_SIZE]>,
    mask: usize,
    age: AtomicU8,
}

impl TranspositionTable {
    // size_mb: Desired size in Megabytes
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bucket_size = std::mem::size_of::<[Slot; BUCKET_SIZE]>();
        let mut num_buckets = (size_mb * 1024 * 1024) / bucket_size.max(1);
        num_buckets = num_buckets.next_power_of_two() / 2;
        if num_buckets == 0 {
            num_buckets = 1024;
        }

        TranspositionTable {
            buckets: (0..num_buckets)
                .map(|_| [Slot::empty(), Slot::empty(), Slot::empty(), Slot::empty()])
                .collect(),
            mask: num_buckets - 1,
            age: AtomicU8::new(0),
        }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Hint the bucket a hash maps to into cache. No portable prefetch
    /// intrinsic is used; this exists so callers can keep the call site even
    /// if a future build adds `core::arch` prefetching behind a feature.
    #[inline(always)]
    pub(crate) fn prefetch(&self, _hash: u64) {}

    /// Probe the table for a given hash. `ply` is the current search ply,
    /// used to convert a stored root-relative mate score back to this node.
    pub(crate) fn probe(&self, hash: u64, ply: i32) -> Option<TTEntry> {
        let bucket = &self.buckets[self.index(hash)];
        for slot in bucket {
            let (key, data) = slot.load();
            if data == 0 && key == 0 {
                continue;
            }
            if key ^ data != hash {
                continue;
            }
            let (mv, score, depth, bound, _age) = unpack(data);
            let best_move = if mv == 0 { None } else { Some(Move::from_u16(mv)) };
            return Some(TTEntry {
                depth: u32::from(depth),
                score: from_tt_score(i32::from(score), ply),
                bound_type: bound,
                best_move,
            });
        }
        None
    }

    /// Store an entry in the table. Lock-free: may be called concurrently
    /// from any number of Lazy SMP worker threads sharing this table.
    pub(crate) fn store(
        &self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        ply: i32,
    ) {
        let current_age = self.age.load(Ordering::Relaxed);
        let stored_score = to_tt_score(score, ply) as i16;
        let stored_depth = depth.min(u32::from(u8::MAX)) as u8;
        let stored_move = best_move.map_or(0, Move::as_u16);

        let bucket = &self.buckets[self.index(hash)];

        for slot in bucket {
            let (key, data) = slot.load();
            let existing_hash = key ^ data;
            if (data != 0 || key != 0) && existing_hash == hash {
                let (old_move, old_score, old_depth, old_bound, old_age) = unpack(data);
                let refresh = stored_depth >= old_depth || old_age != current_age;
                let final_depth = if refresh { stored_depth } else { old_depth };
                let final_score = if refresh { stored_score } else { old_score };
                let final_bound = if refresh { bound_type } else { old_bound };
                let final_move = if stored_move != 0 { stored_move } else { old_move };
                let new_data = pack(final_move, final_score, final_depth, final_bound, current_age);
                slot.write(hash, new_data);
                return;
            }
        }

        // Replacement score: empty ranks lowest, then stale-age entries
        // (by shallowest depth), then fresh entries (by shallowest depth).
        // We pick the slot with the lowest score as the victim.
        let mut victim = 0usize;
        let mut victim_priority = i64::MAX;
        for (i, slot) in bucket.iter().enumerate() {
            let (key, data) = slot.load();
            let priority = if data == 0 && key == 0 {
                -1
            } else {
                let (_, _, depth, _, age) = unpack(data);
                if age != current_age {
                    i64::from(depth)
                } else {
                    i64::from(depth) + 1_000_000
                }
            };
            if priority < victim_priority {
                victim_priority = priority;
                victim = i;
            }
            if priority == -1 {
                break;
            }
        }

        let new_data = pack(stored_move, stored_score, stored_depth, bound_type, current_age);
        bucket[victim].write(hash, new_data);
    }

    /// Increment the age counter. Called at the start of each search; does
    /// not clear existing entries, which simply become "stale" and are
    /// preferentially replaced.
    pub fn next_age(&self) {
        self.age.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset every bucket and the age counter. Only safe to call when no
    /// search is in progress (invoked on `ucinewgame` and on resize).
    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in bucket {
                slot.data.store(0, Ordering::Relaxed);
                slot.key.store(0, Ordering::Relaxed);
            }
        }
        self.age.store(0, Ordering::Relaxed);
    }

    #[must_use]
    pub fn hashfull_per_mille(&self) -> u32 {
        let sample = self.buckets.len().min(250);
        if sample == 0 {
            return 0;
        }
        let mut occupied = 0u32;
        for bucket in &self.buckets[..sample] {
            for slot in bucket {
                let (key, data) = slot.load();
                if key != 0 || data != 0 {
                    occupied += 1;
                }
            }
        }
        (u64::from(occupied) * 1000 / (sample as u64 * BUCKET_SIZE as u64)) as u32
    }
}
