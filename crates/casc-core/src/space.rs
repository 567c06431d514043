//! Space partitioning: split a mask's candidate space into dispatch chunks
//!
//! The total combination count routinely exceeds what a single dispatch can
//! address, so the space is covered by at most two chunks:
//!
//! ```text
//! [0 ............................ loops*C)[loops*C ........ total)
//!  one chunk, work size C, repeated loops   remainder, repeated once
//! ```
//!
//! A repeated chunk evaluates `offset + r * work_size + i` for every repeat
//! `r` and work item `i`, so its span is `work_size * repeat`.

use std::f64::consts::LN_2;

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};

use crate::constants::{ALPHABET_SIZE, DISPATCH_CEILING};
use crate::{Error, Mask, Result};

/// One backend invocation over `[offset, offset + work_size * repeat)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchChunk {
    /// First global candidate index
    pub offset: u64,
    /// Work items per repeat (never above the dispatch ceiling)
    pub work_size: u64,
    /// On-device loop count; each repeat strides by `work_size`
    pub repeat: u64,
    /// Result slots returned (one per target hash)
    pub output_size: usize,
}

impl DispatchChunk {
    /// Number of candidate indices covered
    pub fn span(&self) -> u64 {
        self.work_size * self.repeat
    }

    /// One past the last candidate index covered
    pub fn end(&self) -> u64 {
        self.offset + self.span()
    }
}

/// The partitioned candidate space of one mask
#[derive(Debug, Clone)]
pub struct SearchSpace {
    /// Total combinations (`39 ^ effective_wildcards`)
    pub total: BigUint,
    /// Per-dispatch work size ceiling
    pub ceiling: u64,
    /// Full-ceiling repeats in the first chunk
    pub loops: u64,
    /// Candidates left for the remainder chunk
    pub remainder: u64,
    /// Ordered, non-overlapping chunks covering `[0, total)`
    pub chunks: Vec<DispatchChunk>,
}

impl SearchSpace {
    /// Plan a mask against the backend's dispatch ceiling
    pub fn plan(mask: &Mask, target_count: usize) -> Result<Self> {
        Self::plan_with_ceiling(mask, target_count, DISPATCH_CEILING)
    }

    /// Plan with an explicit ceiling (must be non-zero)
    pub fn plan_with_ceiling(mask: &Mask, target_count: usize, ceiling: u64) -> Result<Self> {
        assert!(ceiling > 0, "dispatch ceiling must be non-zero");

        let total = total_combinations(mask);
        // Candidate indices are 64-bit on both sides of the backend
        if total.to_u64().is_none() {
            return Err(Error::SpaceTooLarge(total.to_string()));
        }

        let loops = loops_for(&total, ceiling);
        let looped = BigUint::from(loops) * ceiling;
        let remainder = (&total - &looped)
            .to_u64()
            .ok_or_else(|| Error::SpaceTooLarge(total.to_string()))?;
        let looped = looped
            .to_u64()
            .ok_or_else(|| Error::SpaceTooLarge(total.to_string()))?;

        let mut chunks = Vec::with_capacity(2);
        if loops > 0 {
            chunks.push(DispatchChunk {
                offset: 0,
                work_size: ceiling,
                repeat: loops,
                output_size: target_count,
            });
        }
        if remainder > 0 {
            chunks.push(DispatchChunk {
                offset: looped,
                work_size: remainder,
                repeat: 1,
                output_size: target_count,
            });
        }

        Ok(Self {
            total,
            ceiling,
            loops,
            remainder,
            chunks,
        })
    }
}

/// `39 ^ effective_wildcards`, unbounded
pub fn total_combinations(mask: &Mask) -> BigUint {
    BigUint::from(ALPHABET_SIZE).pow(mask.effective_wildcards() as u32)
}

/// `floor(total / ceiling)`, saturating at `u64::MAX`.
///
/// Estimated as `exp(ln(total) - ln(ceiling))` so `total` is never narrowed to
/// a float, then corrected against the exact product so the remainder always
/// lands in `[0, ceiling)` whenever the quotient fits.
pub fn loops_for(total: &BigUint, ceiling: u64) -> u64 {
    if total.is_zero() || ceiling == 0 {
        return 0;
    }

    let estimate = (ln(total) - (ceiling as f64).ln()).exp().floor();
    // `as` saturates, so an infinite estimate becomes u64::MAX
    let mut loops = if estimate > 0.0 { estimate as u64 } else { 0 };

    let ceiling_big = BigUint::from(ceiling);
    while loops > 0 && BigUint::from(loops) * &ceiling_big > *total {
        loops -= 1;
    }
    while loops < u64::MAX && BigUint::from(loops) * &ceiling_big + &ceiling_big <= *total {
        loops += 1;
    }
    loops
}

/// Natural log of an arbitrarily large integer, from its top 64 bits
fn ln(value: &BigUint) -> f64 {
    let bits = value.bits();
    if bits <= 64 {
        return value.to_u64().map_or(f64::NAN, |v| (v as f64).ln());
    }

    let shift = bits - 64;
    let top = (value >> shift).to_u64().unwrap_or(u64::MAX);
    (top as f64).ln() + shift as f64 * LN_2
}
