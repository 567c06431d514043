//! Target hash set: the unknown hashes being searched for
//!
//! ## Ordering Invariant
//!
//! Hashes are sorted ascending by their low byte (ties by full value), and the
//! sentinel `0` is always present at position 0:
//!
//! ```text
//! [0, ..low byte 0x00..][..low byte 0x01..]...[..low byte 0xFF..]
//! ```
//!
//! The backend relies on this: it looks a computed hash up through the
//! 257-entry bucket table and reports a match in the slot at the hash's
//! position. Output slot `i` therefore always refers to `hashes()[i]`.

use crate::constants::SENTINEL_HASH;
use crate::{Error, Result};

/// Number of low-byte buckets
const NUM_BUCKETS: usize = 256;

/// Parse one candidate-list line.
///
/// The hex and decimal readings are attempted independently and both are
/// yielded when both succeed, so `"1234"` contributes `0x1234` and `1234`.
pub fn parse_hash_line(line: &str) -> impl Iterator<Item = u64> {
    let trimmed = line.trim();

    let hex = if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        u64::from_str_radix(trimmed, 16).ok()
    } else {
        None
    };
    let decimal = trimmed.parse::<u64>().ok();

    hex.into_iter().chain(decimal)
}

/// Deduplicated, low-byte-ordered set of target hashes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHashSet {
    hashes: Vec<u64>,
    /// `buckets[b]..buckets[b + 1]` spans the hashes whose low byte is `b`
    buckets: Vec<usize>,
}

impl TargetHashSet {
    /// Build from candidate-list lines
    pub fn build<I, S>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: Vec<u64> = lines
            .into_iter()
            .flat_map(|line| parse_hash_line(line.as_ref()))
            .collect();
        Self::from_hashes(parsed)
    }

    /// Build from already-parsed hashes
    pub fn from_hashes<I: IntoIterator<Item = u64>>(hashes: I) -> Result<Self> {
        let mut hashes: Vec<u64> = std::iter::once(SENTINEL_HASH).chain(hashes).collect();
        hashes.sort_unstable_by_key(|&h| (low_byte(h), h));
        hashes.dedup();

        if hashes.len() <= 1 {
            return Err(Error::EmptyTargetSet);
        }

        let mut buckets = vec![0usize; NUM_BUCKETS + 1];
        for &h in &hashes {
            buckets[low_byte(h) + 1] += 1;
        }
        for b in 0..NUM_BUCKETS {
            buckets[b + 1] += buckets[b];
        }

        Ok(Self { hashes, buckets })
    }

    /// All hashes in output-slot order, sentinel first
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// Number of hashes including the sentinel (the backend output size)
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.len() <= 1
    }

    /// Number of real targets (excluding the sentinel)
    pub fn target_count(&self) -> usize {
        self.hashes.len() - 1
    }

    /// Output slot of `hash`, if it is a member
    #[inline]
    pub fn slot_of(&self, hash: u64) -> Option<usize> {
        let b = low_byte(hash);
        let (start, end) = (self.buckets[b], self.buckets[b + 1]);
        if start == end {
            return None;
        }
        self.hashes[start..end]
            .binary_search(&hash)
            .ok()
            .map(|i| start + i)
    }

    /// True for any member except the sentinel
    pub fn is_target(&self, hash: u64) -> bool {
        hash != SENTINEL_HASH && self.slot_of(hash).is_some()
    }
}

#[inline(always)]
fn low_byte(hash: u64) -> usize {
    (hash & 0xFF) as usize
}
