//! casc-core: Search-space compiler for Jenkins96 name recovery
//!
//! CASC archives identify entries by the 64-bit Jenkins96 hash of their
//! normalised path. When only the hash is known, the name can be recovered by
//! brute-forcing a templated guess ("mask") such as `INTERFACE\ICONS\%%%.BLP`.
//!
//! This crate holds the pure, synchronous parts of that search:
//! - Mask compilation (normalisation, wildcard offsets, mirrored interleave)
//! - Space partitioning into dispatch chunks under a per-dispatch ceiling
//! - Target hash set construction (sorted by low byte)
//! - Candidate decoding from a mixed-radix index back to a literal string
//!
//! # Enumeration Order
//!
//! A candidate index is a base-39 number with one digit per effective
//! wildcard. The first wildcard (or first mirrored pair) is the most
//! significant digit:
//!
//! ```text
//! mask  "AB%C%"      offsets [2, 4]
//! index  = d0 * 39 + d1
//! string = "AB" + ALPHABET[d0] + "C" + ALPHABET[d1]
//! ```
//!
//! Under mirroring the two halves of the wildcard list are interleaved so each
//! digit is written to both offsets of its pair:
//!
//! ```text
//! mask  "%\%"  mirrored   offsets [0, 2]  ->  one digit, written twice
//! ```

mod candidate;
mod error;
pub mod jenkins;
mod mask;
mod space;
mod targets;

pub use candidate::{candidate_index, decode_candidate, write_candidate};
pub use error::{Error, MaskError};
pub use jenkins::{hash_path, jenkins96, jenkins96_padded};
pub use mask::{normalise, Mask};
pub use space::{loops_for, total_combinations, DispatchChunk, SearchSpace};
pub use targets::{parse_hash_line, TargetHashSet};

pub type Result<T> = std::result::Result<T, Error>;

/// Constants shared by the compiler, the kernel and the decoder
pub mod constants {
    /// Candidate characters, in digit order (position 0 = `A`)
    pub const ALPHABET: &[u8; 39] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_-\\";

    /// Radix of a candidate index digit
    pub const ALPHABET_SIZE: u64 = ALPHABET.len() as u64;

    /// Marker for an unknown character in a mask
    pub const WILDCARD: u8 = b'%';

    /// Canonical path separator
    pub const SEPARATOR: u8 = b'\\';

    /// Jenkins96 block size; templates are padded to a multiple of this
    pub const BLOCK_SIZE: usize = 12;

    /// Maximum wildcards in a normal mask
    pub const MAX_WILDCARDS: usize = 12;

    /// Maximum wildcards in a mirrored mask (two identical halves)
    pub const MAX_MIRRORED_WILDCARDS: usize = 24;

    /// Largest work size a single dispatch can address (`size_t` is usually 32-bit)
    pub const DISPATCH_CEILING: u64 = u32::MAX as u64;

    /// Target hash reserved as the "no match" dump slot
    pub const SENTINEL_HASH: u64 = 0;
}
