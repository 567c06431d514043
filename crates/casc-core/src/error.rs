//! Core error types

use thiserror::Error;

/// A mask that cannot be searched. Recoverable: the mask is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    #[error("Too many wildcards - maximum is {max}, got {count}. `{mask}`")]
    TooManyWildcards {
        mask: String,
        count: usize,
        max: usize,
    },

    #[error("Mirrored flag used with an odd number of wildcards ({count}). `{mask}`")]
    OddMirroredWildcards { mask: String, count: usize },

    #[error("Mask contains non-ASCII characters. `{mask}`")]
    NonAscii { mask: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid mask: {0}")]
    Mask(#[from] MaskError),

    #[error("Target hash set is empty (only the sentinel remains) - unknown listfile is missing or empty")]
    EmptyTargetSet,

    #[error("Search space of {0} combinations does not fit a 64-bit candidate index")]
    SpaceTooLarge(String),
}
