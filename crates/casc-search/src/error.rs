//! Search engine error types

use thiserror::Error;

use crate::backend::DeviceClass;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Core error: {0}")]
    Core(#[from] casc_core::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No {device} compute device available: {reason}")]
    BackendInit { device: DeviceClass, reason: String },

    #[error("Dispatch failed at offset {offset} (work size {work_size}, repeat {repeat}): {reason}")]
    Dispatch {
        offset: u64,
        work_size: u64,
        repeat: u64,
        reason: String,
    },

    #[error("Unable to download unknown listfile from `{url}`: {reason}")]
    SourceUnavailable { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
