//! casc-search: Chunked dispatch and validation engine for Jenkins96 name recovery
//!
//! Drives a compute backend over the candidate space compiled by `casc-core`,
//! then re-validates every reported hit on the host.
//!
//! ```text
//! listfile ──> TargetHashSet ─┐
//!                             ├─> Bruteforcer ──> DispatchEngine ──> ComputeBackend
//! masks ─────> Mask ──────────┘        │                 │
//!                                      │           RawHitQueue
//!                                      └──── Validator <─┘ ──> ResultSet ──> export
//! ```
//!
//! Only the CPU backend ships in this crate; the [`ComputeBackend`] trait is
//! the seam for device backends.

pub mod backend;
pub mod bruteforcer;
pub mod config;
pub mod cpu;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod listfile;
pub mod validate;

pub use backend::{open_backend, ComputeBackend, DeviceClass, KernelProgram};
pub use bruteforcer::{load_masks, Bruteforcer, MaskOutcome, MaskStatus, SearchReport};
pub use config::{ListfileConfig, SearchConfig, BENCHMARK_HASH};
pub use cpu::CpuBackend;
pub use dispatch::{DispatchEngine, RawHitQueue};
pub use error::SearchError;
pub use export::{append_results, render_summary};
pub use listfile::ListfileCache;
pub use validate::{ResultSet, Validator};
