//! casc-bruteforcer: Jenkins96 name recovery for CASC archives
//!
//! Umbrella crate over the workspace:
//! - [`core`]: mask compiler, space planner, target set and decoder
//! - [`search`]: backends, dispatch, validation and the run driver

pub use casc_core as core;
pub use casc_search as search;
