//! Compute backend seam
//!
//! A backend is bound to one device class for the whole run. Per mask it is
//! loaded with a [`KernelProgram`], then invoked once per [`DispatchChunk`].
//!
//! ## Dispatch Contract
//!
//! `dispatch` returns exactly `chunk.output_size` slots, one per target hash in
//! [`TargetHashSet::hashes`] order. Slot `i` holds `0` (no candidate in this
//! chunk hashed to target `i`) or the global index of a candidate that did.
//! Index 0 is therefore never reported; callers probe it on the host.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use casc_core::{DispatchChunk, Mask, TargetHashSet};

use crate::cpu::CpuBackend;
use crate::error::{Result, SearchError};

/// Device class filter for backend binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Cpu,
    Gpu,
    Any,
}

impl FromStr for DeviceClass {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(DeviceClass::Cpu),
            "gpu" => Ok(DeviceClass::Gpu),
            "any" | "all" => Ok(DeviceClass::Any),
            other => Err(SearchError::Configuration(format!(
                "invalid device `{}` (expected cpu, gpu or any)",
                other
            ))),
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Cpu => write!(f, "cpu"),
            DeviceClass::Gpu => write!(f, "gpu"),
            DeviceClass::Any => write!(f, "any"),
        }
    }
}

/// Everything a backend needs to evaluate one mask
#[derive(Debug, Clone)]
pub struct KernelProgram {
    mask: Mask,
    targets: Arc<TargetHashSet>,
}

impl KernelProgram {
    pub fn new(mask: Mask, targets: Arc<TargetHashSet>) -> Self {
        Self { mask, targets }
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn targets(&self) -> &TargetHashSet {
        &self.targets
    }

    /// Kernel entry point name
    pub fn entry_point(&self) -> &'static str {
        if self.mask.is_mirrored() {
            "BruteforceMirrored"
        } else {
            "Bruteforce"
        }
    }
}

/// A parallel device that evaluates candidate chunks
pub trait ComputeBackend: Send {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Install the kernel for the next mask
    fn load(&mut self, program: KernelProgram) -> Result<()>;

    /// Evaluate one chunk, blocking until every repeat has finished
    fn dispatch(&mut self, chunk: &DispatchChunk) -> Result<Vec<u64>>;
}

impl<B: ComputeBackend + ?Sized> ComputeBackend for Box<B> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn load(&mut self, program: KernelProgram) -> Result<()> {
        (**self).load(program)
    }

    fn dispatch(&mut self, chunk: &DispatchChunk) -> Result<Vec<u64>> {
        (**self).dispatch(chunk)
    }
}

/// Bind a backend for the requested device class.
///
/// Only the CPU backend is linked in; asking for a GPU explicitly fails.
pub fn open_backend(device: DeviceClass, threads: Option<usize>) -> Result<Box<dyn ComputeBackend>> {
    match device {
        DeviceClass::Cpu | DeviceClass::Any => {
            let backend = CpuBackend::new(threads)?;
            tracing::info!(
                device = %device,
                backend = backend.name(),
                threads = backend.threads(),
                "Compute backend ready"
            );
            Ok(Box::new(backend))
        }
        DeviceClass::Gpu => Err(SearchError::BackendInit {
            device,
            reason: "no GPU backend is available in this build".to_string(),
        }),
    }
}
