//! CPU compute backend (rayon)

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use casc_core::{jenkins96_padded, write_candidate, DispatchChunk};

use crate::backend::{ComputeBackend, DeviceClass, KernelProgram};
use crate::error::{Result, SearchError};

/// Evaluates chunks on a dedicated rayon pool.
///
/// Each worker keeps its own copy of the padded template and rewrites only the
/// wildcard bytes per candidate, so the hot loop never allocates.
pub struct CpuBackend {
    pool: ThreadPool,
    program: Option<KernelProgram>,
}

impl CpuBackend {
    /// Create a backend with `threads` workers (all cores if `None`)
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("casc-cpu-{}", i));
        if let Some(threads) = threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build().map_err(|e| SearchError::BackendInit {
            device: DeviceClass::Cpu,
            reason: e.to_string(),
        })?;

        Ok(Self {
            pool,
            program: None,
        })
    }

    /// Number of worker threads
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn load(&mut self, program: KernelProgram) -> Result<()> {
        tracing::debug!(
            entry = program.entry_point(),
            mask = %program.mask(),
            targets = program.targets().target_count(),
            "Loaded kernel"
        );
        self.program = Some(program);
        Ok(())
    }

    fn dispatch(&mut self, chunk: &DispatchChunk) -> Result<Vec<u64>> {
        let fail = |reason: String| SearchError::Dispatch {
            offset: chunk.offset,
            work_size: chunk.work_size,
            repeat: chunk.repeat,
            reason,
        };

        let program = self
            .program
            .as_ref()
            .ok_or_else(|| fail("no kernel loaded".to_string()))?;
        let mask = program.mask();
        let targets = program.targets();

        if chunk.output_size != targets.len() {
            return Err(fail(format!(
                "output size {} does not match {} target hashes",
                chunk.output_size,
                targets.len()
            )));
        }

        let slots: Vec<AtomicU64> = (0..chunk.output_size).map(|_| AtomicU64::new(0)).collect();

        self.pool.install(|| {
            (0..chunk.work_size).into_par_iter().for_each_init(
                || mask.template().to_vec(),
                |buf, item| {
                    for r in 0..chunk.repeat {
                        let index = chunk.offset + r * chunk.work_size + item;
                        write_candidate(buf, mask, index);
                        let hash = jenkins96_padded(buf, mask.len());
                        if let Some(slot) = targets.slot_of(hash) {
                            slots[slot].store(index, Ordering::Relaxed);
                        }
                    }
                },
            );
        });

        Ok(slots.into_iter().map(AtomicU64::into_inner).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use casc_core::{candidate_index, hash_path, Mask, SearchSpace, TargetHashSet};

    fn program(mask: &str, mirrored: bool, secrets: &[&str]) -> KernelProgram {
        let hashes = secrets.iter().map(|s| hash_path(s));
        let targets = TargetHashSet::from_hashes(hashes).unwrap();
        KernelProgram::new(Mask::compile(mask, mirrored).unwrap(), Arc::new(targets))
    }

    #[test]
    fn test_dispatch_without_kernel_fails() {
        let mut backend = CpuBackend::new(Some(1)).unwrap();
        let chunk = DispatchChunk {
            offset: 0,
            work_size: 1,
            repeat: 1,
            output_size: 2,
        };
        assert!(matches!(
            backend.dispatch(&chunk),
            Err(SearchError::Dispatch { .. })
        ));
    }

    #[test]
    fn test_finds_target_in_slot() {
        let program = program("SOUND\\%%.OGG", false, &["SOUND\\QZ.OGG"]);
        let mask = program.mask().clone();
        let slot = program
            .targets()
            .slot_of(hash_path("SOUND\\QZ.OGG"))
            .unwrap();

        let mut backend = CpuBackend::new(Some(2)).unwrap();
        backend.load(program).unwrap();
        let space = SearchSpace::plan(&mask, 2).unwrap();
        let out = backend.dispatch(&space.chunks[0]).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(Some(out[slot]), candidate_index(&mask, "SOUND\\QZ.OGG"));
    }

    #[test]
    fn test_repeat_strides_cover_whole_space() {
        // 39^2 = 1521 = 39 repeats of 39; target sits in the last repeat
        let program = program("%%", false, &["\\Q"]);
        let mask = program.mask().clone();
        let slot = program.targets().slot_of(hash_path("\\Q")).unwrap();

        let mut backend = CpuBackend::new(Some(2)).unwrap();
        backend.load(program).unwrap();
        let space = SearchSpace::plan_with_ceiling(&mask, 2, 39).unwrap();
        assert_eq!(space.chunks.len(), 1);
        assert_eq!(space.chunks[0].repeat, 39);

        let out = backend.dispatch(&space.chunks[0]).unwrap();
        assert_eq!(Some(out[slot]), candidate_index(&mask, "\\Q"));
    }

    #[test]
    fn test_mirrored_kernel() {
        let program = program("%%\\%%", true, &["K7\\K7"]);
        let mask = program.mask().clone();
        let slot = program.targets().slot_of(hash_path("K7\\K7")).unwrap();

        let mut backend = CpuBackend::new(Some(2)).unwrap();
        backend.load(program).unwrap();
        let space = SearchSpace::plan(&mask, 2).unwrap();
        let out = backend.dispatch(&space.chunks[0]).unwrap();
        assert_eq!(Some(out[slot]), candidate_index(&mask, "K7\\K7"));
    }

    #[test]
    fn test_output_size_mismatch() {
        let mut backend = CpuBackend::new(Some(1)).unwrap();
        backend.load(program("%", false, &["A"])).unwrap();
        let chunk = DispatchChunk {
            offset: 0,
            work_size: 39,
            repeat: 1,
            output_size: 5,
        };
        assert!(backend.dispatch(&chunk).is_err());
    }
}
