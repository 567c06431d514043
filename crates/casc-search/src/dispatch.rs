//! Dispatch engine: drives a backend over a mask's chunks

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use casc_core::{DispatchChunk, Mask, TargetHashSet};

use crate::backend::{ComputeBackend, KernelProgram};
use crate::error::{Result, SearchError};

/// Pending candidate indices awaiting host validation
#[derive(Debug, Default)]
pub struct RawHitQueue {
    hits: VecDeque<u64>,
}

impl RawHitQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a single index unconditionally
    pub fn push(&mut self, index: u64) {
        self.hits.push_back(index);
    }

    /// Queue every non-zero slot of a dispatch result; returns how many
    pub fn extend_from_slots(&mut self, slots: &[u64]) -> usize {
        let before = self.hits.len();
        self.hits.extend(slots.iter().copied().filter(|&index| index != 0));
        self.hits.len() - before
    }

    /// Take everything queued so far
    pub fn drain(&mut self) -> Vec<u64> {
        self.hits.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Owns the backend binding for the run and feeds it one mask at a time
pub struct DispatchEngine<B: ComputeBackend> {
    backend: B,
}

impl<B: ComputeBackend> DispatchEngine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Program the backend with a mask and the target set
    pub fn prepare(&mut self, mask: &Mask, targets: Arc<TargetHashSet>) -> Result<()> {
        self.backend.load(KernelProgram::new(mask.clone(), targets))
    }

    /// Run one chunk to completion and queue its raw hits.
    ///
    /// Returns the number of hits queued.
    pub fn run(&mut self, chunk: &DispatchChunk, queue: &mut RawHitQueue) -> Result<usize> {
        let started = Instant::now();
        let slots = self.backend.dispatch(chunk)?;

        if slots.len() != chunk.output_size {
            return Err(SearchError::Dispatch {
                offset: chunk.offset,
                work_size: chunk.work_size,
                repeat: chunk.repeat,
                reason: format!(
                    "backend returned {} slots, expected {}",
                    slots.len(),
                    chunk.output_size
                ),
            });
        }

        let queued = queue.extend_from_slots(&slots);
        tracing::debug!(
            backend = self.backend.name(),
            offset = chunk.offset,
            work_size = chunk.work_size,
            repeat = chunk.repeat,
            raw_hits = queued,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Chunk dispatched"
        );
        Ok(queued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns canned slots regardless of the chunk
    struct CannedBackend {
        slots: Vec<u64>,
        loaded: bool,
    }

    impl ComputeBackend for CannedBackend {
        fn name(&self) -> &'static str {
            "canned"
        }

        fn load(&mut self, _program: KernelProgram) -> Result<()> {
            self.loaded = true;
            Ok(())
        }

        fn dispatch(&mut self, _chunk: &DispatchChunk) -> Result<Vec<u64>> {
            Ok(self.slots.clone())
        }
    }

    fn chunk(output_size: usize) -> DispatchChunk {
        DispatchChunk {
            offset: 0,
            work_size: 10,
            repeat: 1,
            output_size,
        }
    }

    #[test]
    fn test_queue_skips_empty_slots() {
        let mut queue = RawHitQueue::new();
        assert_eq!(queue.extend_from_slots(&[0, 7, 0, 9]), 2);
        queue.push(0);
        assert_eq!(queue.drain(), vec![7, 9, 0]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_run_queues_hits() {
        let mut engine = DispatchEngine::new(CannedBackend {
            slots: vec![0, 5, 0],
            loaded: false,
        });
        let mask = Mask::compile("%", false).unwrap();
        let targets = Arc::new(TargetHashSet::from_hashes([1, 2]).unwrap());
        engine.prepare(&mask, targets).unwrap();
        assert!(engine.backend().loaded);

        let mut queue = RawHitQueue::new();
        assert_eq!(engine.run(&chunk(3), &mut queue).unwrap(), 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_run_rejects_wrong_slot_count() {
        let mut engine = DispatchEngine::new(CannedBackend {
            slots: vec![0, 5],
            loaded: false,
        });
        let mut queue = RawHitQueue::new();
        let result = engine.run(&chunk(3), &mut queue);
        assert!(matches!(result, Err(SearchError::Dispatch { .. })));
        assert!(queue.is_empty());
    }
}
