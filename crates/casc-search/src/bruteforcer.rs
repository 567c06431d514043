//! Run orchestration: masks in, validated names out
//!
//! Masks are processed strictly one after another since they all share the
//! single backend binding. For each mask:
//!
//! 1. compile (invalid masks are skipped with a warning)
//! 2. plan the chunk sequence
//! 3. program the backend
//! 4. dispatch chunks in order, validating each chunk's hits before the next
//!
//! A dispatch failure abandons the rest of that mask only; results validated
//! before the failure are kept.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use casc_core::{Mask, SearchSpace, TargetHashSet};

use crate::backend::ComputeBackend;
use crate::config::SearchConfig;
use crate::dispatch::{DispatchEngine, RawHitQueue};
use crate::error::{Result, SearchError};
use crate::validate::{ResultSet, Validator};

/// Read masks from a file (every line with a wildcard) or take one inline
pub fn load_masks(arg: &str) -> Result<Vec<String>> {
    let path = Path::new(arg);
    let masks: Vec<String> = if path.is_file() {
        std::fs::read_to_string(path)?
            .lines()
            .filter(|line| line.contains('%'))
            .map(str::to_string)
            .collect()
    } else if arg.contains('%') {
        vec![arg.to_string()]
    } else {
        Vec::new()
    };

    if masks.is_empty() {
        return Err(SearchError::Configuration(format!(
            "no valid masks in `{}`",
            arg
        )));
    }
    Ok(masks)
}

/// How a single mask ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MaskStatus {
    Completed,
    Skipped { reason: String },
    Failed { reason: String },
}

/// Per-mask summary
#[derive(Debug, Clone, Serialize)]
pub struct MaskOutcome {
    pub mask: String,
    #[serde(flatten)]
    pub status: MaskStatus,
    /// Total combinations, as a decimal string (may exceed 64 bits)
    pub combinations: String,
    pub chunks: usize,
    pub raw_hits: usize,
    pub accepted: usize,
    pub elapsed_secs: f64,
}

impl MaskOutcome {
    fn skipped(mask: &str, reason: String) -> Self {
        Self {
            mask: mask.to_string(),
            status: MaskStatus::Skipped { reason },
            combinations: "0".to_string(),
            chunks: 0,
            raw_hits: 0,
            accepted: 0,
            elapsed_secs: 0.0,
        }
    }
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub config: SearchConfig,
    pub target_count: usize,
    pub outcomes: Vec<MaskOutcome>,
    pub results: Vec<String>,
}

/// Sequential mask driver over one backend
pub struct Bruteforcer<B: ComputeBackend> {
    engine: DispatchEngine<B>,
    targets: Arc<TargetHashSet>,
    config: SearchConfig,
    ceiling: Option<u64>,
}

impl<B: ComputeBackend> Bruteforcer<B> {
    pub fn new(backend: B, targets: Arc<TargetHashSet>, config: SearchConfig) -> Self {
        Self {
            engine: DispatchEngine::new(backend),
            targets,
            config,
            ceiling: None,
        }
    }

    /// Override the per-dispatch work size ceiling
    pub fn with_ceiling(mut self, ceiling: u64) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Process every mask in order
    pub fn run(&mut self, masks: &[String]) -> SearchReport {
        self.run_with_progress(masks, |_| {})
    }

    /// Process every mask in order, reporting each outcome as it completes
    pub fn run_with_progress<F>(&mut self, masks: &[String], mut on_mask: F) -> SearchReport
    where
        F: FnMut(&MaskOutcome),
    {
        tracing::info!(
            backend = self.engine.backend().name(),
            masks = masks.len(),
            targets = self.targets.target_count(),
            mirrored = self.config.mirrored,
            "Starting search"
        );

        let results = ResultSet::new();
        let mut outcomes = Vec::with_capacity(masks.len());
        for raw in masks {
            let outcome = self.run_mask(raw, &results);
            on_mask(&outcome);
            outcomes.push(outcome);
        }

        SearchReport {
            config: self.config.clone(),
            target_count: self.targets.target_count(),
            outcomes,
            results: results.into_vec(),
        }
    }

    /// Search one mask, adding validated names to `results`
    pub fn run_mask(&mut self, raw: &str, results: &ResultSet) -> MaskOutcome {
        let started = Instant::now();

        let mask = match Mask::compile(raw, self.config.mirrored) {
            Ok(mask) => mask,
            Err(e) => {
                tracing::warn!(mask = raw.trim(), error = %e, "Skipping mask");
                return MaskOutcome::skipped(raw, e.to_string());
            }
        };

        let planned = match self.ceiling {
            Some(ceiling) => SearchSpace::plan_with_ceiling(&mask, self.targets.len(), ceiling),
            None => SearchSpace::plan(&mask, self.targets.len()),
        };
        let space = match planned {
            Ok(space) => space,
            Err(e) => {
                tracing::warn!(mask = %mask, error = %e, "Skipping mask");
                return MaskOutcome::skipped(mask.text(), e.to_string());
            }
        };

        let mut outcome = MaskOutcome {
            mask: mask.text().to_string(),
            status: MaskStatus::Completed,
            combinations: space.total.to_string(),
            chunks: space.chunks.len(),
            raw_hits: 0,
            accepted: 0,
            elapsed_secs: 0.0,
        };

        tracing::info!(
            mask = %mask,
            combinations = %space.total,
            loops = space.loops,
            remainder = space.remainder,
            "Starting Jenkins hashing"
        );

        if let Err(e) = self.engine.prepare(&mask, Arc::clone(&self.targets)) {
            tracing::error!(mask = %mask, error = %e, "Failed to load kernel");
            outcome.status = MaskStatus::Failed {
                reason: e.to_string(),
            };
            return outcome;
        }

        let validator = Validator::new(&mask, &self.targets);
        let mut queue = RawHitQueue::new();

        // The backend uses 0 for "no hit", so candidate 0 is checked here
        queue.push(0);
        outcome.accepted += validator.drain(&mut queue, results);

        for chunk in &space.chunks {
            match self.engine.run(chunk, &mut queue) {
                Ok(queued) => {
                    outcome.raw_hits += queued;
                    outcome.accepted += validator.drain(&mut queue, results);
                }
                Err(e) => {
                    tracing::error!(mask = %mask, error = %e, "Dispatch failed, abandoning mask");
                    outcome.status = MaskStatus::Failed {
                        reason: e.to_string(),
                    };
                    break;
                }
            }
        }

        outcome.elapsed_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            mask = %mask,
            raw_hits = outcome.raw_hits,
            accepted = outcome.accepted,
            "Completed in {:.2} secs",
            outcome.elapsed_secs
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casc_core::{hash_path, DispatchChunk};

    use crate::backend::KernelProgram;
    use crate::cpu::CpuBackend;

    /// Fails every dispatch after the first `ok` ones
    struct FlakyBackend {
        inner: CpuBackend,
        ok: usize,
    }

    impl ComputeBackend for FlakyBackend {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn load(&mut self, program: KernelProgram) -> Result<()> {
            self.inner.load(program)
        }

        fn dispatch(&mut self, chunk: &DispatchChunk) -> Result<Vec<u64>> {
            if self.ok == 0 {
                return Err(SearchError::Dispatch {
                    offset: chunk.offset,
                    work_size: chunk.work_size,
                    repeat: chunk.repeat,
                    reason: "device lost".to_string(),
                });
            }
            self.ok -= 1;
            self.inner.dispatch(chunk)
        }
    }

    fn targets(names: &[&str]) -> Arc<TargetHashSet> {
        Arc::new(TargetHashSet::from_hashes(names.iter().map(|n| hash_path(n))).unwrap())
    }

    fn cpu() -> CpuBackend {
        CpuBackend::new(Some(2)).unwrap()
    }

    #[test]
    fn test_finds_names_across_masks() {
        let mut bf = Bruteforcer::new(
            cpu(),
            targets(&["MAPS\\AZ.WDT", "SOUND\\K9.OGG"]),
            SearchConfig::default(),
        );
        let masks = vec!["maps/%%.wdt".to_string(), "SOUND\\%%.OGG".to_string()];
        let report = bf.run(&masks);

        assert_eq!(report.results, vec!["MAPS\\AZ.WDT", "SOUND\\K9.OGG"]);
        assert!(report
            .outcomes
            .iter()
            .all(|o| o.status == MaskStatus::Completed));
        assert_eq!(report.outcomes[0].combinations, "1521");
    }

    #[test]
    fn test_invalid_mask_skipped_others_continue() {
        let mut bf = Bruteforcer::new(cpu(), targets(&["AB"]), SearchConfig::default());
        let masks = vec!["%".repeat(13), "A%".to_string()];
        let report = bf.run(&masks);

        assert!(matches!(report.outcomes[0].status, MaskStatus::Skipped { .. }));
        assert_eq!(report.outcomes[0].chunks, 0);
        assert_eq!(report.outcomes[1].status, MaskStatus::Completed);
        assert_eq!(report.results, vec!["AB"]);
    }

    #[test]
    fn test_candidate_zero_is_found() {
        // "AAA" is index 0 and can never be reported by the backend
        let mut bf = Bruteforcer::new(cpu(), targets(&["AAA"]), SearchConfig::default());
        let report = bf.run(&["%%%".to_string()]);
        assert_eq!(report.results, vec!["AAA"]);
    }

    #[test]
    fn test_mirrored_run() {
        let config = SearchConfig {
            mirrored: true,
            ..SearchConfig::default()
        };
        let mut bf = Bruteforcer::new(cpu(), targets(&["QX_QX"]), config);
        let report = bf.run(&["%%_%%".to_string(), "%%%".to_string()]);

        assert_eq!(report.results, vec!["QX_QX"]);
        assert!(matches!(report.outcomes[1].status, MaskStatus::Skipped { .. }));
    }

    #[test]
    fn test_multi_chunk_with_small_ceiling() {
        let mut bf = Bruteforcer::new(cpu(), targets(&["Z9-"]), SearchConfig::default())
            .with_ceiling(1000);
        let report = bf.run(&["%%%".to_string()]);

        assert_eq!(report.outcomes[0].chunks, 2);
        assert_eq!(report.results, vec!["Z9-"]);
    }

    #[test]
    fn test_dispatch_failure_keeps_earlier_results() {
        // Two chunks: [0, 59000) looped, then the remainder; "AAB" lives in the first
        let backend = FlakyBackend { inner: cpu(), ok: 1 };
        let mut bf = Bruteforcer::new(backend, targets(&["AAB", "\\\\\\"]), SearchConfig::default())
            .with_ceiling(1000);
        let report = bf.run(&["%%%".to_string(), "X%".to_string()]);

        assert!(matches!(report.outcomes[0].status, MaskStatus::Failed { .. }));
        assert_eq!(report.results, vec!["AAB"]);
        // The next mask still runs (and fails on its first dispatch)
        assert!(matches!(report.outcomes[1].status, MaskStatus::Failed { .. }));
    }

    #[test]
    fn test_load_masks_inline_and_file() {
        assert_eq!(load_masks("A%B").unwrap(), vec!["A%B"]);
        assert!(matches!(
            load_masks("NO_WILDCARD"),
            Err(SearchError::Configuration(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("masks.txt");
        std::fs::write(&path, "first\\%%\nno wildcard here\n\nsecond/%.m2\n").unwrap();
        let masks = load_masks(path.to_str().unwrap()).unwrap();
        assert_eq!(masks, vec!["first\\%%", "second/%.m2"]);
    }

    #[test]
    fn test_report_serializes() {
        let mut bf = Bruteforcer::new(cpu(), targets(&["AB"]), SearchConfig::default());
        let report = bf.run(&["A%".to_string()]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcomes"][0]["status"], "completed");
        assert_eq!(json["results"][0], "AB");
        assert_eq!(json["config"]["device"], "any");
    }
}
