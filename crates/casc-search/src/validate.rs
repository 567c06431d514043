//! Host-side validation of raw hits and result aggregation

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use casc_core::{decode_candidate, jenkins96, Mask, TargetHashSet};

use crate::dispatch::RawHitQueue;

/// Deduplicated result strings for the whole run
#[derive(Debug, Default)]
pub struct ResultSet {
    inner: Mutex<BTreeSet<String>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result; returns `false` if it was already present
    pub fn insert(&self, result: String) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(result)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .collect()
    }
}

/// Decodes raw hits for one mask and re-hashes them on the host
#[derive(Clone, Copy)]
pub struct Validator<'a> {
    mask: &'a Mask,
    targets: &'a TargetHashSet,
}

impl<'a> Validator<'a> {
    pub fn new(mask: &'a Mask, targets: &'a TargetHashSet) -> Self {
        Self { mask, targets }
    }

    /// Decode `index` and accept it only if it really hashes to a target
    pub fn check(&self, index: u64) -> Option<String> {
        let candidate = decode_candidate(self.mask, index)?;
        let hash = jenkins96(candidate.as_bytes());
        if self.targets.is_target(hash) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Drain the queue into `results`; returns the number of new results
    pub fn drain(&self, queue: &mut RawHitQueue, results: &ResultSet) -> usize {
        let hits = queue.drain();
        if hits.is_empty() {
            return 0;
        }

        hits.into_par_iter()
            .filter_map(|index| {
                let accepted = self.check(index);
                if accepted.is_none() {
                    tracing::trace!(index, mask = %self.mask, "Discarded false positive");
                }
                accepted
            })
            .filter(|candidate| results.insert(candidate.clone()))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casc_core::{candidate_index, hash_path};

    #[test]
    fn test_accepts_only_real_matches() {
        let mask = Mask::compile("AB%C", false).unwrap();
        let targets = TargetHashSet::from_hashes([hash_path("ABAC")]).unwrap();
        let validator = Validator::new(&mask, &targets);

        assert_eq!(validator.check(0).as_deref(), Some("ABAC"));
        assert_eq!(validator.check(1), None);
        assert_eq!(validator.check(39), None); // out of range
    }

    #[test]
    fn test_rejects_when_hash_not_targeted() {
        let mask = Mask::compile("AB%C", false).unwrap();
        let targets = TargetHashSet::from_hashes([hash_path("ABZC")]).unwrap();
        let validator = Validator::new(&mask, &targets);
        assert_eq!(validator.check(0), None);
    }

    #[test]
    fn test_drain_deduplicates() {
        let mask = Mask::compile("X%%", false).unwrap();
        let targets = TargetHashSet::from_hashes([hash_path("XQR"), hash_path("X12")]).unwrap();
        let validator = Validator::new(&mask, &targets);
        let results = ResultSet::new();

        let qr = candidate_index(&mask, "XQR").unwrap();
        let one_two = candidate_index(&mask, "X12").unwrap();

        let mut queue = RawHitQueue::new();
        queue.extend_from_slots(&[qr, qr, one_two, 3]);
        assert_eq!(validator.drain(&mut queue, &results), 2);
        assert!(queue.is_empty());

        queue.push(qr);
        assert_eq!(validator.drain(&mut queue, &results), 0);
        assert_eq!(results.into_vec(), vec!["X12".to_string(), "XQR".to_string()]);
    }

    #[test]
    fn test_mirrored_validation() {
        let mask = Mask::compile("%\\%", true).unwrap();
        let targets = TargetHashSet::from_hashes([hash_path("F\\F")]).unwrap();
        let validator = Validator::new(&mask, &targets);
        assert_eq!(validator.check(5).as_deref(), Some("F\\F"));
    }
}
