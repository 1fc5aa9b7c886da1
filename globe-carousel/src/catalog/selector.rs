//! Anti-repetition random selection.
//!
//! The selector remembers the codes of the most recently shown locations and
//! picks uniformly among the rest. The memory is bounded by
//! `min(configured_bound, catalog_size - 1)`, so against the full catalog at
//! least one location is always eligible.
//!
//! When the pick is restricted to a candidate subset (e.g. one region), the
//! recently-shown set can cover every candidate. In that case the set is
//! cleared and the pick retried exactly once.

use std::collections::VecDeque;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use super::dataset::Catalog;
use super::location::Location;

/// Default number of recently shown locations to avoid.
pub const DEFAULT_RECENT_BOUND: usize = 5;

/// Errors from the selection operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// There is nothing to choose from.
    #[error("no locations available to select from")]
    NoCandidates,
}

/// Random location picker that avoids recent repeats.
#[derive(Debug)]
pub struct NoRepeatSelector {
    catalog: Arc<Catalog>,
    recent: VecDeque<String>,
    bound: usize,
    clears: u64,
    rng: StdRng,
}

impl NoRepeatSelector {
    /// Create a selector seeded from the OS.
    pub fn new(catalog: Arc<Catalog>, recent_bound: usize) -> Self {
        Self::with_rng(catalog, recent_bound, StdRng::from_os_rng())
    }

    /// Create a selector with a deterministic seed.
    pub fn with_seed(catalog: Arc<Catalog>, recent_bound: usize, seed: u64) -> Self {
        Self::with_rng(catalog, recent_bound, StdRng::seed_from_u64(seed))
    }

    fn with_rng(catalog: Arc<Catalog>, recent_bound: usize, rng: StdRng) -> Self {
        let bound = recent_bound.min(catalog.len().saturating_sub(1));
        Self {
            catalog,
            recent: VecDeque::with_capacity(bound + 1),
            bound,
            clears: 0,
            rng,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Effective bound on the recently-shown set.
    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Codes currently suppressed, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    /// How many times the recently-shown set had to be cleared to find a pick.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// Uniform pick from the whole catalog, ignoring and not touching history.
    pub fn random_uniform(&mut self) -> Option<Location> {
        self.catalog.random_uniform(&mut self.rng).cloned()
    }

    /// Pick from the whole catalog, avoiding recently shown codes.
    pub fn select_no_repeat(&mut self) -> Result<Location, SelectionError> {
        let catalog = Arc::clone(&self.catalog);
        self.select_from(catalog.locations())
    }

    /// Pick from `candidates`, avoiding recently shown codes.
    pub fn select_from(&mut self, candidates: &[Location]) -> Result<Location, SelectionError> {
        if candidates.is_empty() {
            return Err(SelectionError::NoCandidates);
        }

        // One pass, plus at most one retry after clearing history.
        for _ in 0..2 {
            let available: Vec<&Location> = candidates
                .iter()
                .filter(|l| !self.recent.contains(&l.code))
                .collect();

            if available.is_empty() {
                tracing::debug!(
                    suppressed = self.recent.len(),
                    candidates = candidates.len(),
                    "Every candidate shown recently, clearing history"
                );
                self.recent.clear();
                self.clears += 1;
                continue;
            }

            let picked = available[self.rng.random_range(0..available.len())].clone();
            self.remember(&picked.code);
            return Ok(picked);
        }

        Err(SelectionError::NoCandidates)
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.recent.clear();
    }

    fn remember(&mut self, code: &str) {
        self.recent.retain(|c| c != code);
        self.recent.push_back(code.to_string());
        while self.recent.len() > self.bound {
            self.recent.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LatLng;
    use proptest::prelude::*;

    fn loc(code: &str) -> Location {
        Location::new(code, code, LatLng::new(0.0, 0.0), 4)
    }

    fn catalog_of(codes: &[&str]) -> Arc<Catalog> {
        Arc::new(Catalog::new(codes.iter().map(|c| loc(c)).collect()))
    }

    #[test]
    fn test_bound_is_clamped_to_catalog_size_minus_one() {
        let selector = NoRepeatSelector::with_seed(catalog_of(&["US", "FR", "JP"]), 10, 1);
        assert_eq!(selector.bound(), 2);

        let selector = NoRepeatSelector::with_seed(catalog_of(&["US", "FR", "JP"]), 1, 1);
        assert_eq!(selector.bound(), 1);
    }

    #[test]
    fn test_three_entry_catalog_never_repeats_consecutively() {
        let mut selector = NoRepeatSelector::with_seed(catalog_of(&["US", "FR", "JP"]), 2, 42);

        let picks: Vec<String> = (0..5)
            .map(|_| selector.select_no_repeat().unwrap().code)
            .collect();

        for pair in picks.windows(2) {
            assert_ne!(pair[0], pair[1], "consecutive repeat in {:?}", picks);
        }
        // With the bound at N-1 the first three picks cover the catalog.
        let first_three: std::collections::HashSet<_> = picks[..3].iter().collect();
        assert_eq!(first_three.len(), 3);
        assert_eq!(selector.clear_count(), 0);
    }

    #[test]
    fn test_recent_set_evicts_oldest() {
        let mut selector = NoRepeatSelector::with_seed(catalog_of(&["A", "B", "C", "D"]), 2, 3);
        let first = selector.select_no_repeat().unwrap().code;
        let second = selector.select_no_repeat().unwrap().code;
        let third = selector.select_no_repeat().unwrap().code;

        let recent: Vec<_> = selector.recent().collect();
        assert_eq!(recent, vec![second.as_str(), third.as_str()]);
        assert!(!recent.contains(&first.as_str()));
    }

    #[test]
    fn test_subset_exhaustion_clears_and_retries() {
        let catalog = catalog_of(&["US", "FR", "JP", "DE", "IT"]);
        let mut selector = NoRepeatSelector::with_seed(Arc::clone(&catalog), 4, 9);
        let subset: Vec<Location> = vec![loc("US"), loc("FR")];

        let a = selector.select_from(&subset).unwrap().code;
        let b = selector.select_from(&subset).unwrap().code;
        assert_ne!(a, b);
        assert_eq!(selector.clear_count(), 0);

        // Both subset members are now recent: the third pick must clear first.
        let c = selector.select_from(&subset).unwrap().code;
        assert_eq!(selector.clear_count(), 1);
        assert!(c == "US" || c == "FR");
        assert_eq!(selector.recent().collect::<Vec<_>>(), vec![c.as_str()]);
    }

    #[test]
    fn test_empty_candidates_is_an_error() {
        let mut selector = NoRepeatSelector::with_seed(Arc::new(Catalog::default()), 5, 1);
        assert_eq!(selector.select_no_repeat(), Err(SelectionError::NoCandidates));
        assert!(selector.random_uniform().is_none());
    }

    #[test]
    fn test_single_entry_catalog_always_returns_it() {
        let mut selector = NoRepeatSelector::with_seed(catalog_of(&["US"]), 5, 1);
        assert_eq!(selector.bound(), 0);
        for _ in 0..3 {
            assert_eq!(selector.select_no_repeat().unwrap().code, "US");
        }
    }

    #[test]
    fn test_reset_clears_history() {
        let mut selector = NoRepeatSelector::with_seed(catalog_of(&["A", "B", "C"]), 2, 5);
        selector.select_no_repeat().unwrap();
        selector.select_no_repeat().unwrap();
        assert_eq!(selector.recent().count(), 2);

        selector.reset();
        assert_eq!(selector.recent().count(), 0);
    }

    #[test]
    fn test_random_uniform_does_not_touch_history() {
        let mut selector = NoRepeatSelector::with_seed(catalog_of(&["A", "B", "C"]), 2, 5);
        for _ in 0..10 {
            selector.random_uniform().unwrap();
        }
        assert_eq!(selector.recent().count(), 0);
    }

    proptest! {
        #[test]
        fn prop_no_repeat_within_bound_window(seed in any::<u64>(), bound in 1usize..6) {
            let codes = ["US", "CA", "BR", "FR", "DE", "JP", "CN", "IN", "AU", "EG"];
            let mut selector = NoRepeatSelector::with_seed(catalog_of(&codes), bound, seed);

            let picks: Vec<String> = (0..40)
                .map(|_| selector.select_no_repeat().unwrap().code)
                .collect();

            for window in picks.windows(bound + 1) {
                let unique: std::collections::HashSet<_> = window.iter().collect();
                prop_assert_eq!(unique.len(), window.len(), "repeat in {:?}", window);
            }
            prop_assert_eq!(selector.clear_count(), 0);
        }
    }
}
