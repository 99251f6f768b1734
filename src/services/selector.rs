//! Random reviewer selection.
//!
//! One generator per engine instance, seeded at construction and used for
//! every draw afterwards. Draws are serialized through a mutex so a single
//! selector can be shared across concurrent requests.

use crate::models::User;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::sync::Mutex;

/// Picks reviewers uniformly at random, without replacement.
pub struct ReviewerSelector {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ReviewerSelector {
    /// Wrap any generator. Tests can pass a deterministic one.
    pub fn new<R: RngCore + Send + 'static>(rng: R) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Create a selector with a fixed seed; identical seeds yield identical picks.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Create a selector seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Pick up to `count` distinct user IDs from `candidates`.
    ///
    /// If there are no more candidates than requested, all of them are
    /// returned in their original order without consuming randomness.
    /// Otherwise the candidate indices are shuffled once and the first
    /// `count` are taken.
    pub fn pick(&self, candidates: &[User], count: usize) -> Vec<String> {
        if candidates.is_empty() || count == 0 {
            return Vec::new();
        }

        if candidates.len() <= count {
            return candidates.iter().map(|u| u.user_id.clone()).collect();
        }

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        {
            // A panic while holding the lock leaves the generator usable
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            order.shuffle(&mut *rng);
        }

        order
            .into_iter()
            .take(count)
            .map(|i| candidates[i].user_id.clone())
            .collect()
    }
}

impl std::fmt::Debug for ReviewerSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewerSelector").finish_non_exhaustive()
    }
}
