//! Test fixtures for coordsim engines.
//!
//! Provides literal memberships for scenario tests and seeded random
//! memberships for property-style sweeps. Everything is deterministic for a
//! given seed so a failing case can be replayed.

use coordsim_types::{ProcessId, RingTopology};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

/// Turn raw integers into process IDs, keeping order.
pub fn ids(raw: &[u64]) -> Vec<ProcessId> {
    raw.iter().copied().map(ProcessId).collect()
}

/// Build a topology in the given order.
///
/// # Panics
///
/// Panics if `raw` contains duplicates.
pub fn ring(raw: &[u64]) -> RingTopology {
    RingTopology::new(ids(raw)).expect("fixture membership must not contain duplicates")
}

/// A random membership: `len` distinct IDs below `max_id`, in shuffled order.
///
/// # Panics
///
/// Panics if `len > max_id`.
pub fn random_membership(rng: &mut impl Rng, len: usize, max_id: u64) -> Vec<ProcessId> {
    assert!(len as u64 <= max_id, "cannot draw {len} distinct IDs below {max_id}");

    let mut chosen = BTreeSet::new();
    while chosen.len() < len {
        chosen.insert(rng.gen_range(0..max_id));
    }

    let mut members: Vec<ProcessId> = chosen.into_iter().map(ProcessId).collect();
    members.shuffle(rng);
    members
}

/// Deterministic stream of random memberships for sweeps.
///
/// Yields `cases` memberships with sizes in `1..=max_len`.
pub fn membership_cases(seed: u64, cases: usize, max_len: usize) -> Vec<Vec<ProcessId>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..cases)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            random_membership(&mut rng, len, (max_len as u64) * 10)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_membership_is_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let members = random_membership(&mut rng, 20, 25);
        let unique: BTreeSet<_> = members.iter().collect();
        assert_eq!(unique.len(), 20);
    }

    #[test]
    fn test_cases_are_reproducible() {
        assert_eq!(membership_cases(42, 5, 8), membership_cases(42, 5, 8));
    }
}
