use rand::{rngs::StdRng, seq::index, SeedableRng};

use surety_common::{Result, SuretyError};

pub const INDEXES_PER_ORACLE: usize = 3;

/// Indexes held by one oracle, ascending.
pub type OracleIndexes = [u8; INDEXES_PER_ORACLE];

/// Hands out index sets at oracle registration.
///
/// Indexes are distinct within one oracle but overlap freely between oracles,
/// which is what lets several oracles answer the same request.
#[derive(Debug, Clone)]
pub struct IndexAssigner {
    rng: StdRng,
    index_space: u8,
}

impl IndexAssigner {
    pub fn new(index_space: u8, seed: u64) -> Result<Self> {
        if (index_space as usize) < INDEXES_PER_ORACLE {
            return Err(SuretyError::Config(format!(
                "index space of {} cannot hold {} distinct indexes",
                index_space, INDEXES_PER_ORACLE
            )));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            index_space,
        })
    }

    pub fn index_space(&self) -> u8 {
        self.index_space
    }

    pub fn assign(&mut self) -> OracleIndexes {
        let picked = index::sample(&mut self.rng, self.index_space as usize, INDEXES_PER_ORACLE);

        let mut indexes = [0u8; INDEXES_PER_ORACLE];
        for (slot, i) in indexes.iter_mut().zip(picked.iter()) {
            *slot = i as u8;
        }
        indexes.sort_unstable();
        indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_indexes_are_distinct_and_in_range() {
        let mut assigner = IndexAssigner::new(10, 99).unwrap();
        for _ in 0..200 {
            let indexes = assigner.assign();
            let unique: HashSet<u8> = indexes.iter().copied().collect();
            assert_eq!(unique.len(), INDEXES_PER_ORACLE);
            assert!(indexes.iter().all(|i| *i < 10));
            assert!(indexes.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = IndexAssigner::new(10, 7).unwrap();
        let mut b = IndexAssigner::new(10, 7).unwrap();
        let seq_a: Vec<_> = (0..20).map(|_| a.assign()).collect();
        let seq_b: Vec<_> = (0..20).map(|_| b.assign()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_sets_overlap_across_oracles() {
        let mut assigner = IndexAssigner::new(10, 1).unwrap();
        let sets: Vec<_> = (0..21).map(|_| assigner.assign()).collect();
        // 63 slots over 10 indexes: some index is necessarily shared.
        let mut counts = [0usize; 10];
        for set in &sets {
            for i in set {
                counts[*i as usize] += 1;
            }
        }
        assert!(counts.iter().any(|c| *c >= 3));
    }

    #[test]
    fn test_minimal_space_uses_every_index() {
        let mut assigner = IndexAssigner::new(3, 5).unwrap();
        assert_eq!(assigner.assign(), [0, 1, 2]);
        assert!(IndexAssigner::new(2, 5).is_err());
    }
}
