use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use surety_common::{
    config::IndexSelection, env::request::RequestKey, Address, FlightCode, Result, SuretyError,
};

/// Picks the index a status query is broadcast under.
///
/// The router owns no request outcome. It only needs to know which keys are
/// already taken so a repeated query for the same flight gets a fresh key
/// instead of merging into an earlier one.
#[derive(Debug, Clone)]
pub struct StatusRequestRouter {
    selection: IndexSelection,
    index_space: u8,
    rng: StdRng,
    cursor: u8,
}

impl StatusRequestRouter {
    pub fn new(index_space: u8, selection: IndexSelection, seed: u64) -> Self {
        Self {
            selection,
            index_space,
            // Decorrelate from the assigner, which usually gets the same seed.
            rng: StdRng::seed_from_u64(seed.rotate_left(32) ^ 0x9E37_79B9_7F4A_7C15),
            cursor: 0,
        }
    }

    pub fn route<F>(
        &mut self,
        airline: Address,
        flight: FlightCode,
        timestamp: u64,
        in_use: F,
    ) -> Result<RequestKey>
    where
        F: Fn(&RequestKey) -> bool,
    {
        let base = RequestKey::new(0, airline, flight, timestamp);

        let index = match self.selection {
            IndexSelection::Random => {
                let free: Vec<u8> = (0..self.index_space)
                    .filter(|i| !in_use(&base.with_index(*i)))
                    .collect();
                if free.is_empty() {
                    return Err(SuretyError::RequestSpaceExhausted(format!(
                        "{}/{}@{}",
                        airline, flight, timestamp
                    )));
                }
                free[self.rng.gen_range(0..free.len())]
            }
            IndexSelection::RoundRobin => {
                let index = (0..self.index_space)
                    .map(|step| ((self.cursor as u16 + step as u16) % self.index_space as u16) as u8)
                    .find(|i| !in_use(&base.with_index(*i)))
                    .ok_or_else(|| {
                        SuretyError::RequestSpaceExhausted(format!(
                            "{}/{}@{}",
                            airline, flight, timestamp
                        ))
                    })?;
                self.cursor = ((index as u16 + 1) % self.index_space as u16) as u8;
                index
            }
        };

        let key = base.with_index(index);
        debug!("📡 Routed status query for {} under index {}", flight, index);
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn flight() -> FlightCode {
        FlightCode::new("UA3716").unwrap()
    }

    #[test]
    fn test_round_robin_cycles() {
        let mut router = StatusRequestRouter::new(4, IndexSelection::RoundRobin, 0);
        let airline = Address::derive("airline-0");

        let picked: Vec<u8> = (0..6u64)
            .map(|ts| router.route(airline, flight(), ts, |_| false).unwrap().index)
            .collect();
        assert_eq!(picked, vec![0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn test_random_stays_in_space() {
        let mut router = StatusRequestRouter::new(10, IndexSelection::Random, 3);
        let airline = Address::derive("airline-0");
        for ts in 0..100 {
            let key = router.route(airline, flight(), ts, |_| false).unwrap();
            assert!(key.index < 10);
            assert_eq!(key.timestamp, ts);
        }
    }

    #[test]
    fn test_repeat_query_gets_fresh_key() {
        let mut router = StatusRequestRouter::new(10, IndexSelection::Random, 3);
        let airline = Address::derive("airline-0");
        let mut taken: HashSet<RequestKey> = HashSet::new();

        for _ in 0..10 {
            let key = router.route(airline, flight(), 42, |k| taken.contains(k)).unwrap();
            assert!(taken.insert(key), "key {key} was handed out twice");
        }

        let err = router.route(airline, flight(), 42, |k| taken.contains(k)).unwrap_err();
        assert!(matches!(err, SuretyError::RequestSpaceExhausted(_)));
    }

    #[test]
    fn test_round_robin_skips_taken_indexes() {
        let mut router = StatusRequestRouter::new(5, IndexSelection::RoundRobin, 0);
        let airline = Address::derive("airline-0");
        let key = router.route(airline, flight(), 1, |k| k.index < 3).unwrap();
        assert_eq!(key.index, 3);
        let key = router.route(airline, flight(), 1, |k| k.index == 4).unwrap();
        assert_eq!(key.index, 0);
    }
}
