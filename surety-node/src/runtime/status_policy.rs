use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use rand::{rngs::StdRng, Rng, SeedableRng};

use surety_common::{env::request::RequestKey, Address, StatusCode};

/// How a simulated oracle decides what to report.
pub trait StatusPolicy: Send + Sync {
    fn decide(&self, oracle: &Address, key: &RequestKey) -> StatusCode;
}

/// Draws one of the six codes per request. Every oracle looking at the same
/// request sees the same draw, like observers of the same flight would.
#[derive(Debug, Clone, Copy)]
pub struct RandomStatus {
    seed: u64,
}

impl RandomStatus {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl StatusPolicy for RandomStatus {
    fn decide(&self, _oracle: &Address, key: &RequestKey) -> StatusCode {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        StatusCode::ALL[rng.gen_range(0..StatusCode::ALL.len())]
    }
}

/// Every oracle draws its own code, so answers on one request disagree and
/// the first code to collect enough votes wins.
#[derive(Debug, Clone, Copy)]
pub struct IndependentRandomStatus {
    seed: u64,
}

impl IndependentRandomStatus {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl StatusPolicy for IndependentRandomStatus {
    fn decide(&self, oracle: &Address, key: &RequestKey) -> StatusCode {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        oracle.hash(&mut hasher);
        key.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());
        StatusCode::ALL[rng.gen_range(0..StatusCode::ALL.len())]
    }
}

/// Always reports the same code.
#[derive(Debug, Clone, Copy)]
pub struct FixedStatus(pub StatusCode);

impl StatusPolicy for FixedStatus {
    fn decide(&self, _oracle: &Address, _key: &RequestKey) -> StatusCode {
        self.0
    }
}
