use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{address::Address, flight::FlightCode};

/// A routed status query. Doubles as the aggregation key: responses are only
/// ever tallied against the exact `(index, airline, flight, timestamp)` tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestKey {
    pub index: u8,
    pub airline: Address,
    pub flight: FlightCode,
    pub timestamp: u64,
}

impl RequestKey {
    pub fn new(index: u8, airline: Address, flight: FlightCode, timestamp: u64) -> Self {
        Self { index, airline, flight, timestamp }
    }

    /// Same flight query, different index.
    pub fn with_index(&self, index: u8) -> Self {
        Self { index, ..*self }
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}@{}", self.index, self.airline, self.flight, self.timestamp)
    }
}
