use std::collections::HashMap;

use serde::Serialize;

use surety_common::{Address, FlightCode, Result, StatusCode, SuretyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flight {
    pub airline: Address,
    pub code: FlightCode,
    pub timestamp: u64,
    /// Last finalized status, `Unknown` until oracles settle one.
    pub status: StatusCode,
}

/// Flights published by airlines. Codes are unique across airlines.
#[derive(Debug, Clone, Default)]
pub struct FlightRegistry {
    flights: HashMap<FlightCode, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, airline: Address, code: FlightCode, timestamp: u64) -> Result<()> {
        if self.flights.contains_key(&code) {
            return Err(SuretyError::AlreadyRegistered(format!("flight {code}")));
        }
        self.flights.insert(
            code,
            Flight {
                airline,
                code,
                timestamp,
                status: StatusCode::Unknown,
            },
        );
        Ok(())
    }

    pub fn is_registered(&self, code: &FlightCode) -> bool {
        self.flights.contains_key(code)
    }

    pub fn get(&self, code: &FlightCode) -> Option<&Flight> {
        self.flights.get(code)
    }

    /// Stores a finalized status when the flight belongs to `airline`.
    pub fn record_status(&mut self, airline: &Address, code: &FlightCode, status: StatusCode) -> bool {
        match self.flights.get_mut(code) {
            Some(flight) if flight.airline == *airline => {
                flight.status = status;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
