use serde::Serialize;

use surety_common::{Address, FlightCode, Wei};

/// One passenger's cover on one flight. Repeated purchases add to the premium;
/// `payout` is fixed whenever the premium changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsurancePolicy {
    pub passenger: Address,
    pub flight: FlightCode,
    pub premium: Wei,
    pub payout: Wei,
    pub credited: bool,
}

impl InsurancePolicy {
    pub fn new(passenger: Address, flight: FlightCode, premium: Wei, payout: Wei) -> Self {
        Self {
            passenger,
            flight,
            premium,
            payout,
            credited: false,
        }
    }
}
