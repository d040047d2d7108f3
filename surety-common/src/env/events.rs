use serde::{Deserialize, Serialize};

use crate::{
    address::Address,
    env::{request::RequestKey, status::StatusCode},
    flight::FlightCode,
    utils::amount::Wei,
};

/// Log entries emitted by committed ledger transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    OperationalStatusChanged { operational: bool },
    OracleRegistered { oracle: Address, indexes: [u8; 3] },
    /// Oracles holding `key.index` are expected to answer.
    OracleRequest { key: RequestKey, requester: Address },
    OracleReport { key: RequestKey, oracle: Address, status: StatusCode },
    /// Quorum reached; the status for `key` is final.
    FlightStatusInfo { key: RequestKey, status: StatusCode },
    AirlineNominated { nominee: Address, by: Address, votes: usize, required: usize },
    AirlineRegistered { airline: Address },
    AirlineFunded { airline: Address, amount: Wei },
    FlightRegistered { airline: Address, flight: FlightCode, timestamp: u64 },
    InsurancePurchased { passenger: Address, flight: FlightCode, amount: Wei },
    InsureeCredited { passenger: Address, flight: FlightCode, payout: Wei },
    Withdrawn { passenger: Address, amount: Wei },
}

/// An event with its position in the ledger's append-only log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub event: LedgerEvent,
}
