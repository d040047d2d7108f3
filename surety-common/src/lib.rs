//! Shared vocabulary of the FlightSurety oracle network: identities, flight
//! codes, status codes, request/response payloads, ledger events, protocol
//! configuration and the error taxonomy.

pub mod address;
pub mod auth;
pub mod config;
pub mod env;
pub mod error;
pub mod flight;
pub mod utils;

pub use address::Address;
pub use error::{Result, SuretyError};
pub use flight::FlightCode;
pub use env::status::StatusCode;
pub use utils::amount::{ether, Wei};
