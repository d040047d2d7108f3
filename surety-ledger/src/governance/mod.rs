pub mod airline;
pub mod registry;

pub use airline::{Airline, AirlineStatus};
pub use registry::{AirlineGovernance, NominationOutcome};
