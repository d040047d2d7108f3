use thiserror::Error;

use crate::{address::Address, utils::amount::Wei};

/// Reasons a ledger transaction is rejected.
///
/// The `Display` text is the revert reason surfaced to callers; every variant
/// is raised before any state is touched, so a rejected transaction never
/// leaves partial effects behind.
#[derive(Debug, Error)]
pub enum SuretyError {
    #[error("{0} is already registered")]
    AlreadyRegistered(String),

    #[error("{0} is not registered")]
    NotRegistered(String),

    #[error("oracle {oracle} does not hold index {index}")]
    UnauthorizedOracle { oracle: Address, index: u8 },

    /// Only registered airlines that have paid their funding may take part in governance.
    #[error("airline {0} is not a funded, registered airline")]
    NominatorNotFunded(Address),

    #[error("airline {voter} already voted for {nominee}")]
    DuplicateVote { nominee: Address, voter: Address },

    #[error("airline {0} has not been nominated")]
    NotNominated(Address),

    #[error("insufficient funding: required {required} wei, provided {provided} wei")]
    InsufficientFunding { required: Wei, provided: Wei },

    #[error("insufficient fee: required {required} wei, provided {provided} wei")]
    InsufficientFee { required: Wei, provided: Wei },

    #[error("premium of {requested} wei exceeds the cap of {cap} wei")]
    ExceedsMaxPremium { cap: Wei, requested: Wei },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("policy of {passenger} on {flight} was already paid out")]
    PolicyClosed { passenger: Address, flight: String },

    #[error("{0} has no balance to withdraw")]
    NoBalance(Address),

    #[error("treasury holds {available} wei, cannot pay {requested} wei")]
    TreasuryExhausted { available: Wei, requested: Wei },

    #[error("transfer failed: {0}")]
    TransferFailed(String),

    #[error("contract is currently not operational")]
    OperationalityDisabled,

    #[error("{0} is not the contract administrator")]
    NotAdministrator(Address),

    #[error("no open request for {0}")]
    UnknownRequest(String),

    #[error("request {0} is already finalized")]
    RequestClosed(String),

    #[error("oracle {oracle} already responded to {key}")]
    DuplicateResponse { oracle: Address, key: String },

    #[error("every index is already in use for {0}")]
    RequestSpaceExhausted(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid flight code: {0}")]
    InvalidFlightCode(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("status code {0} is not known")]
    InvalidStatusCode(u8),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SuretyError>;
