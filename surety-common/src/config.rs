use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SuretyError},
    utils::amount::{ether, scale, Wei},
};

/// What to do with responses that arrive after a request has been finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateResponsePolicy {
    /// Record for audit, leave the outcome alone.
    #[default]
    AcceptAndIgnore,
    /// Reject the transaction with `RequestClosed`.
    Reject,
}

/// How the router picks the index a request is broadcast under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSelection {
    #[default]
    Random,
    RoundRobin,
}

/// Protocol constants of a ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Indexes are drawn from `0..index_space`.
    pub index_space: u8,
    /// Matching responses needed to finalize a request.
    pub min_responses: usize,
    /// Registered-airline count up to which nominations register directly.
    pub multiparty_threshold: usize,
    pub min_airline_funding: Wei,
    pub max_premium: Wei,
    pub payout_numerator: u128,
    pub payout_denominator: u128,
    pub oracle_registration_fee: Wei,
    /// Upper bound on a single withdrawal transfer.
    pub transfer_timeout_ms: u64,
    pub late_response_policy: LateResponsePolicy,
    pub index_selection: IndexSelection,
    /// Seeds index assignment and request routing.
    pub seed: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            index_space: 10,
            min_responses: 3,
            multiparty_threshold: 4,
            min_airline_funding: ether(10),
            max_premium: ether(1),
            payout_numerator: 3,
            payout_denominator: 2,
            oracle_registration_fee: ether(1),
            transfer_timeout_ms: 10_000,
            late_response_policy: LateResponsePolicy::AcceptAndIgnore,
            index_selection: IndexSelection::Random,
            seed: 0,
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.index_space < 3 {
            return Err(SuretyError::Config(format!(
                "index_space must hold at least 3 indexes, got {}",
                self.index_space
            )));
        }
        if self.min_responses == 0 {
            return Err(SuretyError::Config("min_responses must be at least 1".to_string()));
        }
        if self.payout_denominator == 0 {
            return Err(SuretyError::Config("payout_denominator must be non-zero".to_string()));
        }
        if self.max_premium == 0 {
            return Err(SuretyError::Config("max_premium must be non-zero".to_string()));
        }
        if scale(self.max_premium, self.payout_numerator, self.payout_denominator).is_none() {
            return Err(SuretyError::Config(format!(
                "payout of {}/{} on max_premium {} overflows",
                self.payout_numerator, self.payout_denominator, self.max_premium
            )));
        }
        if self.transfer_timeout_ms == 0 {
            return Err(SuretyError::Config("transfer_timeout_ms must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<ProtocolConfig>(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(parsed)
    }
}
