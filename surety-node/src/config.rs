use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use surety_common::{config::ProtocolConfig, ether, Wei};

/// A flight the scenario registers and insures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub code: String,
    pub timestamp: u64,
}

/// Parameters of the simulated network around the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub oracle_count: u32,
    /// Seeds the oracle signing keys.
    pub oracle_seed: u64,
    /// Airlines onboarded after the genesis airline.
    pub extra_airlines: usize,
    pub passengers: usize,
    pub premium: Wei,
    pub flights: Vec<FlightPlan>,
    /// Every oracle answers with this code instead of drawing one.
    pub fixed_status: Option<u8>,
    /// Oracles draw their codes independently instead of sharing one per request.
    pub independent_oracles: bool,
    /// Probability that an oracle silently skips a request.
    pub drop_rate: f64,
    pub finalization_timeout_ms: u64,
    pub dispatch_queue: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            oracle_count: 21,
            oracle_seed: 7,
            extra_airlines: 5,
            passengers: 3,
            premium: ether(1),
            flights: vec![
                FlightPlan { code: "UA3716".to_string(), timestamp: 1_700_000_000 },
                FlightPlan { code: "ND1309".to_string(), timestamp: 1_700_003_600 },
                FlightPlan { code: "AA0042".to_string(), timestamp: 1_700_007_200 },
            ],
            fixed_status: None,
            independent_oracles: false,
            drop_rate: 0.0,
            finalization_timeout_ms: 5_000,
            dispatch_queue: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub protocol: ProtocolConfig,
    pub simulation: SimulationConfig,
}

impl NodeConfig {
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        fs::write(path, json)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        let parsed = serde_json::from_str::<NodeConfig>(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        parsed
            .protocol
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(parsed)
    }
}
