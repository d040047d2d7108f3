use std::path::PathBuf;

use clap::Parser;

use crate::config::NodeConfig;

#[derive(Parser, Debug)]
#[command(name = "surety-node")]
#[command(about = "FlightSurety oracle network simulator")]
pub struct Args {
    /// JSON config file; defaults are used when it does not exist
    #[arg(short, long, value_name = "FILE", default_value = "surety.json")]
    pub config: PathBuf,

    /// Write the effective config back to --config and exit
    #[arg(long)]
    pub write_config: bool,

    #[arg(long)]
    pub oracles: Option<u32>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub passengers: Option<usize>,

    /// Force every oracle to report this status code (0, 10, 20, 30, 40, 50)
    #[arg(long, value_name = "CODE")]
    pub status: Option<u8>,

    /// Let every oracle draw its own status instead of one per request
    #[arg(long)]
    pub independent: bool,

    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Directory for the consensus audit log
    #[arg(long, value_name = "DIR", default_value = "logs")]
    pub log_dir: PathBuf,
}

impl Args {
    /// Flags win over the file.
    pub fn apply(&self, config: &mut NodeConfig) {
        if let Some(n) = self.oracles {
            config.simulation.oracle_count = n;
        }
        if let Some(seed) = self.seed {
            config.protocol.seed = seed;
            config.simulation.oracle_seed = seed;
        }
        if let Some(n) = self.passengers {
            config.simulation.passengers = n;
        }
        if self.status.is_some() {
            config.simulation.fixed_status = self.status;
        }
        if self.independent {
            config.simulation.independent_oracles = true;
        }
        if let Some(ms) = self.timeout_ms {
            config.simulation.finalization_timeout_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["surety-node", "--oracles", "40", "--seed", "9", "--status", "20"]);
        let mut config = NodeConfig::default();
        args.apply(&mut config);

        assert_eq!(config.simulation.oracle_count, 40);
        assert_eq!(config.protocol.seed, 9);
        assert_eq!(config.simulation.fixed_status, Some(20));
        assert_eq!(config.simulation.passengers, 3);
        assert!(!config.simulation.independent_oracles);
        assert_eq!(args.config, PathBuf::from("surety.json"));
    }

    #[test]
    fn test_independent_flag() {
        let args = Args::parse_from(["surety-node", "--independent"]);
        let mut config = NodeConfig::default();
        args.apply(&mut config);
        assert!(config.simulation.independent_oracles);
        assert_eq!(config.simulation.fixed_status, None);
    }
}
