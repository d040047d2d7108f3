use surety_common::{
    config::ProtocolConfig,
    env::events::{EventRecord, LedgerEvent},
    Address, Result, SuretyError, Wei,
};
use surety_consensus::{ConsensusAggregator, IndexAssigner, OracleRegistry, StatusRequestRouter};

use crate::{flights::FlightRegistry, governance::AirlineGovernance, insurance::InsuranceLedger};

/// Everything the ledger knows. Only mutated under the ledger's write lock.
#[derive(Debug, Clone)]
pub struct LedgerState {
    pub config: ProtocolConfig,
    pub admin: Address,
    pub operational: bool,
    pub oracles: OracleRegistry,
    pub router: StatusRequestRouter,
    pub aggregator: ConsensusAggregator,
    pub airlines: AirlineGovernance,
    pub flights: FlightRegistry,
    pub insurance: InsuranceLedger,
    /// Wei held by the contract: fees, airline funding and premiums, minus withdrawals.
    pub treasury: Wei,
    log: Vec<EventRecord>,
}

impl LedgerState {
    pub fn new(admin: Address, genesis_airline: Address, config: ProtocolConfig) -> Result<Self> {
        config.validate()?;

        let assigner = IndexAssigner::new(config.index_space, config.seed)?;
        Ok(Self {
            admin,
            operational: true,
            oracles: OracleRegistry::new(assigner),
            router: StatusRequestRouter::new(config.index_space, config.index_selection, config.seed),
            aggregator: ConsensusAggregator::new(config.min_responses, config.late_response_policy),
            airlines: AirlineGovernance::new(
                genesis_airline,
                config.multiparty_threshold,
                config.min_airline_funding,
            ),
            flights: FlightRegistry::new(),
            insurance: InsuranceLedger::new(
                config.max_premium,
                config.payout_numerator,
                config.payout_denominator,
            ),
            treasury: 0,
            log: Vec::new(),
            config,
        })
    }

    pub fn ensure_operational(&self) -> Result<()> {
        if self.operational {
            Ok(())
        } else {
            Err(SuretyError::OperationalityDisabled)
        }
    }

    pub fn deposit(&mut self, amount: Wei) {
        self.treasury = self.treasury.saturating_add(amount);
    }

    /// Appends committed events to the log, numbering them from 1.
    pub fn append(&mut self, events: Vec<LedgerEvent>) -> Vec<EventRecord> {
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let record = EventRecord {
                seq: self.log.len() as u64 + 1,
                event,
            };
            self.log.push(record.clone());
            records.push(record);
        }
        records
    }

    pub fn last_seq(&self) -> u64 {
        self.log.len() as u64
    }

    /// Records with `seq > after`.
    pub fn events_since(&self, after: u64) -> &[EventRecord] {
        let start = (after as usize).min(self.log.len());
        &self.log[start..]
    }
}
