//! The FlightSurety ledger: one owned state, one lock, one event log.
//!
//! Every mutating call is a transaction. It takes the write lock, checks all
//! of its preconditions, applies its effects and then appends the events it
//! produced to the log and to the broadcast channel. A rejected transaction
//! leaves no trace.

pub mod flights;
pub mod gateway;
pub mod governance;
pub mod insurance;
pub mod state;
pub mod transactions;

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use surety_common::{
    config::ProtocolConfig,
    env::events::{EventRecord, LedgerEvent},
    Address, Result, Wei,
};

use crate::gateway::{InMemoryGateway, TransferGateway};
use crate::state::LedgerState;

pub use flights::Flight;
pub use governance::NominationOutcome;
pub use surety_consensus::{OracleIndexes, RoundState, Submission};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct Ledger {
    state: Arc<RwLock<LedgerState>>,
    events: broadcast::Sender<EventRecord>,
    gateway: Arc<dyn TransferGateway>,
}

impl Ledger {
    pub fn new(admin: Address, genesis_airline: Address, config: ProtocolConfig) -> Result<Self> {
        Self::with_gateway(admin, genesis_airline, config, Arc::new(InMemoryGateway::new()))
    }

    pub fn with_gateway(
        admin: Address,
        genesis_airline: Address,
        config: ProtocolConfig,
        gateway: Arc<dyn TransferGateway>,
    ) -> Result<Self> {
        let state = LedgerState::new(admin, genesis_airline, config)?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        tracing::info!("📒 Ledger ready (admin {}, genesis airline {})", admin, genesis_airline);
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            events,
            gateway,
        })
    }

    /// Runs `tx` as one transaction while the contract is operational.
    pub(crate) async fn transact<T, F>(&self, tx: F) -> Result<T>
    where
        F: FnOnce(&mut LedgerState, &mut Vec<LedgerEvent>) -> Result<T>,
    {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.ensure_operational()?;

        let mut staged = Vec::new();
        let out = tx(&mut *state, &mut staged)?;
        self.commit(state, staged);
        Ok(out)
    }

    /// Appends and broadcasts under the caller's write guard so subscribers see log order.
    pub(crate) fn commit(&self, state: &mut LedgerState, staged: Vec<LedgerEvent>) {
        for record in state.append(staged) {
            // No subscribers is fine; the log keeps the record.
            let _ = self.events.send(record);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Log records after `seq`, for consumers that poll instead of subscribing.
    pub async fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        self.state.read().await.events_since(seq).to_vec()
    }

    pub async fn last_seq(&self) -> u64 {
        self.state.read().await.last_seq()
    }

    pub async fn is_operational(&self) -> bool {
        self.state.read().await.operational
    }

    pub async fn admin(&self) -> Address {
        self.state.read().await.admin
    }

    pub async fn config(&self) -> ProtocolConfig {
        self.state.read().await.config.clone()
    }

    pub async fn treasury(&self) -> Wei {
        self.state.read().await.treasury
    }

    pub fn gateway(&self) -> Arc<dyn TransferGateway> {
        Arc::clone(&self.gateway)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
