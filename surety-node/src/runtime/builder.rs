use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::info;

use surety_common::{auth::OracleSigner, Address, StatusCode};
use surety_ledger::{gateway::InMemoryGateway, Ledger};

use crate::{
    config::NodeConfig,
    error::Result,
    runtime::{
        dispatcher::StatusDispatcher,
        oracle_worker::OracleWorker,
        status_policy::{FixedStatus, IndependentRandomStatus, RandomStatus, StatusPolicy},
    },
};

pub const ADMIN_LABEL: &str = "admin";
pub const GENESIS_AIRLINE_LABEL: &str = "airline-0";

pub struct SuretyRuntime {
    pub ledger: Ledger,
    pub gateway: Arc<InMemoryGateway>,
    pub dispatcher: StatusDispatcher,
    pub admin: Address,
    pub genesis_airline: Address,
    pub oracles: Vec<Address>,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl SuretyRuntime {
    /// Stops every oracle worker and waits for them to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for worker in self.workers {
            let _ = worker.await;
        }
        info!("🛑 Runtime stopped");
    }
}

/// Policy named by the config: a fixed code when one is set, random otherwise.
pub fn policy_from_config(config: &NodeConfig) -> Result<Arc<dyn StatusPolicy>> {
    let seed = config.protocol.seed;
    let policy: Arc<dyn StatusPolicy> = match config.simulation.fixed_status {
        Some(code) => Arc::new(FixedStatus(StatusCode::try_from(code)?)),
        None if config.simulation.independent_oracles => Arc::new(IndependentRandomStatus::new(seed)),
        None => Arc::new(RandomStatus::new(seed)),
    };
    Ok(policy)
}

/// Creates the ledger, registers `oracle_count` oracles (paying the fee) and
/// spawns one worker task per oracle.
pub async fn build_runtime(config: &NodeConfig, policy: Arc<dyn StatusPolicy>) -> Result<SuretyRuntime> {
    let admin = Address::derive(ADMIN_LABEL);
    let genesis_airline = Address::derive(GENESIS_AIRLINE_LABEL);
    let gateway = Arc::new(InMemoryGateway::new());

    let ledger = Ledger::with_gateway(admin, genesis_airline, config.protocol.clone(), gateway.clone())?;
    info!("🔄 Registering {} oracles...", config.simulation.oracle_count);

    let fee = config.protocol.oracle_registration_fee;
    let (shutdown, shutdown_rx) = watch::channel(false);
    let mut oracles = Vec::new();
    let mut workers = Vec::new();

    for n in 0..config.simulation.oracle_count {
        let signer = OracleSigner::derive(config.simulation.oracle_seed, n);
        let address = signer.address();
        let indexes = ledger.register_oracle(address, fee).await?;

        let events = ledger.subscribe();
        let worker = OracleWorker::new(
            signer,
            indexes,
            ledger.clone(),
            Arc::clone(&policy),
            config.simulation.drop_rate,
            config.simulation.oracle_seed ^ u64::from(n),
        )
        .starting_at(ledger.last_seq().await);

        workers.push(worker.spawn(events, shutdown_rx.clone()));
        oracles.push(address);
    }

    let dispatcher = StatusDispatcher::new(ledger.clone(), config.simulation.dispatch_queue);
    info!("✅ Runtime ready with {} oracle workers", workers.len());

    Ok(SuretyRuntime {
        ledger,
        gateway,
        dispatcher,
        admin,
        genesis_airline,
        oracles,
        shutdown,
        workers,
    })
}
