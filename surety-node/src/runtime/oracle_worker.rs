use std::sync::Arc;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use surety_common::{
    auth::OracleSigner,
    env::{
        events::{EventRecord, LedgerEvent},
        request::RequestKey,
        response::StatusResponse,
    },
};
use surety_ledger::{Ledger, OracleIndexes, Submission};

use super::status_policy::StatusPolicy;

/// Off-ledger oracle: listens for `OracleRequest` events and answers the ones
/// routed to an index it holds.
pub struct OracleWorker {
    signer: OracleSigner,
    indexes: OracleIndexes,
    ledger: Ledger,
    policy: Arc<dyn StatusPolicy>,
    drop_rate: f64,
    rng: StdRng,
    last_seq: u64,
}

impl OracleWorker {
    pub fn new(
        signer: OracleSigner,
        indexes: OracleIndexes,
        ledger: Ledger,
        policy: Arc<dyn StatusPolicy>,
        drop_rate: f64,
        seed: u64,
    ) -> Self {
        Self {
            signer,
            indexes,
            ledger,
            policy,
            drop_rate: if drop_rate.is_nan() { 0.0 } else { drop_rate.clamp(0.0, 1.0) },
            rng: StdRng::seed_from_u64(seed),
            last_seq: 0,
        }
    }

    /// Records up to `seq` were published before this worker subscribed.
    pub fn starting_at(mut self, seq: u64) -> Self {
        self.last_seq = seq;
        self
    }

    pub fn spawn(
        mut self,
        mut events: broadcast::Receiver<EventRecord>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("🔭 Oracle {} listening on indexes {:?}", self.signer.address(), self.indexes);
            loop {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    received = events.recv() => match received {
                        Ok(record) => self.on_record(record).await,
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!("⚠️ Oracle {} lagged by {} events, replaying from the log", self.signer.address(), missed);
                            self.catch_up().await;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            debug!("Oracle {} stopped", self.signer.address());
        })
    }

    async fn catch_up(&mut self) {
        for record in self.ledger.events_since(self.last_seq).await {
            self.on_record(record).await;
        }
    }

    async fn on_record(&mut self, record: EventRecord) {
        if record.seq <= self.last_seq {
            return;
        }
        self.last_seq = record.seq;
        if let LedgerEvent::OracleRequest { key, .. } = record.event {
            self.answer(key).await;
        }
    }

    async fn answer(&mut self, key: RequestKey) {
        if !self.indexes.contains(&key.index) {
            return;
        }
        if self.drop_rate > 0.0 && self.rng.gen_bool(self.drop_rate) {
            debug!("Oracle {} skipped {}", self.signer.address(), key);
            return;
        }

        let status = self.policy.decide(&self.signer.address(), &key);
        let signed = match self
            .signer
            .sign_response(StatusResponse::new(self.signer.address(), &key, status))
        {
            Ok(signed) => signed,
            Err(e) => {
                warn!("⚠️ Oracle {} could not sign: {}", self.signer.address(), e);
                return;
            }
        };

        match self.ledger.submit_oracle_response(signed).await {
            Ok(Submission::Finalized(status)) => {
                info!("🏁 Oracle {} closed {} with {}", self.signer.address(), key, status)
            }
            Ok(outcome) => debug!("Oracle {} on {}: {:?}", self.signer.address(), key, outcome),
            // The ledger already logs the rejection reason.
            Err(_) => {}
        }
    }
}
