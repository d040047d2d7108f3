use std::{collections::HashMap, sync::Arc, time::SystemTime};

use tokio::{
    sync::{broadcast, mpsc, Mutex},
    time::{sleep, timeout, Duration},
};
use tracing::{info, warn};
use uuid::Uuid;

use surety_common::{
    env::{
        events::{EventRecord, LedgerEvent},
        request::RequestKey,
    },
    Address, FlightCode, StatusCode,
};
use surety_ledger::Ledger;

use crate::error::{NodeError, Result};

/// A status query waiting to be raised on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusQuery {
    pub requester: Address,
    pub airline: Address,
    pub flight: FlightCode,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    /// Raised on the ledger under this key.
    Submitted(RequestKey),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct JobInfo {
    pub id: Uuid,
    pub query: StatusQuery,
    pub status: JobStatus,
    pub enqueued_at: SystemTime,
    pub finished_at: Option<SystemTime>,
}

impl JobInfo {
    fn new(id: Uuid, query: StatusQuery) -> Self {
        Self {
            id,
            query,
            status: JobStatus::Pending,
            enqueued_at: SystemTime::now(),
            finished_at: None,
        }
    }
}

#[derive(Debug)]
struct JobEnvelope {
    id: Uuid,
    query: StatusQuery,
}

/// Queue of status queries drained by a background task.
#[derive(Clone)]
pub struct StatusDispatcher {
    tx: mpsc::Sender<JobEnvelope>,
    jobs: Arc<Mutex<HashMap<Uuid, JobInfo>>>,
}

impl StatusDispatcher {
    pub fn new(ledger: Ledger, queue_cap: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<JobEnvelope>(queue_cap.max(1));
        let jobs: Arc<Mutex<HashMap<Uuid, JobInfo>>> = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn({
            let jobs = Arc::clone(&jobs);
            async move {
                while let Some(JobEnvelope { id, query }) = rx.recv().await {
                    let outcome = ledger
                        .request_status(query.requester, query.airline, query.flight, query.timestamp)
                        .await;

                    let mut j = jobs.lock().await;
                    if let Some(info) = j.get_mut(&id) {
                        info.finished_at = Some(SystemTime::now());
                        info.status = match outcome {
                            Ok(key) => {
                                info!("📡 Job {} raised {}", id, key);
                                JobStatus::Submitted(key)
                            }
                            Err(e) => {
                                warn!("⚠️ Job {} failed: {}", id, e);
                                JobStatus::Failed(e.to_string())
                            }
                        };
                    }
                }
            }
        });

        Self { tx, jobs }
    }

    pub async fn enqueue(&self, query: StatusQuery) -> Result<Uuid> {
        let id = Uuid::new_v4();
        {
            let mut j = self.jobs.lock().await;
            j.insert(id, JobInfo::new(id, query.clone()));
        }

        match self.tx.send(JobEnvelope { id, query }).await {
            Ok(()) => Ok(id),
            Err(e) => {
                self.jobs.lock().await.remove(&id);
                Err(NodeError::Dispatch(format!("enqueue failed: {e}")))
            }
        }
    }

    pub async fn job(&self, id: &Uuid) -> Option<JobInfo> {
        self.jobs.lock().await.get(id).cloned()
    }

    pub async fn list_jobs(&self) -> Vec<JobInfo> {
        self.jobs.lock().await.values().cloned().collect()
    }

    pub async fn list_pending_jobs(&self) -> Vec<JobInfo> {
        self.jobs
            .lock()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .cloned()
            .collect()
    }

    /// Waits until the job leaves `Pending` and returns the key it was raised under.
    pub async fn wait_for(&self, id: Uuid, limit: Duration) -> Result<RequestKey> {
        let poll = async {
            loop {
                match self.job(&id).await.map(|j| j.status) {
                    None => return Err(NodeError::UnknownJob(id)),
                    Some(JobStatus::Submitted(key)) => return Ok(key),
                    Some(JobStatus::Failed(reason)) => return Err(NodeError::Dispatch(reason)),
                    Some(JobStatus::Pending) => sleep(Duration::from_millis(5)).await,
                }
            }
        };
        timeout(limit, poll)
            .await
            .map_err(|_| NodeError::Dispatch(format!("job {id} still pending after {limit:?}")))?
    }
}

/// Waits for the `FlightStatusInfo` of `key`.
///
/// Subscribe before raising the request; a status finalized before the call is
/// picked up from the ledger directly.
pub async fn await_finalization(
    ledger: &Ledger,
    events: &mut broadcast::Receiver<EventRecord>,
    key: RequestKey,
    limit: Duration,
) -> Result<StatusCode> {
    if let Some(status) = ledger.flight_status(&key).await {
        return Ok(status);
    }

    let wait = async {
        loop {
            match events.recv().await {
                Ok(EventRecord { event: LedgerEvent::FlightStatusInfo { key: k, status }, .. }) if k == key => {
                    return Ok(status);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if let Some(status) = ledger.flight_status(&key).await {
                        return Ok(status);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return Err(NodeError::ChannelClosed),
            }
        }
    };

    timeout(limit, wait)
        .await
        .map_err(|_| NodeError::Timeout { key, waited: limit })?
}
