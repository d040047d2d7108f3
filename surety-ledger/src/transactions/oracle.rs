use tracing::{info, warn};

use surety_common::{
    env::{events::LedgerEvent, request::RequestKey, response::SignedResponse},
    Address, FlightCode, Result, StatusCode, SuretyError, Wei,
};
use surety_consensus::{OracleIndexes, RoundState, Submission};

use crate::Ledger;

impl Ledger {
    /// Registers an oracle for `fee` wei and returns the indexes it will serve.
    pub async fn register_oracle(&self, oracle: Address, fee: Wei) -> Result<OracleIndexes> {
        self.transact(|state, events| {
            if state.oracles.is_registered(&oracle) {
                return Err(SuretyError::AlreadyRegistered(format!("oracle {oracle}")));
            }
            let required = state.config.oracle_registration_fee;
            if fee < required {
                return Err(SuretyError::InsufficientFee { required, provided: fee });
            }

            let indexes = state.oracles.register(oracle)?;
            state.deposit(fee);
            events.push(LedgerEvent::OracleRegistered { oracle, indexes });
            Ok(indexes)
        })
        .await
    }

    pub async fn get_my_indexes(&self, oracle: Address) -> Result<OracleIndexes> {
        self.state.read().await.oracles.indexes_of(&oracle)
    }

    pub async fn oracle_count(&self) -> usize {
        self.state.read().await.oracles.len()
    }

    /// Opens a status query for a flight. Oracles holding the returned key's
    /// index are expected to answer. A registered flight can only be queried
    /// under the airline that registered it.
    pub async fn request_status(
        &self,
        requester: Address,
        airline: Address,
        flight: FlightCode,
        timestamp: u64,
    ) -> Result<RequestKey> {
        self.transact(|state, events| {
            if let Some(registered) = state.flights.get(&flight) {
                if registered.airline != airline {
                    return Err(SuretyError::NotRegistered(format!("flight {flight} for airline {airline}")));
                }
            }
            let aggregator = &state.aggregator;
            let key = state
                .router
                .route(airline, flight, timestamp, |k| aggregator.contains(k))?;
            state.aggregator.open(key, requester)?;

            info!("📨 Status of {} requested by {} under index {}", flight, requester, key.index);
            events.push(LedgerEvent::OracleRequest { key, requester });
            Ok(key)
        })
        .await
    }

    /// Accepts one signed oracle answer. On quorum the status is final: the
    /// flight record is updated and, for airline delays, policies are credited.
    /// Policies on a flight owned by another airline than the key's are left alone.
    pub async fn submit_oracle_response(&self, signed: SignedResponse) -> Result<Submission> {
        self.transact(|state, events| {
            signed.verify()?;
            let response = &signed.response;
            let key = response.key();

            let outcome = state.aggregator.submit_response(&state.oracles, response)?;
            match outcome {
                Submission::RecordedLate { .. } => return Ok(outcome),
                Submission::Tallied { .. } | Submission::Finalized(_) => {
                    events.push(LedgerEvent::OracleReport {
                        key,
                        oracle: response.oracle,
                        status: response.status,
                    });
                }
            }

            if let Submission::Finalized(status) = outcome {
                events.push(LedgerEvent::FlightStatusInfo { key, status });
                let recorded = state.flights.record_status(&key.airline, &key.flight, status);
                if !recorded && state.flights.is_registered(&key.flight) {
                    warn!("⚠️ {} finalized {} under airline {}, which does not own it", key.flight, status, key.airline);
                    return Ok(outcome);
                }

                for (passenger, payout) in state.insurance.on_flight_finalized(key.flight, status) {
                    info!(target: "consensus", "EVENT:CREDIT passenger={} flight={} payout={}", passenger, key.flight, payout);
                    events.push(LedgerEvent::InsureeCredited {
                        passenger,
                        flight: key.flight,
                        payout,
                    });
                }
            }
            Ok(outcome)
        })
        .await
        .map_err(|e| {
            warn!("⚠️ Oracle response from {} rejected: {}", signed.response.oracle, e);
            e
        })
    }

    /// Finalized status of a request key, `None` while it is still open or unknown.
    pub async fn flight_status(&self, key: &RequestKey) -> Option<StatusCode> {
        self.state.read().await.aggregator.status_of(key)
    }

    pub async fn request_state(&self, key: &RequestKey) -> Option<RoundState> {
        self.state.read().await.aggregator.state(key)
    }

    pub async fn response_tally(&self, key: &RequestKey, status: StatusCode) -> usize {
        self.state.read().await.aggregator.tally(key, status)
    }
}
