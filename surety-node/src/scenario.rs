//! End-to-end run: onboard airlines, publish flights, sell policies, poll the
//! oracles and pay out.

use serde::Serialize;
use tokio::time::Duration;
use tracing::{info, warn};

use surety_common::{Address, FlightCode, StatusCode, SuretyError, Wei};
use surety_ledger::NominationOutcome;

use crate::{
    config::NodeConfig,
    error::{NodeError, Result},
    runtime::{
        builder::SuretyRuntime,
        dispatcher::{await_finalization, StatusQuery},
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct FlightReport {
    pub code: String,
    pub airline: Address,
    pub request: Option<String>,
    /// Finalized code, `None` when the oracles did not settle in time.
    pub status: Option<StatusCode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassengerReport {
    pub passenger: Address,
    pub flight: String,
    pub premium: Wei,
    pub withdrawn: Wei,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub oracles: usize,
    pub registered_airlines: usize,
    pub flights: Vec<FlightReport>,
    pub passengers: Vec<PassengerReport>,
    pub treasury: Wei,
    pub events: u64,
}

pub async fn run_scenario(runtime: &SuretyRuntime, config: &NodeConfig) -> Result<ScenarioReport> {
    let ledger = &runtime.ledger;
    let funding = config.protocol.min_airline_funding;

    ledger.fund(runtime.genesis_airline, funding).await?;
    let mut members = vec![runtime.genesis_airline];

    for n in 1..=config.simulation.extra_airlines {
        let nominee = Address::derive(&format!("airline-{n}"));
        onboard_airline(runtime, &members, nominee).await?;
        ledger.fund(nominee, funding).await?;
        members.push(nominee);
    }
    info!("✈️ {} airlines registered and funded", members.len());

    let mut flights = Vec::new();
    for (i, plan) in config.simulation.flights.iter().enumerate() {
        let code = FlightCode::new(&plan.code)?;
        let airline = members[i % members.len()];
        ledger.register_flight(airline, code, plan.timestamp).await?;
        flights.push((code, airline, plan.timestamp));
    }

    let mut passengers = Vec::new();
    if !flights.is_empty() {
        for n in 0..config.simulation.passengers {
            let passenger = Address::derive(&format!("passenger-{n}"));
            let (code, _, _) = flights[n % flights.len()];
            let premium = ledger.buy(passenger, code, config.simulation.premium).await?;
            passengers.push((passenger, code, premium));
        }
    }

    let limit = Duration::from_millis(config.simulation.finalization_timeout_ms);
    let mut flight_reports = Vec::new();
    for (code, airline, timestamp) in &flights {
        let mut events = ledger.subscribe();
        let job = runtime
            .dispatcher
            .enqueue(StatusQuery {
                requester: runtime.admin,
                airline: *airline,
                flight: *code,
                timestamp: *timestamp,
            })
            .await?;
        let key = runtime.dispatcher.wait_for(job, limit).await?;

        let status = match await_finalization(ledger, &mut events, key, limit).await {
            Ok(status) => {
                info!("🛬 {} settled as {}", code, status);
                Some(status)
            }
            Err(NodeError::Timeout { .. }) => {
                warn!("⏳ {} not settled within {:?}", code, limit);
                None
            }
            Err(e) => return Err(e),
        };

        flight_reports.push(FlightReport {
            code: code.to_string(),
            airline: *airline,
            request: Some(key.to_string()),
            status,
        });
    }

    let mut passenger_reports = Vec::new();
    for (passenger, code, premium) in passengers {
        let withdrawn = match ledger.withdraw(passenger).await {
            Ok(amount) => amount,
            Err(SuretyError::NoBalance(_)) => 0,
            Err(e) => return Err(e.into()),
        };
        passenger_reports.push(PassengerReport {
            passenger,
            flight: code.to_string(),
            premium,
            withdrawn,
        });
    }

    Ok(ScenarioReport {
        oracles: ledger.oracle_count().await,
        registered_airlines: ledger.registered_airline_count().await,
        flights: flight_reports,
        passengers: passenger_reports,
        treasury: ledger.treasury().await,
        events: ledger.last_seq().await,
    })
}

/// Nominates `nominee` and, past the multiparty threshold, collects votes from
/// the other members until it is registered.
async fn onboard_airline(runtime: &SuretyRuntime, members: &[Address], nominee: Address) -> Result<()> {
    let ledger = &runtime.ledger;
    let mut outcome = ledger.nominate_airline(members[0], nominee).await?;

    for voter in &members[1..] {
        if outcome == NominationOutcome::Registered {
            break;
        }
        outcome = ledger.vote_airline(*voter, nominee).await?;
    }

    match outcome {
        NominationOutcome::Registered => Ok(()),
        NominationOutcome::Pending { votes, required } => Err(NodeError::Dispatch(format!(
            "airline {nominee} stuck at {votes}/{required} votes"
        ))),
    }
}

/// Total paid out divided by total premiums, in thousandths.
pub fn payout_ratio_permille(report: &ScenarioReport) -> u128 {
    let premiums: Wei = report.passengers.iter().map(|p| p.premium).sum();
    let withdrawn: Wei = report.passengers.iter().map(|p| p.withdrawn).sum();
    if premiums == 0 {
        return 0;
    }
    withdrawn.saturating_mul(1000) / premiums
}
