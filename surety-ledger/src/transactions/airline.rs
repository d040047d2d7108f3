use tracing::info;

use surety_common::{env::events::LedgerEvent, Address, FlightCode, Result, Wei};

use crate::{flights::Flight, governance::NominationOutcome, Ledger};

fn nomination_event(nominee: Address, by: Address, outcome: NominationOutcome) -> LedgerEvent {
    match outcome {
        NominationOutcome::Registered => {
            info!(target: "consensus", "EVENT:AIRLINE_REGISTERED airline={} by={}", nominee, by);
            LedgerEvent::AirlineRegistered { airline: nominee }
        }
        NominationOutcome::Pending { votes, required } => {
            info!(target: "consensus", "EVENT:AIRLINE_VOTE nominee={} by={} votes={} required={}", nominee, by, votes, required);
            LedgerEvent::AirlineNominated { nominee, by, votes, required }
        }
    }
}

impl Ledger {
    pub async fn nominate_airline(&self, by: Address, nominee: Address) -> Result<NominationOutcome> {
        self.transact(|state, events| {
            let outcome = state.airlines.nominate(nominee, by)?;
            events.push(nomination_event(nominee, by, outcome));
            Ok(outcome)
        })
        .await
    }

    pub async fn vote_airline(&self, by: Address, nominee: Address) -> Result<NominationOutcome> {
        self.transact(|state, events| {
            let outcome = state.airlines.vote(nominee, by)?;
            events.push(nomination_event(nominee, by, outcome));
            Ok(outcome)
        })
        .await
    }

    /// Pays airline funding into the treasury; returns the airline's total funds.
    pub async fn fund(&self, airline: Address, amount: Wei) -> Result<Wei> {
        self.transact(|state, events| {
            let total = state.airlines.fund(airline, amount)?;
            state.deposit(amount);
            info!("💰 Airline {} funded with {} wei (total {})", airline, amount, total);
            events.push(LedgerEvent::AirlineFunded { airline, amount });
            Ok(total)
        })
        .await
    }

    pub async fn register_flight(&self, airline: Address, flight: FlightCode, timestamp: u64) -> Result<()> {
        self.transact(|state, events| {
            state.airlines.ensure_funded_member(&airline)?;
            state.flights.register(airline, flight, timestamp)?;
            info!("🛫 Flight {} registered by {}", flight, airline);
            events.push(LedgerEvent::FlightRegistered { airline, flight, timestamp });
            Ok(())
        })
        .await
    }

    pub async fn is_airline_registered(&self, airline: &Address) -> bool {
        self.state.read().await.airlines.is_registered(airline)
    }

    pub async fn is_airline_funded(&self, airline: &Address) -> bool {
        self.state.read().await.airlines.is_funded(airline)
    }

    pub async fn registered_airline_count(&self) -> usize {
        self.state.read().await.airlines.registered_count()
    }

    pub async fn votes_for(&self, nominee: &Address) -> usize {
        self.state.read().await.airlines.votes_for(nominee)
    }

    pub async fn is_flight_registered(&self, flight: &FlightCode) -> bool {
        self.state.read().await.flights.is_registered(flight)
    }

    pub async fn flight(&self, flight: &FlightCode) -> Option<Flight> {
        self.state.read().await.flights.get(flight).cloned()
    }
}
