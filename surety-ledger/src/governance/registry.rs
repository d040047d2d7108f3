use std::collections::HashMap;

use tracing::info;

use surety_common::{Address, Result, SuretyError, Wei};

use super::airline::{Airline, AirlineStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominationOutcome {
    Registered,
    Pending { votes: usize, required: usize },
}

/// Airline registry with multi-party voting.
///
/// Up to `multiparty_threshold` registered members, any funded member can
/// register a newcomer on its own. Past that, a nominee waits as `Pending`
/// until a strict majority of the registered members has voted for it.
#[derive(Debug, Clone)]
pub struct AirlineGovernance {
    airlines: HashMap<Address, Airline>,
    registered: usize,
    multiparty_threshold: usize,
    min_funding: Wei,
}

impl AirlineGovernance {
    /// The genesis airline starts registered and unfunded.
    pub fn new(genesis: Address, multiparty_threshold: usize, min_funding: Wei) -> Self {
        let mut airlines = HashMap::new();
        airlines.insert(genesis, Airline::registered(genesis));
        Self {
            airlines,
            registered: 1,
            multiparty_threshold,
            min_funding,
        }
    }

    pub fn nominate(&mut self, nominee: Address, by: Address) -> Result<NominationOutcome> {
        self.ensure_funded_member(&by)?;

        match self.airlines.get(&nominee).map(|a| a.status) {
            Some(AirlineStatus::Registered) => {
                Err(SuretyError::AlreadyRegistered(format!("airline {nominee}")))
            }
            Some(AirlineStatus::Pending) => self.vote(nominee, by),
            None if self.registered <= self.multiparty_threshold => {
                self.airlines.insert(nominee, Airline::registered(nominee));
                self.registered += 1;
                info!("✈️ Airline {} registered directly by {}", nominee, by);
                Ok(NominationOutcome::Registered)
            }
            None => {
                self.airlines.insert(nominee, Airline::pending(nominee, by));
                let required = self.required_votes();
                info!("🗳️ Airline {} nominated by {} (1/{} votes)", nominee, by, required);
                Ok(NominationOutcome::Pending { votes: 1, required })
            }
        }
    }

    pub fn vote(&mut self, nominee: Address, by: Address) -> Result<NominationOutcome> {
        self.ensure_funded_member(&by)?;

        let required = self.required_votes();
        let airline = self
            .airlines
            .get_mut(&nominee)
            .ok_or(SuretyError::NotNominated(nominee))?;
        if airline.is_registered() {
            return Err(SuretyError::AlreadyRegistered(format!("airline {nominee}")));
        }
        if airline.votes.contains(&by) {
            return Err(SuretyError::DuplicateVote { nominee, voter: by });
        }

        airline.votes.insert(by);
        let votes = airline.votes.len();

        if votes >= required {
            airline.status = AirlineStatus::Registered;
            self.registered += 1;
            info!("✈️ Airline {} registered with {} votes", nominee, votes);
            return Ok(NominationOutcome::Registered);
        }

        info!("🗳️ Vote from {} for {} ({}/{})", by, nominee, votes, required);
        Ok(NominationOutcome::Pending { votes, required })
    }

    /// Adds `amount` to the airline's funds and returns the new total.
    pub fn fund(&mut self, airline: Address, amount: Wei) -> Result<Wei> {
        let min_funding = self.min_funding;
        let entry = self
            .airlines
            .get_mut(&airline)
            .ok_or_else(|| SuretyError::NotRegistered(format!("airline {airline}")))?;
        if amount < min_funding {
            return Err(SuretyError::InsufficientFunding {
                required: min_funding,
                provided: amount,
            });
        }
        entry.funds = entry.funds.saturating_add(amount);
        Ok(entry.funds)
    }

    /// Smallest vote count that is a strict majority of the registered members.
    pub fn required_votes(&self) -> usize {
        self.registered / 2 + 1
    }

    pub fn is_registered(&self, airline: &Address) -> bool {
        self.airlines.get(airline).map(Airline::is_registered).unwrap_or(false)
    }

    pub fn is_funded(&self, airline: &Address) -> bool {
        self.airlines
            .get(airline)
            .map(|a| a.is_funded(self.min_funding))
            .unwrap_or(false)
    }

    pub fn registered_count(&self) -> usize {
        self.registered
    }

    pub fn votes_for(&self, nominee: &Address) -> usize {
        self.airlines
            .get(nominee)
            .filter(|a| !a.is_registered())
            .map(|a| a.votes.len())
            .unwrap_or(0)
    }

    pub fn ensure_funded_member(&self, airline: &Address) -> Result<()> {
        if self.is_registered(airline) && self.is_funded(airline) {
            Ok(())
        } else {
            Err(SuretyError::NominatorNotFunded(*airline))
        }
    }
}
