use std::collections::BTreeSet;

use serde::Serialize;

use surety_common::{Address, Wei};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AirlineStatus {
    Pending,
    Registered,
}

/// A nominated or registered airline. Funding is tracked independently of status.
#[derive(Debug, Clone, Serialize)]
pub struct Airline {
    pub identity: Address,
    pub status: AirlineStatus,
    pub funds: Wei,
    /// Registered airlines that backed the nomination.
    pub votes: BTreeSet<Address>,
}

impl Airline {
    pub fn pending(identity: Address, first_voter: Address) -> Self {
        Self {
            identity,
            status: AirlineStatus::Pending,
            funds: 0,
            votes: BTreeSet::from([first_voter]),
        }
    }

    pub fn registered(identity: Address) -> Self {
        Self {
            identity,
            status: AirlineStatus::Registered,
            funds: 0,
            votes: BTreeSet::new(),
        }
    }

    pub fn is_registered(&self) -> bool {
        self.status == AirlineStatus::Registered
    }

    pub fn is_funded(&self, min_funding: Wei) -> bool {
        self.funds >= min_funding
    }
}
