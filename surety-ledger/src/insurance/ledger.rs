use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info};

use surety_common::{
    address::ADDRESS_LEN, utils::amount::scale, Address, FlightCode, Result, StatusCode,
    SuretyError, Wei,
};

use super::policy::InsurancePolicy;

/// Policies, payout credits and the payout rule.
///
/// Credits are only ever added by `on_flight_finalized` and only ever removed
/// by `take_balance`; the contract treasury is owned by the ledger state.
#[derive(Debug, Clone)]
pub struct InsuranceLedger {
    policies: BTreeMap<(FlightCode, Address), InsurancePolicy>,
    balances: HashMap<Address, Wei>,
    max_premium: Wei,
    payout_numerator: u128,
    payout_denominator: u128,
}

impl InsuranceLedger {
    pub fn new(max_premium: Wei, payout_numerator: u128, payout_denominator: u128) -> Self {
        Self {
            policies: BTreeMap::new(),
            balances: HashMap::new(),
            max_premium,
            payout_numerator,
            payout_denominator,
        }
    }

    /// Records or tops up a policy and returns its total premium.
    pub fn buy(&mut self, passenger: Address, flight: FlightCode, amount: Wei) -> Result<Wei> {
        if amount == 0 {
            return Err(SuretyError::InvalidAmount("premium must be greater than zero".to_string()));
        }

        let existing = self.policies.get(&(flight, passenger));
        if let Some(policy) = existing.filter(|p| p.credited) {
            return Err(SuretyError::PolicyClosed {
                passenger: policy.passenger,
                flight: flight.to_string(),
            });
        }

        let total = existing.map(|p| p.premium).unwrap_or(0).saturating_add(amount);
        if total > self.max_premium {
            return Err(SuretyError::ExceedsMaxPremium {
                cap: self.max_premium,
                requested: total,
            });
        }
        let payout = scale(total, self.payout_numerator, self.payout_denominator).ok_or_else(|| {
            SuretyError::InvalidAmount(format!("payout on a premium of {total} wei overflows"))
        })?;

        self.policies
            .entry((flight, passenger))
            .and_modify(|p| {
                p.premium = total;
                p.payout = payout;
            })
            .or_insert_with(|| InsurancePolicy::new(passenger, flight, total, payout));
        debug!("🧾 Policy {} on {} now covers {} wei", passenger, flight, total);
        Ok(total)
    }

    /// Credits every open policy on `flight` when `status` is payable.
    /// Returns the credits made; a second call for the same flight returns none.
    pub fn on_flight_finalized(&mut self, flight: FlightCode, status: StatusCode) -> Vec<(Address, Wei)> {
        if !status.is_payable() {
            return Vec::new();
        }

        let mut credits = Vec::new();
        for policy in self.policies.range_mut(Self::flight_range(flight)).map(|(_, p)| p) {
            if policy.credited {
                continue;
            }
            let payout = policy.payout;
            policy.credited = true;
            let balance = self.balances.entry(policy.passenger).or_default();
            *balance = balance.saturating_add(payout);
            credits.push((policy.passenger, payout));
        }

        if !credits.is_empty() {
            info!("💸 {} policies credited for {} ({})", credits.len(), flight, status);
        }
        credits
    }

    /// Zeroes the passenger's credit and hands it back.
    pub fn take_balance(&mut self, passenger: &Address) -> Result<Wei> {
        match self.balances.remove(passenger) {
            Some(amount) if amount > 0 => Ok(amount),
            _ => Err(SuretyError::NoBalance(*passenger)),
        }
    }

    /// Undo of `take_balance` for a transfer that did not go through.
    pub fn restore_balance(&mut self, passenger: Address, amount: Wei) {
        let balance = self.balances.entry(passenger).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn credited_balance(&self, passenger: &Address) -> Wei {
        self.balances.get(passenger).copied().unwrap_or(0)
    }

    pub fn insurance_amount(&self, passenger: &Address, flight: &FlightCode) -> Wei {
        self.policy(passenger, flight).map(|p| p.premium).unwrap_or(0)
    }

    pub fn policy(&self, passenger: &Address, flight: &FlightCode) -> Option<&InsurancePolicy> {
        self.policies.get(&(*flight, *passenger))
    }

    pub fn policies_for(&self, flight: FlightCode) -> impl Iterator<Item = &InsurancePolicy> {
        self.policies.range(Self::flight_range(flight)).map(|(_, p)| p)
    }

    fn flight_range(flight: FlightCode) -> std::ops::RangeInclusive<(FlightCode, Address)> {
        (flight, Address::from_bytes([0u8; ADDRESS_LEN]))..=(flight, Address::from_bytes([0xffu8; ADDRESS_LEN]))
    }
}
