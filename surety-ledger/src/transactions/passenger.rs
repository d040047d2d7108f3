use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, warn};

use surety_common::{env::events::LedgerEvent, Address, FlightCode, Result, SuretyError, Wei};

use crate::{insurance::InsurancePolicy, Ledger};

impl Ledger {
    /// Buys or tops up insurance; returns the policy's total premium.
    pub async fn buy(&self, passenger: Address, flight: FlightCode, amount: Wei) -> Result<Wei> {
        self.transact(|state, events| {
            let total = state.insurance.buy(passenger, flight, amount)?;
            state.deposit(amount);
            info!("🛡️ {} insured on {} for {} wei", passenger, flight, total);
            events.push(LedgerEvent::InsurancePurchased { passenger, flight, amount });
            Ok(total)
        })
        .await
    }

    /// Pays out the passenger's credited balance through the transfer gateway.
    ///
    /// The balance is zeroed and the treasury debited before the transfer. If
    /// the gateway fails or exceeds `transfer_timeout_ms`, both are restored
    /// and `TransferFailed` is returned.
    pub async fn withdraw(&self, passenger: Address) -> Result<Wei> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        state.ensure_operational()?;

        let owed = state.insurance.credited_balance(&passenger);
        if owed == 0 {
            return Err(SuretyError::NoBalance(passenger));
        }
        if state.treasury < owed {
            return Err(SuretyError::TreasuryExhausted {
                available: state.treasury,
                requested: owed,
            });
        }

        let amount = state.insurance.take_balance(&passenger)?;
        state.treasury -= amount;

        let limit = Duration::from_millis(state.config.transfer_timeout_ms);
        let transferred = match timeout(limit, self.gateway.transfer(passenger, amount)).await {
            Ok(result) => result,
            Err(_) => Err(SuretyError::TransferFailed(format!("no answer from gateway after {limit:?}"))),
        };
        if let Err(e) = transferred {
            state.insurance.restore_balance(passenger, amount);
            state.deposit(amount);
            warn!("⚠️ Withdrawal of {} wei for {} reverted: {}", amount, passenger, e);
            return Err(match e {
                SuretyError::TransferFailed(_) => e,
                other => SuretyError::TransferFailed(other.to_string()),
            });
        }

        info!("🏧 {} withdrew {} wei", passenger, amount);
        self.commit(state, vec![LedgerEvent::Withdrawn { passenger, amount }]);
        Ok(amount)
    }

    pub async fn insurance_amount(&self, passenger: &Address, flight: &FlightCode) -> Wei {
        self.state.read().await.insurance.insurance_amount(passenger, flight)
    }

    pub async fn credited_balance(&self, passenger: &Address) -> Wei {
        self.state.read().await.insurance.credited_balance(passenger)
    }

    pub async fn policy(&self, passenger: &Address, flight: &FlightCode) -> Option<InsurancePolicy> {
        self.state.read().await.insurance.policy(passenger, flight).cloned()
    }
}
