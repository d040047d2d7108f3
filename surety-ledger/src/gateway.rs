use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use surety_common::{Address, Result, SuretyError, Wei};

/// Outbound value transfer used by withdrawals.
#[async_trait]
pub trait TransferGateway: Send + Sync {
    async fn transfer(&self, to: Address, amount: Wei) -> Result<()>;
}

/// Wallet balances kept in memory. Can be switched into a failing mode to
/// exercise the withdrawal rollback.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    wallets: Mutex<HashMap<Address, Wei>>,
    failing: AtomicBool,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn balance_of(&self, wallet: &Address) -> Wei {
        self.wallets.lock().await.get(wallet).copied().unwrap_or(0)
    }
}

#[async_trait]
impl TransferGateway for InMemoryGateway {
    async fn transfer(&self, to: Address, amount: Wei) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SuretyError::TransferFailed(format!("wallet {to} rejected {amount} wei")));
        }
        let mut wallets = self.wallets.lock().await;
        let balance = wallets.entry(to).or_default();
        *balance = balance.saturating_add(amount);
        debug!("🏦 Transferred {} wei to {}", amount, to);
        Ok(())
    }
}
