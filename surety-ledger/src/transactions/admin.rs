use tracing::{info, warn};

use surety_common::{env::events::LedgerEvent, Address, Result, SuretyError};

use crate::Ledger;

impl Ledger {
    /// Pauses or resumes every mutating transaction. Admin only, and allowed while paused.
    pub async fn set_operating_status(&self, caller: Address, operational: bool) -> Result<()> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        if caller != state.admin {
            warn!("⛔ {} tried to change the operating status", caller);
            return Err(SuretyError::NotAdministrator(caller));
        }
        if state.operational == operational {
            return Ok(());
        }

        state.operational = operational;
        info!(target: "consensus", "EVENT:OPERATIONAL operational={}", operational);
        self.commit(state, vec![LedgerEvent::OperationalStatusChanged { operational }]);
        Ok(())
    }
}
