pub mod ledger;
pub mod policy;

pub use ledger::InsuranceLedger;
pub use policy::InsurancePolicy;
