pub mod consensus;

pub use consensus::aggregator::{ConsensusAggregator, RoundState, Submission};
pub use consensus::assigner::{IndexAssigner, OracleIndexes, INDEXES_PER_ORACLE};
pub use consensus::registry::{Oracle, OracleRegistry};
pub use consensus::router::StatusRequestRouter;
