//! consensus.rs
//!
//! Oracle consensus for flight status queries.
//!
//! Oracles receive a fixed set of indexes when they register. A status query is
//! routed under a single index and only oracles holding that index may answer;
//! the aggregator finalizes the first status code that collects a quorum of
//! matching answers and freezes it for that request key.
//!
//! Everything here is synchronous and owned: the ledger serializes access, so
//! these types never lock.

pub mod aggregator;
pub mod assigner;
pub mod registry;
pub mod router;
