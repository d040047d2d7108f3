//! utils.rs
//!
//! Value units shared by every crate.

pub mod amount;
