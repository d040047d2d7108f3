//! Ledger transactions, grouped by who calls them.

mod admin;
mod airline;
mod oracle;
mod passenger;
