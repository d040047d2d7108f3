pub mod builder;
pub mod dispatcher;
pub mod oracle_worker;
pub mod status_policy;
