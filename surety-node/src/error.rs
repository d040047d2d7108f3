use std::time::Duration;

use thiserror::Error;

use surety_common::{env::request::RequestKey, SuretyError};

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] SuretyError),

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("no finalized status for {key} after {waited:?}")]
    Timeout { key: RequestKey, waited: Duration },

    #[error("unknown job {0}")]
    UnknownJob(uuid::Uuid),

    #[error("event stream closed")]
    ChannelClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NodeError>;
