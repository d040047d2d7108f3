pub mod cli;
pub mod config;
pub mod error;
pub mod runtime;
pub mod scenario;

pub use config::NodeConfig;
pub use error::{NodeError, Result};
pub use runtime::builder::{build_runtime, SuretyRuntime};
