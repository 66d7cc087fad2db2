//! Runtime configuration for the live pipeline.
//!
//! Loading and parsing the configuration file is handled by the agent
//! crate; these are the validated values the pipeline runs on.

mod config_store;
mod polling;

pub use config_store::{ConfigStore, ConfigWatcher};
pub use polling::PollingConfig;
