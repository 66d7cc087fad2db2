#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::panic))]
#![forbid(unsafe_code)]

pub mod config;
pub mod consumers;
pub mod detectors;
pub mod events;
pub mod ledger;
pub mod pipeline;
pub mod processors;
pub mod source;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use pipeline::LivePipeline;
