// Public module exports for the labdesk binary and integration tests
pub mod analysis;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod matrix;
#[cfg(feature = "tui")]
pub mod tui;

pub use error::{LabError, LabResult};
