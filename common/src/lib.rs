pub mod types;
pub mod events;
pub mod error;
pub mod engine;
pub mod lifecycle;
pub mod report;
pub mod run_loop;
#[cfg(test)]
mod run_loop_test;
pub mod config;
pub mod logging;
pub mod serde_helpers;
#[cfg(feature = "gst")]
pub mod gst_bridge;

pub use types::*;
pub use events::*;
pub use error::*;
