pub mod config;
pub mod engine;
#[cfg(feature = "gst")]
pub mod gst_engine;
#[cfg(test)]
mod mock_engine;
pub mod session;
#[cfg(test)]
mod session_test;
pub mod app;

pub use config::RecorderConfig;
pub use session::{RecorderSession, RecordingState};
