pub mod config;
pub mod policy;
pub mod engine;
#[cfg(feature = "gst")]
pub mod gst_engine;
#[cfg(test)]
mod mock_engine;
pub mod session;
pub mod app;

pub use config::PlayerConfig;
pub use session::{PlaybackState, PlayerSession};
