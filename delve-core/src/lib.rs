//! Delve Core - shared data structures, capability traits and infrastructure
//!
//! Errors, logging and configuration used by every other delve crate

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tracing;
