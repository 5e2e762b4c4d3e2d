//! InfluxDb Core Library
//!
//! Shared building blocks for the InfluxDb HTTP client:
//! - Wire types for series writes and query results
//! - Time precision codes
//! - Client configuration and default resolution

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::{ClientConfig, ResolvedConfig, Scheme};
pub use models::*;
