//! InfluxDb Client Library
//!
//! HTTP client for the InfluxDb administrative and data REST API.
//!
//! ```rust,no_run
//! use influxdb_rs::{Client, ClientConfig};
//!
//! # async fn run() -> influxdb_rs::Result<()> {
//! let client = Client::new(ClientConfig {
//!     database: "metrics".to_string(),
//!     ..Default::default()
//! });
//! client.ping().await?;
//! let series = client.query("select * from cpu").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod response;
mod transport;

pub use client::Client;
pub use influxdb_core::{ClientConfig, Record, ResolvedConfig, Scheme, Series, TimePrecision};
pub use transport::Transport;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The URL could not be parsed, contains control characters, or would
    /// be rewritten by the parser into a different path.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Non-2xx status. Invalid UTF-8 in the body is replaced with U+FFFD.
    #[error("Server returned ({status}): {body}")]
    Server { status: u16, body: String },
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
