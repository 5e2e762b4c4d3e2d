//! Write and Query Example
//!
//! Writes a couple of points with second precision and reads them back.
//!
//! Run with: cargo run --example write_and_query

use influxdb_rs::{Client, ClientConfig, Series, TimePrecision};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("influxdb_rs=debug")),
        )
        .with_target(false)
        .init();

    let mut config = ClientConfig::load("influxdb.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load influxdb.json, using defaults");
        ClientConfig::default()
    });
    if config.database.is_empty() {
        config.database = "example_db".to_string();
    }
    let client = Client::new(config);

    let series = vec![Series::new("cpu_load", ["time", "host", "value"])
        .with_point(vec![json!(1_700_000_000), json!("server01"), json!(0.64)])
        .with_point(vec![json!(1_700_000_060), json!("server01"), json!(0.71)])];

    client
        .write_series_with_time_precision(&series, TimePrecision::Second)
        .await?;
    println!("📝 Wrote {} series to {}", series.len(), client.config().database());

    let results = client
        .query_with_time_precision("select value from cpu_load", TimePrecision::Second)
        .await?;

    println!("🔍 Query results:");
    for s in &results {
        println!("   {} {:?}", s.name, s.columns);
        for point in &s.points {
            println!("      {:?}", point);
        }
    }

    Ok(())
}
