//! Administrative Operations Example
//!
//! Creates a database, a user in it and a cluster admin, lists them, then
//! cleans everything up again.
//!
//! Run with: cargo run --example admin

use influxdb_rs::{Client, ClientConfig};
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

    let config = ClientConfig::load("influxdb.json").unwrap_or_else(|_| {
        tracing::warn!("Failed to load influxdb.json, using defaults");
        ClientConfig::default()
    });
    let client = Client::new(config);

    client.ping().await?;
    println!("✅ Connected to {}\n", client.config().base_url());

    client.create_database("example_db").await?;
    client
        .create_database_user("example_db", "example_user", "changeme")
        .await?;
    client
        .alter_database_privilege("example_db", "example_user", true)
        .await?;
    client
        .authenticate_database_user("example_db", "example_user", "changeme")
        .await?;
    client.create_cluster_admin("example_admin", "changeme").await?;

    println!("📦 Databases:");
    for db in client.get_database_list().await? {
        println!("   {}", serde_json::Value::Object(db));
    }

    println!("👤 Users of example_db:");
    for user in client.get_database_user_list("example_db").await? {
        println!("   {}", serde_json::Value::Object(user));
    }

    println!("🔑 Cluster admins:");
    for admin in client.get_cluster_admin_list().await? {
        println!("   {}", serde_json::Value::Object(admin));
    }

    client.delete_cluster_admin("example_admin").await?;
    client
        .delete_database_user("example_db", "example_user")
        .await?;
    client.delete_database("example_db").await?;
    println!("\n🧹 Cleaned up");

    Ok(())
}
