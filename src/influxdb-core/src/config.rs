use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_HOST: &str = "localhost:8086";
pub const DEFAULT_USERNAME: &str = "root";
pub const DEFAULT_PASSWORD: &str = "root";

/// Connection settings as supplied by the caller.
///
/// Every field is optional: empty strings are replaced by defaults when the
/// config is resolved, so a blank config talks to `http://localhost:8086` as
/// `root`/`root`.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub is_secure: bool,
}

impl ClientConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        tracing::debug!(path, host = %config.host, "Loaded client config");
        Ok(config)
    }

    /// Merge with defaults. Never fails; no validation is applied.
    pub fn resolve(self) -> ResolvedConfig {
        ResolvedConfig {
            host: or_default(self.host, DEFAULT_HOST),
            username: or_default(self.username, DEFAULT_USERNAME),
            password: or_default(self.password, DEFAULT_PASSWORD),
            database: self.database,
            scheme: if self.is_secure {
                Scheme::Https
            } else {
                Scheme::Http
            },
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("is_secure", &self.is_secure)
            .finish()
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// URL scheme selected by `ClientConfig::is_secure`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration after defaults are applied. Read-only once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    host: String,
    username: String,
    password: String,
    database: String,
    scheme: Scheme,
}

impl ResolvedConfig {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// `<scheme>://<host>`, without a trailing slash
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .field("scheme", &self.scheme)
            .finish()
    }
}
