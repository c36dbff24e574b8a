use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PATH: &str = "/metrics";

/// Where the exposition server listens. Empty strings and a zero port mean
/// "use the default".
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, JsonSchema)]
pub struct MetricsServerConfig {
    /// Interface to bind, defaults to `0.0.0.0`.
    #[serde(default)]
    pub host: String,
    /// TCP port, defaults to `8080`.
    #[serde(default)]
    pub port: u16,
    /// URL path of the scrape endpoint, defaults to `/metrics`.
    #[serde(default)]
    pub path: String,
}

/// A server configuration with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl MetricsServerConfig {
    /// Substitutes the defaults for unset fields and checks that the path
    /// can be routed as a single literal route.
    pub fn resolve(&self) -> Result<ResolvedServerConfig> {
        let host = match self.host.trim() {
            "" => DEFAULT_HOST.to_string(),
            host => host.to_string(),
        };
        let port = if self.port == 0 {
            DEFAULT_PORT
        } else {
            self.port
        };
        let path = match self.path.trim() {
            "" => DEFAULT_PATH.to_string(),
            path if path.starts_with('/') => path.to_string(),
            path => format!("/{}", path),
        };
        validate_path(&path)?;

        Ok(ResolvedServerConfig { host, port, path })
    }
}

/// Rejects paths the router would read as captures or wildcards, or could
/// never match.
fn validate_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| MetricsError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if let Some(c) = path
        .chars()
        .find(|c| matches!(c, ':' | '*' | '{' | '}' | '?' | '#') || c.is_whitespace())
    {
        return Err(invalid(&format!("'{}' is not allowed", c)));
    }
    if path.contains("//") {
        return Err(invalid("empty path segment"));
    }
    Ok(())
}

impl ResolvedServerConfig {
    /// `host:port`, with IPv6 literals bracketed.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
