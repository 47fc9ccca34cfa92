// Server configuration loaded from environment variables

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::HeaderValue;

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (BIND_ADDR, default 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Prefix for API routes (API_PREFIX, default "/api")
    /// Example: API_PREFIX="/api" results in routes like /api/heavy-task
    pub api_prefix: String,

    /// Origins allowed by CORS (CORS_ALLOWED_ORIGINS, comma separated)
    /// Only needed when the caller is served from a different origin
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_prefix: "/api".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (extracted for testing)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            config.bind_addr = addr
                .trim()
                .parse()
                .with_context(|| format!("Invalid BIND_ADDR: {}", addr))?;
        }

        // An explicitly empty API_PREFIX serves routes at the root
        if let Some(prefix) = lookup("API_PREFIX") {
            config.api_prefix = normalize_prefix(&prefix);
        }

        config.cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.split(',')
                    .filter_map(|s| s.trim().parse().ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(config)
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
