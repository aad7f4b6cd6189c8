// src/config.rs

use anyhow::{Context, Result};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::security::host::{DEFAULT_ALLOWED_HOSTS, DEFAULT_HOST};
use crate::security::rate_limit::{DEFAULT_MAX_CLIENTS, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS};

// A struct to hold all configuration, loaded once at startup from the environment / .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,
    pub bind_address: IpAddr,

    /// Host header values that may be reflected in the SSE endpoint URL.
    /// Preview deployments (word-word-word.vercel.app) are always accepted.
    pub allowed_hosts: Vec<String>,
    /// Host used in the endpoint URL when the request's Host is untrusted
    pub default_host: String,

    // Rate limiting
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_ms: u64,
    pub rate_limit_max_clients: usize,

    // SSE
    pub sse_keepalive_secs: u64,

    /// Optional JSON catalog replacing the embedded one
    pub catalog_path: Option<PathBuf>,

    /// Serve MCP over stdin/stdout instead of HTTP
    pub mcp_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 3000,
            bind_address: IpAddr::from([127, 0, 0, 1]),
            allowed_hosts: DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            default_host: DEFAULT_HOST.to_string(),
            rate_limit_max_requests: DEFAULT_MAX_REQUESTS,
            rate_limit_window_ms: DEFAULT_WINDOW_MS,
            rate_limit_max_clients: DEFAULT_MAX_CLIENTS,
            sse_keepalive_secs: 30,
            catalog_path: None,
            mcp_mode: false,
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

fn parse_host_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let allowed_hosts = match env::var("ALLOWED_HOSTS") {
            Ok(raw) => {
                let hosts = parse_host_list(&raw);
                anyhow::ensure!(!hosts.is_empty(), "ALLOWED_HOSTS must list at least one host");
                hosts
            }
            Err(_) => defaults.allowed_hosts,
        };

        let rate_limit_max_requests =
            parse_var("RATE_LIMIT_MAX_REQUESTS", defaults.rate_limit_max_requests)?;
        anyhow::ensure!(
            rate_limit_max_requests > 0,
            "RATE_LIMIT_MAX_REQUESTS must be greater than zero"
        );

        let rate_limit_window_ms =
            parse_var("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms)?;
        anyhow::ensure!(
            rate_limit_window_ms > 0,
            "RATE_LIMIT_WINDOW_MS must be greater than zero"
        );

        let sse_keepalive_secs = parse_var("SSE_KEEPALIVE_SECS", defaults.sse_keepalive_secs)?;
        anyhow::ensure!(sse_keepalive_secs > 0, "SSE_KEEPALIVE_SECS must be greater than zero");

        Ok(Config {
            port: parse_var("PORT", defaults.port)?,
            bind_address: parse_var("BIND_ADDRESS", defaults.bind_address)?,
            allowed_hosts,
            default_host: env::var("DEFAULT_HOST")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .unwrap_or(defaults.default_host),
            rate_limit_max_requests,
            rate_limit_window_ms,
            rate_limit_max_clients: parse_var(
                "RATE_LIMIT_MAX_CLIENTS",
                defaults.rate_limit_max_clients,
            )?,
            sse_keepalive_secs,
            catalog_path: env::var("CATALOG_PATH").ok().map(PathBuf::from),
            mcp_mode: env::var("MCP_MODE").is_ok(),
        })
    }
}
