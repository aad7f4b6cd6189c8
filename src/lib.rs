// src/lib.rs

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

// Re-export modules
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod security;
pub mod utils;

use catalog::Catalog;
use mcp::{session::SessionRegistry, tools::ToolRegistry};
use security::{HostValidator, RateLimitSettings, RateLimiter};

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Read-only design-system catalog
    pub catalog: Arc<Catalog>,
    /// Immutable tool registry backing tools/list and tools/call
    pub tools: Arc<ToolRegistry>,
    /// Per-client request counters
    pub rate_limiter: Arc<RateLimiter>,
    /// Host header allow-list
    pub host_validator: Arc<HostValidator>,
    /// Live SSE connections
    pub sessions: SessionRegistry,
    /// Cancelled on shutdown to end open SSE streams
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: config::Config, catalog: Catalog) -> Self {
        let rate_limiter = RateLimiter::new(RateLimitSettings::from(&config));
        let host_validator = HostValidator::from_config(&config);
        Self {
            config,
            catalog: Arc::new(catalog),
            tools: Arc::new(ToolRegistry::builtin()),
            rate_limiter: Arc::new(rate_limiter),
            host_validator: Arc::new(host_validator),
            sessions: SessionRegistry::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replaces the rate limiter, e.g. with one driven by a test clock.
    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = Arc::new(rate_limiter);
        self
    }
}
