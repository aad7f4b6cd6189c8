// src/security/rate_limit.rs

use dashmap::DashMap;
use std::sync::Arc;

use crate::config::Config;

pub const DEFAULT_WINDOW_MS: u64 = 60_000;
pub const DEFAULT_MAX_REQUESTS: u32 = 100;
pub const DEFAULT_MAX_CLIENTS: usize = 10_000;

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub window_ms: u64,
    pub max_requests: u32,
    /// Distinct client keys kept before expired entries are swept.
    pub max_clients: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            max_requests: DEFAULT_MAX_REQUESTS,
            max_clients: DEFAULT_MAX_CLIENTS,
        }
    }
}

impl From<&Config> for RateLimitSettings {
    fn from(config: &Config) -> Self {
        Self {
            window_ms: config.rate_limit_window_ms,
            max_requests: config.rate_limit_max_requests,
            max_clients: config.rate_limit_max_clients,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds at which the current window ends.
    pub reset_at: u64,
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: u64,
}

/// Fixed-window, per-client request counter.
///
/// Each key gets `max_requests` per window. Counters live in process memory
/// only: they are lost on restart and are not shared between instances.
pub struct RateLimiter {
    // The entry lock held across read-modify-write keeps the per-window
    // limit exact when requests for one key race.
    entries: DashMap<String, RateLimitEntry>,
    settings: RateLimitSettings,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// A zero window would reset on every request, so it is raised to 1 ms.
    pub fn with_clock(settings: RateLimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            settings: RateLimitSettings {
                window_ms: settings.window_ms.max(1),
                ..settings
            },
            clock,
        }
    }

    pub fn settings(&self) -> RateLimitSettings {
        self.settings
    }

    /// Number of client keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.entries.len()
    }

    /// Counts one request for `key` and reports whether it is allowed.
    pub fn check(&self, key: &str) -> RateLimitResult {
        let now = self.clock.now_millis();

        if self.entries.len() >= self.settings.max_clients && !self.entries.contains_key(key) {
            self.sweep_expired(now);
        }

        let limit = self.settings.max_requests;
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(RateLimitEntry {
                count: 0,
                reset_at: 0,
            });

        if now >= entry.reset_at {
            entry.count = 1;
            entry.reset_at = now.saturating_add(self.settings.window_ms);
            return RateLimitResult {
                allowed: true,
                remaining: limit.saturating_sub(1),
                reset_at: entry.reset_at,
            };
        }

        if entry.count < limit {
            entry.count += 1;
            return RateLimitResult {
                allowed: true,
                remaining: limit - entry.count,
                reset_at: entry.reset_at,
            };
        }

        RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at: entry.reset_at,
        }
    }

    fn sweep_expired(&self, now: u64) {
        self.entries.retain(|_, entry| entry.reset_at > now);
    }

    /// Whole seconds until `reset_at`, rounded up, never below one.
    pub fn retry_after_secs(&self, reset_at: u64) -> u64 {
        let wait_ms = reset_at.saturating_sub(self.clock.now_millis());
        wait_ms.div_ceil(1000).max(1)
    }
}
