// Request gating applied before JSON-RPC parsing
pub mod host;
pub mod rate_limit;

pub use host::{build_endpoint_url, HostValidator};
pub use rate_limit::{Clock, RateLimitResult, RateLimitSettings, RateLimiter, SystemClock};
