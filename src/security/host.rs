// src/security/host.rs

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::config::Config;

/// Path the SSE `endpoint` event points clients at.
pub const MCP_PATH: &str = "/api/mcp";

pub const DEFAULT_HOST: &str = "lumen-design.vercel.app";

pub const DEFAULT_ALLOWED_HOSTS: &[&str] = &[
    "lumen-design.vercel.app",
    "lumen-design.com",
    "www.lumen-design.com",
    "localhost",
    "localhost:3000",
    "127.0.0.1",
    "127.0.0.1:3000",
];

lazy_static! {
    // Deployment previews: word-word-word(-...).vercel.app
    static ref PREVIEW_HOST: Regex =
        Regex::new(r"(?i)^[a-z0-9]+(?:-[a-z0-9]+){2,}\.vercel\.app$").unwrap();
}

/// Decides which `Host` values may be reflected back to clients.
#[derive(Debug, Clone)]
pub struct HostValidator {
    allowed: Vec<String>,
    default_host: String,
}

impl Default for HostValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_ALLOWED_HOSTS.iter().map(|h| h.to_string()).collect(),
            DEFAULT_HOST.to_string(),
        )
    }
}

impl HostValidator {
    pub fn new(allowed: Vec<String>, default_host: String) -> Self {
        Self {
            allowed: allowed.into_iter().map(|h| h.trim().to_lowercase()).collect(),
            default_host,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.allowed_hosts.clone(), config.default_host.clone())
    }

    pub fn default_host(&self) -> &str {
        &self.default_host
    }

    /// Returns `raw` when it is trusted, otherwise the default host.
    ///
    /// Never fails: an untrusted header is logged and replaced, so the
    /// caller cannot tell whether substitution happened.
    pub fn validate(&self, raw: Option<&str>) -> String {
        let host = match raw {
            Some(h) if !h.trim().is_empty() => h,
            _ => return self.default_host.clone(),
        };

        if self.allowed.iter().any(|a| a.eq_ignore_ascii_case(host)) {
            return host.to_string();
        }
        if PREVIEW_HOST.is_match(host) {
            return host.to_string();
        }

        warn!(host = ?host, fallback = %self.default_host, "untrusted Host header replaced");
        self.default_host.clone()
    }
}

fn is_local(host: &str) -> bool {
    let name = if let Some(rest) = host.strip_prefix('[') {
        // IPv6 literal, e.g. [::1]:3000
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    matches!(
        name.to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1" | "0.0.0.0"
    )
}

/// Builds the callback URL for an already validated host.
pub fn build_endpoint_url(validated_host: &str) -> String {
    let scheme = if is_local(validated_host) { "http" } else { "https" };
    format!("{}://{}{}", scheme, validated_host, MCP_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrusted_host_falls_back_to_default() {
        let validator = HostValidator::default();
        assert_eq!(validator.validate(Some("evil.com")), DEFAULT_HOST);
        assert_eq!(validator.validate(None), DEFAULT_HOST);
        assert_eq!(validator.validate(Some("   ")), DEFAULT_HOST);
    }

    #[test]
    fn allow_list_match_keeps_original_case() {
        let validator = HostValidator::default();
        assert_eq!(validator.validate(Some("LocalHost:3000")), "LocalHost:3000");
    }

    #[test]
    fn trusted_header_is_returned_verbatim() {
        let validator = HostValidator::default();
        let raw = "lumen-design.vercel.app";
        assert_eq!(validator.validate(Some(raw)), raw);
        // Padding is not part of any trusted name, so nothing padded is echoed
        assert_eq!(validator.validate(Some(" localhost ")), DEFAULT_HOST);
    }

    #[test]
    fn preview_deployments_are_accepted() {
        let validator = HostValidator::default();
        let preview = "myapp-git-feature-team.vercel.app";
        assert_eq!(validator.validate(Some(preview)), preview);
        assert_eq!(validator.validate(Some("two-words.vercel.app")), DEFAULT_HOST);
        assert_eq!(
            validator.validate(Some("a-b-c.vercel.app.evil.com")),
            DEFAULT_HOST
        );
    }

    #[test]
    fn header_injection_is_not_echoed() {
        let validator = HostValidator::default();
        assert_eq!(
            validator.validate(Some("localhost\r\nX-Evil: 1")),
            DEFAULT_HOST
        );
    }

    #[test]
    fn endpoint_scheme_depends_on_locality() {
        assert_eq!(build_endpoint_url("localhost:3000"), "http://localhost:3000/api/mcp");
        assert_eq!(build_endpoint_url("[::1]:8080"), "http://[::1]:8080/api/mcp");
        assert_eq!(
            build_endpoint_url("lumen-design.vercel.app"),
            "https://lumen-design.vercel.app/api/mcp"
        );
    }
}
