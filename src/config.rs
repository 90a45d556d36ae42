//! Server configuration from environment variables

use crate::catalog::AliasPolicy;
use crate::gate::DEFAULT_MIN_GAP;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Prompt source file, loaded once at startup
    pub prompts_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Directory with the presentation layer's static files
    pub static_dir: PathBuf,
    /// Minimum gap between accepted actions on one connection
    pub action_gap: Duration,
    pub alias_policy: AliasPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            prompts_path: PathBuf::from("prompts.json"),
            bind_addr: default_addr(),
            static_dir: PathBuf::from("static"),
            action_gap: DEFAULT_MIN_GAP,
            alias_policy: AliasPolicy::Strict,
        }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8610))
}

/// Read a variable, treating blank values as unset
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match env_var("TOPTEN_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid TOPTEN_ADDR {:?}, using {}", raw, default_addr());
                default_addr()
            }),
            None => defaults.bind_addr,
        };

        let action_gap = match env_var("TOPTEN_ACTION_GAP_MS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("Invalid TOPTEN_ACTION_GAP_MS {:?}, using default", raw);
                    defaults.action_gap
                }
            },
            None => defaults.action_gap,
        };

        let alias_policy = match env_var("TOPTEN_STRICT_ALIASES") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => AliasPolicy::Strict,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => AliasPolicy::Lenient,
            Some(raw) => {
                tracing::warn!("Invalid TOPTEN_STRICT_ALIASES {:?}, using default", raw);
                defaults.alias_policy
            }
            None => defaults.alias_policy,
        };

        Self {
            prompts_path: env_var("TOPTEN_PROMPTS")
                .map(PathBuf::from)
                .unwrap_or(defaults.prompts_path),
            bind_addr,
            static_dir: env_var("TOPTEN_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            action_gap,
            alias_policy,
        }
    }
}
