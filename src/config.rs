//! Server configuration from environment variables.
//!
//! `HOST` (default 0.0.0.0), `PORT` (default 8080), `BRACKET_API_TOKENS` (`token:role,...`),
//! `BRACKET_MAX_TEAMS` (default 64), `BRACKET_GRAND_FINAL_RESET` (default false).

use crate::auth::ApiTokens;
use crate::logic::DEFAULT_MAX_TEAMS;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub tokens: ApiTokens,
    pub max_teams: usize,
    pub grand_final_reset: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            tokens: ApiTokens::default(),
            max_teams: DEFAULT_MAX_TEAMS,
            grand_final_reset: false,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values fall back to defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let tokens = lookup("BRACKET_API_TOKENS")
            .map(|s| ApiTokens::parse(&s))
            .unwrap_or_default();
        if tokens.is_empty() {
            log::warn!("BRACKET_API_TOKENS is empty; admin routes will reject every request");
        }
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            tokens,
            max_teams: parse_or(&lookup, "BRACKET_MAX_TEAMS", defaults.max_teams),
            grand_final_reset: parse_or(&lookup, "BRACKET_GRAND_FINAL_RESET", defaults.grand_final_reset),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Invalid value for {key}: {raw:?}; using default");
            default
        }),
    }
}
