use std::{env, time::Duration};

use crate::guard::MismatchPolicy;

/// AppConfig
///
/// Holds the navigation service's configuration. Immutable once loaded and pulled into
/// handlers via FromRef, like the rest of the shared state.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Base URL of the backend exposing `GET /auth/me`.
    pub api_base_url: String,
    // Socket address the navigation service listens on.
    pub bind_addr: String,
    // Runtime environment marker. Controls log format and config strictness.
    pub env: Env,
    // Behaviour on a role mismatch against a role-restricted route.
    pub mismatch_policy: MismatchPolicy,
    // Optional timeout for the identity request. None waits indefinitely.
    pub identity_timeout: Option<Duration>,
}

/// Env
///
/// Runtime context: pretty logs and lenient defaults locally, JSON logs and mandatory
/// settings in production.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Safe, non-panicking configuration for test state setup.
    fn default() -> Self {
        Self {
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            env: Env::Local,
            mismatch_policy: MismatchPolicy::Refresh,
            identity_timeout: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables at startup.
    ///
    /// # Panics
    /// Panics if `API_BASE_URL` is missing in production, or if `GUARD_MISMATCH_POLICY` or
    /// `IDENTITY_TIMEOUT_SECS` hold unparseable values. A misconfigured guard must not start.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        let mismatch_policy = match env::var("GUARD_MISMATCH_POLICY") {
            Ok(raw) => raw
                .parse()
                .unwrap_or_else(|e| panic!("FATAL: invalid GUARD_MISMATCH_POLICY: {e}")),
            Err(_) => MismatchPolicy::Refresh,
        };

        let identity_timeout = env::var("IDENTITY_TIMEOUT_SECS").ok().map(|raw| {
            let secs: u64 = raw
                .trim()
                .parse()
                .unwrap_or_else(|e| panic!("FATAL: invalid IDENTITY_TIMEOUT_SECS {raw:?}: {e}"));
            Duration::from_secs(secs)
        });

        Self {
            api_base_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            env,
            mismatch_policy,
            identity_timeout,
        }
    }
}
