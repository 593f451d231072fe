use portal_guard::{AppConfig, MismatchPolicy, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "API_BASE_URL",
    "BIND_ADDR",
    "GUARD_MISMATCH_POLICY",
    "IDENTITY_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Runs a test with a clean configuration environment and restores the original values
/// afterward, even if the test panicked.
fn run_with_env<T, R>(test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "local");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:8000");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.mismatch_policy, MismatchPolicy::Refresh);
    assert_eq!(config.identity_timeout, None);
}

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("APP_ENV", "production");
            }
            // API_BASE_URL is missing.
            AppConfig::load()
        })
    });

    assert!(
        result.is_err(),
        "Production config loading should panic without API_BASE_URL"
    );
}

#[test]
#[serial]
fn test_app_config_production_overrides() {
    let config = run_with_env(|| {
        unsafe {
            env::set_var("APP_ENV", "production");
            env::set_var("API_BASE_URL", "https://api.school.example");
            env::set_var("BIND_ADDR", "127.0.0.1:8080");
            env::set_var("GUARD_MISMATCH_POLICY", "stored-role");
            env::set_var("IDENTITY_TIMEOUT_SECS", "5");
        }
        AppConfig::load()
    });

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.school.example");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
    assert_eq!(config.mismatch_policy, MismatchPolicy::StoredRole);
    assert_eq!(config.identity_timeout, Some(Duration::from_secs(5)));
}

#[test]
#[serial]
fn test_app_config_rejects_unknown_policy() {
    let result = run_with_env(|| {
        panic::catch_unwind(|| {
            unsafe {
                env::set_var("GUARD_MISMATCH_POLICY", "sometimes");
            }
            AppConfig::load()
        })
    });

    assert!(result.is_err());
}

#[test]
fn test_app_config_default_is_local() {
    let config = AppConfig::default();
    assert_eq!(config.env, Env::Local);
    assert_eq!(config.mismatch_policy, MismatchPolicy::Refresh);
}
