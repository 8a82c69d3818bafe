use crate::app_config::{AppConfig, DataSourceKind, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("BIZDASH_ENV", "development"))?;

    let bind_addr = or_default("BIZDASH_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("BIZDASH_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("BIZDASH_LOG_LEVEL", "info");

    let data_source = parse_data_source(&or_default("BIZDASH_DATA_SOURCE", "static"))?;
    let snapshot_path = PathBuf::from(or_default(
        "BIZDASH_SNAPSHOT_PATH",
        "./config/snapshot.yaml",
    ));

    let gbp_access_token = optional("BIZDASH_GBP_ACCESS_TOKEN");
    if data_source == DataSourceKind::Remote && gbp_access_token.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "BIZDASH_GBP_ACCESS_TOKEN".to_string(),
        ));
    }
    let gbp_account = optional("BIZDASH_GBP_ACCOUNT");
    if let Some(account) = &gbp_account {
        if !account.starts_with("accounts/") {
            return Err(invalid(
                "BIZDASH_GBP_ACCOUNT",
                format!("expected accounts/{{id}}, got '{account}'"),
            ));
        }
    }
    let gbp_timeout_secs = parse_u64("BIZDASH_GBP_TIMEOUT_SECS", "30")?;
    let gbp_max_concurrent_locations = or_default("BIZDASH_GBP_MAX_CONCURRENT_LOCATIONS", "4")
        .parse::<usize>()
        .map_err(|e| invalid("BIZDASH_GBP_MAX_CONCURRENT_LOCATIONS", e.to_string()))?;
    if gbp_max_concurrent_locations == 0 {
        return Err(invalid(
            "BIZDASH_GBP_MAX_CONCURRENT_LOCATIONS",
            "must be at least 1".to_string(),
        ));
    }

    let gemini_api_key = optional("GEMINI_API_KEY");
    let gemini_model = or_default("BIZDASH_GEMINI_MODEL", "gemini-2.5-flash");
    let gemini_timeout_secs = parse_u64("BIZDASH_GEMINI_TIMEOUT_SECS", "60")?;

    let api_keys = or_default("BIZDASH_API_KEYS", "")
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_source,
        snapshot_path,
        gbp_access_token,
        gbp_account,
        gbp_timeout_secs,
        gbp_max_concurrent_locations,
        gemini_api_key,
        gemini_model,
        gemini_timeout_secs,
        api_keys,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZDASH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_data_source(s: &str) -> Result<DataSourceKind, ConfigError> {
    match s {
        "static" => Ok(DataSourceKind::Static),
        "remote" => Ok(DataSourceKind::Remote),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZDASH_DATA_SOURCE".to_string(),
            reason: format!("expected 'static' or 'remote', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
