//! Central configuration for the auth core, read once from the environment.

use std::env;
use std::sync::LazyLock;

/// Deployment environment. Anything other than "production" is treated as a
/// development environment: error detail may be shown and cookies are not
/// marked Secure.
pub static APP_ENV: LazyLock<String> =
    LazyLock::new(|| env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()));

pub fn is_production() -> bool {
    APP_ENV.as_str() == "production"
}

/// Whether the session cookie carries the Secure attribute.
pub static COOKIE_SECURE: LazyLock<bool> = LazyLock::new(is_production);

pub static SESSION_COOKIE_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "hellostore_sid".to_string())
});

/// Idle seconds after which a session is considered expired. Default 15 minutes.
pub static SESSION_IDLE_TIMEOUT: LazyLock<u64> = LazyLock::new(|| {
    env::var("SESSION_IDLE_TIMEOUT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(900)
});

/// Lifetime of an email verification token in seconds. Default 1 hour.
pub static VERIFICATION_TOKEN_TTL: LazyLock<u64> = LazyLock::new(|| {
    env::var("VERIFICATION_TOKEN_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600)
});

/// Lifetime of a password reset token in seconds. Default 1 hour.
pub static PASSWORD_RESET_TOKEN_TTL: LazyLock<u64> = LazyLock::new(|| {
    env::var("PASSWORD_RESET_TOKEN_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3600)
});

/// Absolute base URL used when building links embedded in outbound email.
pub static BASE_URL: LazyLock<String> =
    LazyLock::new(|| env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()));

/// Cloudflare Turnstile secret. When unset the human-challenge check is
/// disabled, which is only acceptable in development.
pub static TURNSTILE_SECRET: LazyLock<Option<String>> =
    LazyLock::new(|| env::var("TURNSTILE_SECRET").ok().filter(|s| !s.is_empty()));

pub static TURNSTILE_VERIFY_URL: LazyLock<String> = LazyLock::new(|| {
    env::var("TURNSTILE_VERIFY_URL")
        .unwrap_or_else(|_| "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string())
});

/// Table prefix from environment variable
pub(crate) static DB_TABLE_PREFIX: LazyLock<String> =
    LazyLock::new(|| env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "hs_".to_string()));

pub(crate) static DB_TABLE_USERS: LazyLock<String> =
    LazyLock::new(|| format!("{}users", DB_TABLE_PREFIX.as_str()));

#[cfg(test)]
mod tests {
    use std::env;

    // Helper functions replicating the LazyLock initializer logic so the
    // defaults can be tested without mutating process environment state.

    fn parse_idle_timeout(env_value: Option<&str>) -> u64 {
        env_value.and_then(|s| s.parse().ok()).unwrap_or(900)
    }

    fn parse_cookie_name(env_value: Option<&str>) -> String {
        env_value
            .map(|s| s.to_string())
            .unwrap_or_else(|| "hellostore_sid".to_string())
    }

    fn parse_token_ttl(env_value: Option<&str>) -> u64 {
        env_value.and_then(|s| s.parse().ok()).unwrap_or(3600)
    }

    #[test]
    fn test_idle_timeout_default() {
        assert_eq!(parse_idle_timeout(None), 900);
    }

    #[test]
    fn test_idle_timeout_custom() {
        assert_eq!(parse_idle_timeout(Some("1800")), 1800);
    }

    #[test]
    fn test_idle_timeout_invalid_falls_back() {
        assert_eq!(parse_idle_timeout(Some("not-a-number")), 900);
    }

    #[test]
    fn test_cookie_name_default() {
        assert_eq!(parse_cookie_name(None), "hellostore_sid");
    }

    #[test]
    fn test_cookie_name_custom() {
        assert_eq!(parse_cookie_name(Some("custom_sid")), "custom_sid");
    }

    #[test]
    fn test_verification_token_ttl_default() {
        assert_eq!(parse_token_ttl(None), 3600);
    }

    #[test]
    fn test_table_prefix_default() {
        let prefix = env::var("DB_TABLE_PREFIX").unwrap_or_else(|_| "hs_".to_string());
        assert!(prefix == "hs_" || !prefix.is_empty());
    }
}
