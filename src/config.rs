//! Configuration management for the expense tracker.
//!
//! Values come from environment variables, which may be seeded from `.env`
//! files. Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory
//! 4. Application defaults

use std::{env, path::PathBuf, str::FromStr, time::Duration};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3001";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from `.env` files.
///
/// Reads `.env` from the working directory first, then
/// `expense-tracker/.env` from the platform-specific local data directory:
/// - Linux: `~/.local/share/expense-tracker/.env`
/// - macOS: `~/Library/Application Support/expense-tracker/.env`
/// - Windows: `%LOCALAPPDATA%/expense-tracker/.env`
///
/// Variables already present in the environment are never overwritten and a
/// missing file is not an error.
///
/// # Errors
///
/// Returns an error string if an existing `.env` file cannot be read or
/// parsed.
pub async fn load_env() -> Result<(), String> {
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            return Err(e.to_string());
        }
    }

    let path = data_dir().join(".env");
    if async_fs::metadata(&path).await.is_ok_and(|m| m.is_file()) {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Directory holding the `.env` file and the client session.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("expense-tracker");
    path
}

/// Address the API server binds to (`SERVER_ADDRESS`).
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Base URL the client facade sends requests to (`EXPENSES_API_URL`).
///
/// A trailing slash is stripped so paths can be appended directly.
pub fn api_base_url() -> String {
    env::var("EXPENSES_API_URL")
        .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Whether expense routes require a session (`REQUIRE_AUTH`).
///
/// Accepts `1`, `true`, `yes` and `on`, case-insensitively.
pub fn require_auth() -> bool {
    env::var("REQUIRE_AUTH")
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// Session lifetime in seconds (`TOKEN_TTL_SECS`).
pub fn token_ttl_secs() -> u64 {
    parse_or("TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)
}

/// Client request timeout (`REQUEST_TIMEOUT_SECS`).
pub fn request_timeout() -> Duration {
    Duration::from_secs(parse_or(
        "REQUEST_TIMEOUT_SECS",
        DEFAULT_REQUEST_TIMEOUT_SECS,
    ))
}

pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
