use std::env;
use std::process;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

pub fn get_required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        eprintln!("ERROR: Required environment variable '{}' is not set", key);
        eprintln!("Please set this variable in your .env file or environment");
        process::exit(1);
    })
}

pub fn get_optional_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn parse_port(port_str: &str, var_name: &str) -> u16 {
    port_str.parse::<u16>().unwrap_or_else(|_| {
        eprintln!(
            "ERROR: Invalid port number in '{}': '{}'",
            var_name, port_str
        );
        eprintln!("Port must be a number between 1 and 65535");
        process::exit(1);
    })
}

/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn get_bool_env(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => parse_bool(&value).unwrap_or_else(|| {
            eprintln!("ERROR: Invalid boolean in '{}': '{}'", key, value);
            process::exit(1);
        }),
        Err(_) => default,
    }
}

pub fn validate_url(url: &str, var_name: &str) -> String {
    if url.is_empty() {
        eprintln!("ERROR: Environment variable '{}' cannot be empty", var_name);
        process::exit(1);
    }

    if !url.starts_with("http://")
        && !url.starts_with("https://")
        && !url.starts_with("postgres://")
        && !url.starts_with("postgresql://")
    {
        eprintln!("ERROR: Invalid URL format in '{}': '{}'", var_name, url);
        eprintln!("URL must start with http://, https://, postgres:// or postgresql://");
        process::exit(1);
    }

    url.to_string()
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        let database_url = get_required_env("DATABASE_URL");
        let database_url = validate_url(&database_url, "DATABASE_URL");

        let max_connections_str = get_optional_env("DB_MAX_CONNECTIONS", "10");
        let max_connections = max_connections_str.parse::<u32>().unwrap_or_else(|_| {
            eprintln!(
                "ERROR: Invalid max connections in 'DB_MAX_CONNECTIONS': '{}'",
                max_connections_str
            );
            eprintln!("Must be a positive number");
            process::exit(1);
        });

        let acquire_timeout_str = get_optional_env("DB_ACQUIRE_TIMEOUT_SECONDS", "3");
        let acquire_timeout_seconds = acquire_timeout_str.parse::<u64>().unwrap_or_else(|_| {
            eprintln!(
                "ERROR: Invalid timeout in 'DB_ACQUIRE_TIMEOUT_SECONDS': '{}'",
                acquire_timeout_str
            );
            eprintln!("Must be a positive number");
            process::exit(1);
        });

        Self {
            database_url,
            max_connections,
            acquire_timeout_seconds,
        }
    }
}
