use shared::config::{get_bool_env, get_optional_env, get_required_env, parse_port, validate_url};
use shared::{DatabaseConfig, ShareBackend};
use std::process;

#[derive(Debug, Clone)]
pub struct HoneypotConfig {
    pub enabled: bool,
    pub name_field: String,
    pub valid_from_field: String,
    /// Minimum age of the rendered form before a submission is accepted.
    pub min_seconds: i64,
    /// Key used to sign the valid-from timestamp.
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub port: u16,
    pub app_url: String,
    pub share_backend: ShareBackend,
    pub database: Option<DatabaseConfig>,
    pub honeypot: HoneypotConfig,
}

impl HoneypotConfig {
    pub fn from_env() -> Self {
        let enabled = get_bool_env("HONEYPOT_ENABLED", true);

        let min_seconds_str = get_optional_env("HONEYPOT_SECONDS", "1");
        let min_seconds = min_seconds_str.parse::<i64>().unwrap_or_else(|_| {
            eprintln!(
                "ERROR: Invalid value in 'HONEYPOT_SECONDS': '{}'",
                min_seconds_str
            );
            eprintln!("Must be a whole number of seconds");
            process::exit(1);
        });

        let secret = if enabled {
            get_required_env("APP_KEY")
        } else {
            get_optional_env("APP_KEY", "")
        };

        Self {
            enabled,
            name_field: get_optional_env("HONEYPOT_NAME_FIELD", "my_name"),
            valid_from_field: get_optional_env("HONEYPOT_VALID_FROM_FIELD", "valid_from"),
            min_seconds,
            secret,
        }
    }
}

impl ReplConfig {
    pub fn from_env() -> Self {
        let port_str = get_optional_env("PORT", "8000");
        let port = parse_port(&port_str, "PORT");

        let app_url = get_optional_env("APP_URL", &format!("http://localhost:{}", port));
        let app_url = validate_url(&app_url, "APP_URL");

        let share_backend = ShareBackend::from_env();
        let database = match share_backend {
            ShareBackend::Postgres => Some(DatabaseConfig::from_env()),
            ShareBackend::Memory => None,
        };

        Self {
            port,
            app_url,
            share_backend,
            database,
            honeypot: HoneypotConfig::from_env(),
        }
    }
}
