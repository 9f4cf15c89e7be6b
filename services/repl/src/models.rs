use serde::Serialize;
use serde_json::{Map, Value};
use shared::{NewShare, Share};
use std::fmt;

use crate::honeypot::HoneypotProps;

pub const MAX_WORDPRESS_VERSION_CHARS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    errors: Vec<(&'static str, &'static str)>,
}

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: &'static str) {
        self.errors.push((field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|(f, _)| *f == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{joined}")
    }
}

/// Validate a share submission. A body that is empty, not JSON, or not an
/// object is treated as an empty submission and fails the required rules.
pub fn validate_share(body: &[u8]) -> Result<NewShare, ValidationErrors> {
    let fields = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    let mut errors = ValidationErrors::default();

    let code = match fields.get("code") {
        Some(Value::String(code)) if !code.trim().is_empty() => Some(code.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            errors.add("code", "The code field is required.");
            None
        }
        Some(_) => {
            errors.add("code", "The code field must be a string.");
            None
        }
    };

    let multisite = match fields.get("multisite") {
        None | Some(Value::Null) => {
            errors.add("multisite", "The multisite field is required.");
            None
        }
        Some(value) => {
            let parsed = as_boolean(value);
            if parsed.is_none() {
                errors.add("multisite", "The multisite field must be true or false.");
            }
            parsed
        }
    };

    let php_version = match fields.get("php_version") {
        None | Some(Value::Null) => {
            errors.add("php_version", "The php version field is required.");
            None
        }
        Some(Value::String(version)) if version.trim().is_empty() => {
            errors.add("php_version", "The php version field is required.");
            None
        }
        Some(value) => {
            let parsed = as_numeric_string(value);
            if parsed.is_none() {
                errors.add("php_version", "The php version field must be a number.");
            }
            parsed
        }
    };

    let wordpress_version = match fields.get("wordpress_version") {
        Some(Value::String(version)) if version.trim().is_empty() => {
            errors.add("wordpress_version", "The wordpress version field is required.");
            None
        }
        Some(Value::String(version))
            if version.chars().count() > MAX_WORDPRESS_VERSION_CHARS =>
        {
            errors.add(
                "wordpress_version",
                "The wordpress version field must not be greater than 20 characters.",
            );
            None
        }
        Some(Value::String(version)) => Some(version.clone()),
        None | Some(Value::Null) => {
            errors.add("wordpress_version", "The wordpress version field is required.");
            None
        }
        Some(_) => {
            errors.add("wordpress_version", "The wordpress version field must be a string.");
            None
        }
    };

    let plugins = string_list(&fields, "plugins", &mut errors);
    let themes = string_list(&fields, "themes", &mut errors);

    match (code, multisite, php_version, wordpress_version) {
        (Some(code), Some(multisite), Some(php_version), Some(wordpress_version))
            if errors.is_empty() =>
        {
            Ok(NewShare {
                code,
                php_version,
                wordpress_version,
                multisite,
                plugins,
                themes,
            })
        }
        _ => Err(errors),
    }
}

/// `true`, `false`, `1`, `0`, `"1"` and `"0"` are booleans.
fn as_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_numeric_string(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let parsed = s.trim().parse::<f64>().ok()?;
            parsed.is_finite().then(|| s.trim().to_string())
        }
        _ => None,
    }
}

fn string_list(
    fields: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Vec<String> {
    match fields.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => {
            let strings: Option<Vec<String>> = items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect();
            strings.unwrap_or_else(|| {
                errors.add(field, "Every entry must be a string.");
                Vec::new()
            })
        }
        Some(_) => {
            errors.add(field, "The field must be an array.");
            Vec::new()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageProps {
    pub honeypot: HoneypotProps,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share: Option<Share>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Page object handed to the front-end: the component to mount and its props.
#[derive(Debug, Serialize)]
pub struct Page {
    pub component: &'static str,
    pub props: PageProps,
    pub url: String,
}
