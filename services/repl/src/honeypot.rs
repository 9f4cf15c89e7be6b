//! Honeypot spam protection for form posts.
//!
//! Rendered pages carry two extra field names: a name field that a human never
//! fills in, and a valid-from field holding a signed timestamp. A post is spam
//! when the name field is missing or filled, or when the signed timestamp is
//! missing, forged, or still in the future.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use serde::Serialize;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tracing::warn;

use crate::config::HoneypotConfig;
use crate::AppState;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamReason {
    MissingNameField,
    NameFieldFilled,
    MissingValidFrom,
    InvalidValidFrom,
    SubmittedTooFast,
}

/// Honeypot field names and token, as exposed to the page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HoneypotProps {
    pub enabled: bool,
    pub name_field_name: String,
    pub unrandomized_name_field_name: String,
    pub valid_from_field_name: String,
    pub encrypted_valid_from: String,
}

pub struct Honeypot {
    enabled: bool,
    name_field: String,
    valid_from_field: String,
    min_seconds: i64,
    key: hmac::Key,
}

impl Honeypot {
    pub fn new(config: &HoneypotConfig) -> Self {
        Self {
            enabled: config.enabled,
            name_field: config.name_field.clone(),
            valid_from_field: config.valid_from_field.clone(),
            min_seconds: config.min_seconds,
            key: hmac::Key::new(hmac::HMAC_SHA256, config.secret.as_bytes()),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Token stating that submissions are acceptable from `now + min_seconds`.
    pub fn issue_valid_from(&self, now: i64) -> String {
        let valid_from = (now + self.min_seconds).to_string();
        let tag = hmac::sign(&self.key, valid_from.as_bytes());
        format!("{}.{}", valid_from, URL_SAFE_NO_PAD.encode(tag.as_ref()))
    }

    pub fn props(&self, now: i64) -> HoneypotProps {
        HoneypotProps {
            enabled: self.enabled,
            name_field_name: self.name_field.clone(),
            unrandomized_name_field_name: self.name_field.clone(),
            valid_from_field_name: self.valid_from_field.clone(),
            encrypted_valid_from: self.issue_valid_from(now),
        }
    }

    pub fn check(&self, fields: &Map<String, Value>, now: i64) -> Result<(), SpamReason> {
        match fields.get(&self.name_field) {
            None => return Err(SpamReason::MissingNameField),
            Some(Value::Null) => {}
            Some(Value::String(value)) if value.is_empty() => {}
            Some(_) => return Err(SpamReason::NameFieldFilled),
        }

        let token = match fields.get(&self.valid_from_field) {
            Some(Value::String(token)) if !token.is_empty() => token,
            _ => return Err(SpamReason::MissingValidFrom),
        };

        let valid_from = self
            .verify_token(token)
            .ok_or(SpamReason::InvalidValidFrom)?;
        if now < valid_from {
            return Err(SpamReason::SubmittedTooFast);
        }

        Ok(())
    }

    fn verify_token(&self, token: &str) -> Option<i64> {
        let (timestamp, signature) = token.split_once('.')?;
        let signature = URL_SAFE_NO_PAD.decode(signature).ok()?;
        hmac::verify(&self.key, timestamp.as_bytes(), &signature).ok()?;
        timestamp.parse().ok()
    }
}

pub fn now_unix() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Reject spam posts with an empty 200 response before they reach the handler.
pub async fn protect(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.honeypot.enabled() {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read request body for spam check: {}", e);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };

    let fields = match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    };

    if let Err(reason) = state.honeypot.check(&fields, now_unix()) {
        warn!(reason = ?reason, path = %parts.uri.path(), "Rejected spam submission");
        return StatusCode::OK.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
