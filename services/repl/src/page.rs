//! Page rendering for the single-page front-end.
//!
//! A first visit receives an HTML shell whose root element carries the page
//! object in a `data-page` attribute. Follow-up visits made by the front-end
//! send `X-Inertia: true` and receive the page object as JSON.

use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Response},
    Json,
};

use crate::models::Page;
use crate::ReplError;

pub const INERTIA_HEADER: &str = "x-inertia";

pub fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(INERTIA_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

pub fn render(headers: &HeaderMap, page: Page) -> Result<Response, ReplError> {
    if wants_json(headers) {
        let mut response = Json(page).into_response();
        let response_headers = response.headers_mut();
        response_headers.insert(INERTIA_HEADER, HeaderValue::from_static("true"));
        response_headers.insert(header::VARY, HeaderValue::from_static("X-Inertia"));
        return Ok(response);
    }

    let data = serde_json::to_string(&page)
        .map_err(|e| ReplError::Internal(anyhow::anyhow!("Failed to encode page: {}", e)))?;

    Ok(Html(shell(&escape_attribute(&data))).into_response())
}

fn shell(data_page: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>REPL for WordPress</title>
    <script type="module" src="/build/app.js"></script>
</head>
<body>
    <div id="app" data-page="{data_page}"></div>
</body>
</html>
"#
    )
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"{"code":"<?php echo 'a' & 1;"}"#),
            "{&quot;code&quot;:&quot;&lt;?php echo &#039;a&#039; &amp; 1;&quot;}"
        );
    }

    #[test]
    fn test_wants_json() {
        let mut headers = HeaderMap::new();
        assert!(!wants_json(&headers));

        headers.insert(INERTIA_HEADER, HeaderValue::from_static("true"));
        assert!(wants_json(&headers));

        headers.insert(INERTIA_HEADER, HeaderValue::from_static("false"));
        assert!(!wants_json(&headers));
    }
}
