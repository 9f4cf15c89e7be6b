use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

use crate::error::ShareError;
use crate::state::{PlaygroundState, DEFAULT_CODE};

/// A stored share as rendered into page props.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShareRecord {
    pub hash: String,
    pub code: String,
    pub php_version: String,
    pub wordpress_version: String,
    pub multisite: bool,
    #[serde(default)]
    pub plugins: Option<Vec<String>>,
    #[serde(default)]
    pub themes: Option<Vec<String>>,
}

/// Honeypot field names and token handed out with every page.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoneypotFields {
    pub enabled: bool,
    pub name_field_name: String,
    pub valid_from_field_name: String,
    pub encrypted_valid_from: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageProps {
    honeypot: Option<HoneypotFields>,
    share: Option<ShareRecord>,
}

#[derive(Debug, Deserialize)]
struct PageObject {
    #[serde(default)]
    props: PageProps,
}

/// Body of `POST /share`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareRequest {
    pub code: String,
    pub php_version: String,
    pub wordpress_version: String,
    pub multisite: bool,
    pub plugins: Vec<String>,
    pub themes: Vec<String>,
}

impl ShareRequest {
    pub fn from_state(state: &PlaygroundState) -> Self {
        Self {
            code: state.code.clone(),
            php_version: state.php_version.to_string(),
            wordpress_version: state.wordpress_version.to_string(),
            multisite: state.multisite,
            plugins: state.plugins.clone(),
            themes: state.themes.clone(),
        }
    }
}

/// Sharing is offered once the code differs from the welcome snippet and from
/// the share the page was opened with.
pub fn can_share(code: &str, opened: Option<&ShareRecord>) -> bool {
    code != DEFAULT_CODE && opened.map_or(true, |share| share.code != code)
}

/// HTTP client for the share endpoints. Redirects are never followed; the
/// share hash is read from the `Location` header.
#[derive(Clone)]
pub struct ShareClient {
    client: Client,
    base_url: Url,
}

impl ShareClient {
    pub fn new(base_url: &str) -> Result<Self, ShareError> {
        let client = Client::builder().redirect(Policy::none()).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    pub fn share_url(&self, hash: &str) -> Result<Url, ShareError> {
        Ok(self.base_url.join(&format!("/share/{}", hash))?)
    }

    async fn fetch_page(&self, url: Url) -> Result<Option<PageProps>, ShareError> {
        let response = self
            .client
            .get(url)
            .header("X-Inertia", "true")
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<PageObject>().await?.props)),
            StatusCode::NOT_FOUND => Ok(None),
            status => Err(ShareError::UnexpectedStatus(status.as_u16())),
        }
    }

    /// Current honeypot fields from the index page.
    pub async fn honeypot(&self) -> Result<HoneypotFields, ShareError> {
        let props = self
            .fetch_page(self.base_url.join("/")?)
            .await?
            .ok_or(ShareError::UnexpectedStatus(StatusCode::NOT_FOUND.as_u16()))?;

        Ok(props.honeypot.unwrap_or_default())
    }

    pub async fn fetch(&self, hash: &str) -> Result<Option<ShareRecord>, ShareError> {
        debug!("Fetching share {}", hash);
        Ok(self
            .fetch_page(self.share_url(hash)?)
            .await?
            .and_then(|props| props.share))
    }

    /// Post a share and return its hash.
    pub async fn create(
        &self,
        request: &ShareRequest,
        honeypot: &HoneypotFields,
    ) -> Result<String, ShareError> {
        let mut body = match serde_json::to_value(request) {
            Ok(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        if honeypot.enabled {
            body.insert(honeypot.name_field_name.clone(), Value::String(String::new()));
            body.insert(
                honeypot.valid_from_field_name.clone(),
                Value::String(honeypot.encrypted_valid_from.clone()),
            );
        }

        let response = self
            .client
            .post(self.base_url.join("/share")?)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_redirection() {
            return match status {
                // Spam protection answers with an empty page.
                StatusCode::OK => Err(ShareError::Rejected),
                _ => Err(ShareError::UnexpectedStatus(status.as_u16())),
            };
        }

        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let hash = location
            .rsplit_once("/share/")
            .map(|(_, hash)| hash.trim_end_matches('/'))
            .filter(|hash| !hash.is_empty())
            .ok_or(ShareError::Rejected)?;

        info!(hash = %hash, "Share created");
        Ok(hash.to_string())
    }
}
