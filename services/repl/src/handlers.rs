use crate::honeypot::now_unix;
use crate::models::{validate_share, Page, PageProps};
use crate::page::render;
use crate::{AppState, ReplError, Result as ReplResult};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};
use shared::utils::share_url;
use tracing::{info, warn};

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn page_props(state: &AppState) -> PageProps {
    PageProps {
        honeypot: state.honeypot.props(now_unix()),
        share: None,
        url: None,
    }
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> ReplResult<Response> {
    render(
        &headers,
        Page {
            component: "index",
            props: page_props(&state),
            url: "/".to_string(),
        },
    )
}

pub async fn store_share(State(state): State<AppState>, body: Bytes) -> ReplResult<Response> {
    let new_share = match validate_share(&body) {
        Ok(share) => share,
        Err(errors) => {
            warn!("Share validation failed: {}", errors);
            return Ok(found("/"));
        }
    };

    let share = state.store.create(new_share).await?;
    info!(hash = %share.hash, "Stored share");

    Ok(found(&format!("/share/{}", share.hash)))
}

pub async fn show_share(
    State(state): State<AppState>,
    Path(hash): Path<String>,
    headers: HeaderMap,
) -> ReplResult<Response> {
    let share = state
        .store
        .find_by_hash(&hash)
        .await?
        .ok_or_else(|| ReplError::NotFound(format!("share {}", hash)))?;

    let mut props = page_props(&state);
    props.url = Some(share_url(&state.config.app_url, &share.hash));
    props.share = Some(share);

    render(
        &headers,
        Page {
            component: "index",
            props,
            url: format!("/share/{}", hash),
        },
    )
}

pub async fn up(State(state): State<AppState>) -> ReplResult<Json<Value>> {
    state.store.count().await?;

    Ok(Json(json!({ "status": "healthy" })))
}
