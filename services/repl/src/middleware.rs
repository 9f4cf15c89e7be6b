use axum::{
    http::{header, HeaderValue},
    response::Response,
};

pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=604800";

/// Web pages are identical for every visitor: drop cookies and let shared
/// caches keep them for a week.
pub async fn cache_publicly(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.remove(header::SET_COOKIE);
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(PUBLIC_CACHE_CONTROL),
    );
    response
}
