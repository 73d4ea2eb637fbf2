use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::state::AppState;

const CATALOG_CACHE_CONTROL: &str = "public, max-age=60";
const MAP_CONFIG_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let catalog = state.catalog.read().await;
    Json(serde_json::json!({
        "status": "ok",
        "businesses": catalog.count,
        "skipped": catalog.skipped,
        "loaded_at": catalog.loaded_at.map(|at| at.to_rfc3339()),
        "map_size": state.map_config.map_size,
    }))
}

/// Serve the pre-serialized map geometry.
pub async fn get_map_config(State(state): State<AppState>) -> impl IntoResponse {
    json_bytes_response(
        (*state.map_config_json).clone(),
        MAP_CONFIG_CACHE_CONTROL,
        None,
    )
}

/// Serve the pre-serialized business list, honoring `If-None-Match`.
pub async fn get_businesses(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let (etag, json): (String, Arc<Bytes>) = {
        let catalog = state.catalog.read().await;
        (catalog.etag.clone(), Arc::clone(&catalog.json))
    };

    if if_none_match_matches(&headers, &etag) {
        return not_modified_response(CATALOG_CACHE_CONTROL, Some(etag.as_str()));
    }

    json_bytes_response((*json).clone(), CATALOG_CACHE_CONTROL, Some(etag.as_str()))
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
    use sampmap_shared::{MapConfig, Orientation, parse_catalog};
    use tower::ServiceExt;

    use super::if_none_match_matches;
    use crate::state::{AppState, CatalogSnapshot};

    fn test_state() -> AppState {
        let config = MapConfig {
            orientation: Orientation::InvertedY,
            ..MapConfig::default()
        };
        AppState::new(
            config,
            PathBuf::from("data/businesses.json"),
            PathBuf::from("client/dist"),
        )
    }

    async fn load_sample_catalog(state: &AppState) {
        let catalog = parse_catalog(
            r#"[{"name": "Ten Green Bottles", "type": "cafe", "owner": "Sweet", "x": 2480.5, "y": -1660}]"#,
        )
        .expect("catalog");
        *state.catalog.write().await = CatalogSnapshot::from_catalog(&catalog).expect("snapshot");
    }

    async fn get(state: AppState, uri: &str, headers: &[(header::HeaderName, &str)]) -> axum::response::Response {
        let mut request = Request::builder().uri(uri);
        for (name, value) in headers {
            request = request.header(name.clone(), *value);
        }
        crate::app::build_app(state)
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[test]
    fn if_none_match_accepts_weak_and_wildcard_tags() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("\"other\", W/\"businesses-1\""),
        );
        assert!(if_none_match_matches(&headers, "\"businesses-1\""));
        assert!(!if_none_match_matches(&headers, "\"businesses-2\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"anything\""));
        assert!(!if_none_match_matches(&HeaderMap::new(), "\"anything\""));
    }

    #[tokio::test]
    async fn map_config_endpoint_serves_configured_geometry() {
        let response = get(test_state(), "/api/map", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["map_size"], 6144.0);
        assert_eq!(body["half_extent"], 3000.0);
        assert_eq!(body["orientation"], "inverted_y");
    }

    #[tokio::test]
    async fn businesses_endpoint_serves_catalog_with_etag() {
        let state = test_state();
        load_sample_catalog(&state).await;

        let response = get(state.clone(), "/api/businesses", &[]).await;
        assert_eq!(response.status(), StatusCode::OK);
        let etag = response
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .expect("etag header");
        let body = body_json(response).await;
        assert_eq!(body[0]["type"], "cafe");
        assert_eq!(body[0]["x"], 2480.5);

        let cached = get(state, "/api/businesses", &[(header::IF_NONE_MATCH, etag.as_str())]).await;
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn health_reports_catalog_counts() {
        let state = test_state();
        let before = body_json(get(state.clone(), "/api/health", &[]).await).await;
        assert_eq!(before["status"], "ok");
        assert_eq!(before["businesses"], 0);
        assert!(before["loaded_at"].is_null());
        assert_eq!(before["map_size"], 6144.0);

        load_sample_catalog(&state).await;
        let after = body_json(get(state, "/api/health", &[]).await).await;
        assert_eq!(after["businesses"], 1);
        assert!(after["loaded_at"].is_string());
    }
}
