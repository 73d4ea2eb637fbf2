use sampmap_shared::{Business, MapConfig};

pub async fn fetch_map_config() -> Result<MapConfig, String> {
    let resp = gloo_net::http::Request::get("/api/map")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<MapConfig>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}

pub async fn fetch_businesses() -> Result<Vec<Business>, String> {
    let resp = gloo_net::http::Request::get("/api/businesses")
        .send()
        .await
        .map_err(|e| format!("fetch error: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {}", resp.status()));
    }

    resp.json::<Vec<Business>>()
        .await
        .map_err(|e| format!("parse error: {e}"))
}
