use tracing::warn;

use crate::catalog;
use crate::config::catalog_refresh_interval;
use crate::state::AppState;

pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(catalog_refresh_interval());
    // The first tick completes immediately; startup already loaded the catalog.
    interval.tick().await;

    loop {
        interval.tick().await;

        if let Err(e) = catalog::reload(&state).await {
            warn!(error = %e, "catalog reload failed, keeping previous catalog");
        }
    }
}
