//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod readings;
pub mod status;

use axum::Router;
use axum::routing::{get, post};

use roomsense_app::ports::{KeyValueStore, ReadingSource};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, R>() -> Router<AppState<S, R>>
where
    S: KeyValueStore + Send + Sync + 'static,
    R: ReadingSource + Send + Sync + 'static,
{
    Router::new()
        // Device
        .route(
            "/data",
            get(readings::latest::<S, R>).post(readings::push::<S, R>),
        )
        .route("/toggle-sensor", post(readings::toggle::<S, R>))
        // History
        .route(
            "/history",
            get(history::list::<S, R>).delete(history::clear::<S, R>),
        )
        .route("/history/today", get(history::list_today::<S, R>))
        .route("/history/stats", get(history::stats::<S, R>))
        .route("/history/export.csv", get(history::export_csv::<S, R>))
        .route("/history/export.json", get(history::export_json::<S, R>))
        // Poller
        .route("/status", get(status::show::<S, R>))
}
