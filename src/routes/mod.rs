pub mod authoring;
pub mod catalog;
pub mod health;

use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

pub fn app(state: AppState) -> Router {
    let max_import_bytes = state.max_import_bytes;

    let authoring_api = Router::new()
        .route("/api/authoring/sessions", post(authoring::create_session))
        .route(
            "/api/authoring/sessions/:id",
            get(authoring::get_session).delete(authoring::discard_session),
        )
        .route(
            "/api/authoring/sessions/:id/details",
            axum::routing::patch(authoring::update_details),
        )
        .route("/api/authoring/sessions/:id/tab", put(authoring::set_tab))
        .route("/api/authoring/sessions/:id/section", put(authoring::set_section))
        .route(
            "/api/authoring/sessions/:id/settings",
            put(authoring::set_setting).post(authoring::replace_settings),
        )
        .route("/api/authoring/sessions/:id/mcq-draft", post(authoring::edit_mcq_draft))
        .route(
            "/api/authoring/sessions/:id/mcq-draft/difficulty",
            get(authoring::estimate_difficulty),
        )
        .route("/api/authoring/sessions/:id/mcqs", post(authoring::commit_mcq))
        .route(
            "/api/authoring/sessions/:id/mcqs/:index",
            delete(authoring::remove_mcq),
        )
        .route(
            "/api/authoring/sessions/:id/mcq-versions/:mcq_id",
            get(authoring::list_versions).post(authoring::snapshot_version),
        )
        .route(
            "/api/authoring/sessions/:id/coding-draft",
            post(authoring::edit_coding_draft),
        )
        .route(
            "/api/authoring/sessions/:id/coding-challenges",
            post(authoring::commit_challenge),
        )
        .route(
            "/api/authoring/sessions/:id/coding-challenges/:index",
            delete(authoring::remove_challenge),
        )
        .route("/api/authoring/sessions/:id/import", post(authoring::import_questions))
        .route("/api/authoring/sessions/:id/submit", post(authoring::submit))
        .route("/api/authoring/sessions/:id/cancel", post(authoring::cancel));

    Router::new()
        .route("/health", get(health::health))
        .route("/api/catalog", get(catalog::get_catalog))
        .merge(authoring_api)
        .layer(DefaultBodyLimit::max(max_import_bytes))
        .with_state(state)
}
