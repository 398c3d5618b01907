use crate::models::coding_challenge::Language;
use crate::models::test::{DifficultyLevel, TestCategory, TestType};
use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Closed option lists the builder's dropdowns are filled from.
pub async fn get_catalog() -> impl IntoResponse {
    let languages: Vec<&str> = Language::ALL.iter().map(|l| l.label()).collect();
    Json(json!({
        "testTypes": TestType::ALL,
        "difficultyLevels": DifficultyLevel::ALL,
        "categories": TestCategory::ALL,
        "languages": languages,
    }))
}
