use crate::models::coding_challenge::Language;
use crate::models::mcq::{AnswerType, QuestionDifficulty};
use crate::models::settings::{self, Settings};
use crate::services::authoring_service::{AuthoringSession, QuestionSection, Tab};
use crate::services::coding_editor::ChallengeFields;
use crate::services::import_service::ImportTarget;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct SetTabPayload {
    pub tab: Tab,
}

#[derive(Debug, Deserialize)]
pub struct SetSectionPayload {
    pub section: QuestionSection,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetSettingPayload {
    #[validate(length(min = 1, message = "Setting category cannot be empty"))]
    pub category: String,
    #[validate(length(min = 1, message = "Setting key cannot be empty"))]
    pub key: String,
    pub value: JsonValue,
}

/// Whole settings tree; the legacy flat shape is migrated on the way in.
#[derive(Debug, Deserialize)]
pub struct ReplaceSettingsPayload {
    #[serde(deserialize_with = "settings::deserialize_reconciled")]
    pub settings: Settings,
}

/// One edit of the MCQ draft, tagged by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum McqDraftAction {
    SetQuestion { text: String },
    AddOption,
    SetOption { index: usize, text: String },
    RemoveOption { index: usize },
    ToggleCorrect { index: usize },
    #[serde(rename_all = "camelCase")]
    SetAnswerType { answer_type: AnswerType },
    SetMarks { marks: u32 },
    SetDifficulty { difficulty: QuestionDifficulty },
    AddTag { tag: String },
    RemoveTag { index: usize },
}

/// One edit of the coding challenge draft, tagged by `action`.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CodingDraftAction {
    SetFields(ChallengeFields),
    ToggleLanguage { language: Language },
    #[serde(rename_all = "camelCase")]
    SetTestCase {
        input: Option<String>,
        output: Option<String>,
        is_hidden: Option<bool>,
    },
    AddTestCase,
    RemoveTestCase { index: usize },
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CancelPayload {
    pub confirmed: bool,
}

/// Uploaded file after the multipart body has been read.
#[derive(Debug, Validate)]
pub struct ImportRequest {
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,
    #[validate(length(min = 1, message = "File is empty"))]
    pub contents: String,
    pub target: ImportTarget,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session: AuthoringSession,
    /// Set when the editor refused a change without failing, e.g. removing
    /// one of the last two options.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub imported: usize,
    pub session: AuthoringSession,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyEstimateResponse {
    pub estimate: QuestionDifficulty,
    pub current: QuestionDifficulty,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitResponse {
    pub status: &'static str,
    pub redirect: Option<String>,
}
