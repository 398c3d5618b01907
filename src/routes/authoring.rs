use crate::{
    dto::authoring_dto::{
        CancelPayload, CodingDraftAction, DifficultyEstimateResponse, ExitResponse, ImportRequest,
        ImportResponse, McqDraftAction, ReplaceSettingsPayload, SessionResponse, SetSectionPayload, SetSettingPayload,
        SetTabPayload,
    },
    error::{Error, Result},
    services::{
        authoring_service::{AuthoringSession, DetailsPatch, QuestionSection},
        import_service::{ImportFormat, ImportTarget},
        navigation::RecordingNavigator,
    },
    AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

fn session_json(session: &AuthoringSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: session.clone(),
        notice: None,
    })
}

#[axum::debug_handler]
pub async fn create_session(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let shared = state.sessions.create().await;
    let session = shared.lock().await;
    Ok((StatusCode::CREATED, session_json(&session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let session = shared.lock().await;
    Ok(session_json(&session))
}

pub async fn discard_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<DetailsPatch>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.update_details(patch)?;
    Ok(session_json(&session))
}

pub async fn set_tab(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetTabPayload>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.set_tab(payload.tab);
    Ok(session_json(&session))
}

pub async fn set_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetSectionPayload>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.set_section(payload.section);
    Ok(session_json(&session))
}

pub async fn set_setting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetSettingPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.set_setting(&payload.category, &payload.key, payload.value)?;
    Ok(session_json(&session))
}

pub async fn replace_settings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceSettingsPayload>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.ensure_editable()?;
    session.test.settings = payload.settings;
    Ok(session_json(&session))
}

pub async fn edit_mcq_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<McqDraftAction>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.ensure_editable()?;
    let draft = &mut session.mcq_draft;
    let mut notice = None;

    match action {
        McqDraftAction::SetQuestion { text } => draft.set_question(text),
        McqDraftAction::AddOption => draft.add_option(),
        McqDraftAction::SetOption { index, text } => draft.set_option(index, text)?,
        McqDraftAction::RemoveOption { index } => {
            if !draft.remove_option(index)? {
                notice = Some("A question needs at least two options".to_string());
            }
        }
        McqDraftAction::ToggleCorrect { index } => draft.toggle_correct(index)?,
        McqDraftAction::SetAnswerType { answer_type } => draft.set_answer_type(answer_type),
        McqDraftAction::SetMarks { marks } => draft.set_marks(marks)?,
        McqDraftAction::SetDifficulty { difficulty } => draft.set_difficulty(difficulty),
        McqDraftAction::AddTag { tag } => draft.add_tag(tag),
        McqDraftAction::RemoveTag { index } => draft.remove_tag(index)?,
    }

    Ok(Json(SessionResponse {
        session: session.clone(),
        notice,
    }))
}

pub async fn estimate_difficulty(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let session = shared.lock().await;
    Ok(Json(DifficultyEstimateResponse {
        estimate: session.mcq_draft.estimate_difficulty(),
        current: session.mcq_draft.mcq.difficulty,
    }))
}

pub async fn commit_mcq(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.commit_mcq()?;
    Ok((StatusCode::CREATED, session_json(&session)))
}

pub async fn remove_mcq(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.remove_mcq(index)?;
    Ok(session_json(&session))
}

pub async fn snapshot_version(
    State(state): State<AppState>,
    Path((id, mcq_id)): Path<(Uuid, u64)>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    let version = session.snapshot_version(mcq_id)?.clone();
    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path((id, mcq_id)): Path<(Uuid, u64)>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let session = shared.lock().await;
    Ok(Json(json!({
        "mcqId": mcq_id,
        "versions": session.versions(mcq_id),
    })))
}

pub async fn edit_coding_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<CodingDraftAction>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.ensure_editable()?;
    let draft = &mut session.coding_draft;

    match action {
        CodingDraftAction::SetFields(fields) => draft.apply_fields(fields)?,
        CodingDraftAction::ToggleLanguage { language } => draft.toggle_language(language),
        CodingDraftAction::SetTestCase {
            input,
            output,
            is_hidden,
        } => draft.set_test_case(input, output, is_hidden),
        CodingDraftAction::AddTestCase => draft.add_test_case(),
        CodingDraftAction::RemoveTestCase { index } => draft.remove_test_case(index)?,
    }

    Ok(session_json(&session))
}

pub async fn commit_challenge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.commit_challenge()?;
    Ok((StatusCode::CREATED, session_json(&session)))
}

pub async fn remove_challenge(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.remove_challenge(index)?;
    Ok(session_json(&session))
}

/// Multipart upload with a `file` part and an optional `target` part
/// (`mcqs` or `coding_challenges`). Without a target the active question
/// section decides.
pub async fn import_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut target: Option<ImportTarget> = None;
    let mut file: Option<(String, String)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "target" => {
                let raw = field.text().await?;
                target = Some(serde_json::from_value(JsonValue::String(raw.trim().to_string()))?);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                let contents = String::from_utf8(bytes.to_vec())
                    .map_err(|_| Error::ImportParse("File is not valid UTF-8 text".to_string()))?;
                file = Some((file_name, contents));
            }
            _ => {}
        }
    }

    let (file_name, contents) =
        file.ok_or_else(|| Error::BadRequest("No file was uploaded".to_string()))?;

    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;

    let target = target.unwrap_or(match session.active_section {
        QuestionSection::Mcq => ImportTarget::Mcqs,
        QuestionSection::Coding => ImportTarget::CodingChallenges,
    });
    let request = ImportRequest {
        file_name,
        contents,
        target,
    };
    request.validate()?;
    let format = ImportFormat::from_file_name(&request.file_name)?;

    let imported = session
        .import_questions(&request.contents, format, request.target)
        .map_err(|e| {
            tracing::warn!(session_id = %id, file = %request.file_name, error = %e, "import rejected");
            e
        })?;

    Ok(Json(ImportResponse {
        imported,
        session: session.clone(),
    }))
}

/// The session lock is released while the save endpoint is awaited; the
/// saving status keeps a second submit out. The save runs in its own task so
/// the session still settles when the client goes away mid-request. A saved
/// session is dropped from the store.
pub async fn submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let test = shared.lock().await.begin_submit()?;

    let task = {
        let shared = shared.clone();
        let save_client = state.save_client.clone();
        let sessions = state.sessions.clone();
        let dashboard_path = state.dashboard_path.clone();
        tokio::spawn(async move {
            let outcome = save_client.save_test(&test).await;
            let nav = RecordingNavigator::new();
            shared.lock().await.finish_submit(outcome, &dashboard_path, &nav)?;
            if let Err(e) = sessions.remove(id).await {
                tracing::debug!(session_id = %id, error = %e, "saved session already discarded");
            }
            Ok::<_, Error>(nav.take())
        })
    };

    let redirect = match task.await {
        Ok(result) => result?,
        Err(join_err) => {
            // The task died before settling the session.
            let outcome = Err(Error::Save(format!("save task failed: {}", join_err)));
            shared
                .lock()
                .await
                .finish_submit(outcome, &state.dashboard_path, &RecordingNavigator::new())?;
            None
        }
    };

    Ok(Json(ExitResponse {
        status: "saved",
        redirect,
    }))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelPayload>,
) -> Result<impl IntoResponse> {
    let shared = state.sessions.get(id).await?;
    let nav = RecordingNavigator::new();
    let cancelled = shared
        .lock()
        .await
        .cancel(payload.confirmed, &state.dashboard_path, &nav);

    if cancelled {
        state.sessions.remove(id).await?;
    }

    Ok(Json(ExitResponse {
        status: if cancelled { "cancelled" } else { "editing" },
        redirect: nav.take(),
    }))
}
