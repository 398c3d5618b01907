use crate::error::{Error, Result};
use crate::models::coding_challenge::CodingChallenge;
use crate::models::mcq::Mcq;
use crate::models::test::{DifficultyLevel, Test, TestCategory, TestType};
use crate::services::coding_editor::CodingDraft;
use crate::services::import_service::{self, ImportFormat, ImportTarget, ImportedQuestions};
use crate::services::mcq_editor::McqDraft;
use crate::services::navigation::Navigator;
use crate::services::save_service::SaveClient;
use crate::services::settings_editor;
use crate::services::validation_service::{field_messages, validate_test};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Details,
    Questions,
    Settings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSection {
    #[default]
    Mcq,
    Coding,
}

/// A committed question as it looked at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McqVersion {
    pub saved_at: DateTime<Utc>,
    pub mcq: Mcq,
}

/// Partial update of the details tab. Derived counters are not part of it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsPatch {
    pub title: Option<String>,
    pub category: Option<TestCategory>,
    #[serde(rename = "type")]
    pub test_type: Option<TestType>,
    pub difficulty: Option<DifficultyLevel>,
    pub duration: Option<u32>,
    pub passing_score: Option<u32>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    pub skills: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Editing,
    Saving,
    Saved,
    Cancelled,
}

/// One vendor authoring one test: the test itself, both editor drafts and
/// the bookkeeping the page shows around them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoringSession {
    pub id: Uuid,
    pub test: Test,
    pub active_tab: Tab,
    pub active_section: QuestionSection,
    pub mcq_draft: McqDraft,
    pub coding_draft: CodingDraft,
    pub field_errors: BTreeMap<String, String>,
    pub status: SessionStatus,
    pub save_error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    versions: BTreeMap<u64, Vec<McqVersion>>,
    #[serde(skip)]
    next_mcq_id: u64,
}

impl AuthoringSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            test: Test::default(),
            active_tab: Tab::default(),
            active_section: QuestionSection::default(),
            mcq_draft: McqDraft::new(),
            coding_draft: CodingDraft::new(),
            field_errors: BTreeMap::new(),
            status: SessionStatus::Editing,
            save_error: None,
            created_at: Utc::now(),
            versions: BTreeMap::new(),
            next_mcq_id: 1,
        }
    }

    pub fn is_saving(&self) -> bool {
        self.status == SessionStatus::Saving
    }

    /// Edits are only taken while the session is editing: not during an
    /// in-flight save and never after it was saved or cancelled.
    pub fn ensure_editable(&self) -> Result<()> {
        match self.status {
            SessionStatus::Editing => Ok(()),
            SessionStatus::Saving => Err(Error::Conflict("A save is in progress".to_string())),
            SessionStatus::Saved | SessionStatus::Cancelled => {
                Err(Error::Conflict("This authoring session is closed".to_string()))
            }
        }
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn set_section(&mut self, section: QuestionSection) {
        self.active_section = section;
    }

    pub fn update_details(&mut self, patch: DetailsPatch) -> Result<()> {
        self.ensure_editable()?;
        let t = &mut self.test;
        if let Some(v) = patch.title {
            t.title = v;
        }
        if let Some(v) = patch.category {
            t.category = Some(v);
        }
        if let Some(v) = patch.test_type {
            t.test_type = Some(v);
        }
        if let Some(v) = patch.difficulty {
            t.difficulty = v;
        }
        if let Some(v) = patch.duration {
            t.duration = Some(v);
        }
        if let Some(v) = patch.passing_score {
            t.passing_score = Some(v);
        }
        if let Some(v) = patch.description {
            t.description = v;
        }
        if let Some(v) = patch.instructions {
            t.instructions = v;
        }
        if let Some(v) = patch.skills {
            t.skills = v;
        }
        Ok(())
    }

    pub fn set_setting(&mut self, category: &str, key: &str, value: JsonValue) -> Result<()> {
        self.ensure_editable()?;
        settings_editor::set_setting(&mut self.test.settings, category, key, value)
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_mcq_id;
        self.next_mcq_id += 1;
        id
    }

    pub fn commit_mcq(&mut self) -> Result<&Mcq> {
        self.ensure_editable()?;
        self.test.marks_with([self.mcq_draft.mcq.marks])?;
        let mut mcq = self.mcq_draft.take_for_commit()?;
        mcq.id = self.next_id();
        self.test.mcqs.push(mcq);
        self.test.recompute_totals()?;
        tracing::debug!(session_id = %self.id, total_marks = self.test.total_marks, "mcq committed");
        self.test
            .mcqs
            .last()
            .ok_or_else(|| Error::NotFound("Committed question".to_string()))
    }

    pub fn remove_mcq(&mut self, index: usize) -> Result<Mcq> {
        self.ensure_editable()?;
        if index >= self.test.mcqs.len() {
            return Err(Error::NotFound(format!("Question at position {}", index)));
        }
        let removed = self.test.mcqs.remove(index);
        self.test.recompute_totals()?;
        Ok(removed)
    }

    pub fn commit_challenge(&mut self) -> Result<&CodingChallenge> {
        self.ensure_editable()?;
        self.test.marks_with([self.coding_draft.challenge.marks])?;
        let challenge = self.coding_draft.take_for_commit();
        self.test.coding_challenges.push(challenge);
        self.test.recompute_totals()?;
        self.test
            .coding_challenges
            .last()
            .ok_or_else(|| Error::NotFound("Committed coding challenge".to_string()))
    }

    pub fn remove_challenge(&mut self, index: usize) -> Result<CodingChallenge> {
        self.ensure_editable()?;
        if index >= self.test.coding_challenges.len() {
            return Err(Error::NotFound(format!("Coding challenge at position {}", index)));
        }
        let removed = self.test.coding_challenges.remove(index);
        self.test.recompute_totals()?;
        Ok(removed)
    }

    /// Appends a timestamped copy of a committed question to its history.
    /// The history lives only as long as this session.
    pub fn snapshot_version(&mut self, mcq_id: u64) -> Result<&McqVersion> {
        let mcq = self
            .test
            .mcqs
            .iter()
            .find(|q| q.id == mcq_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Question {}", mcq_id)))?;
        let log = self.versions.entry(mcq_id).or_default();
        log.push(McqVersion {
            saved_at: Utc::now(),
            mcq,
        });
        Ok(&log[log.len() - 1])
    }

    pub fn versions(&self, mcq_id: u64) -> &[McqVersion] {
        self.versions.get(&mcq_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All-or-nothing: on any error the test is left exactly as it was.
    pub fn import_questions(&mut self, contents: &str, format: ImportFormat, target: ImportTarget) -> Result<usize> {
        self.ensure_editable()?;
        let imported = import_service::import_questions(contents, format, target)?;
        let count = imported.len();
        let incoming: Vec<u32> = match &imported {
            ImportedQuestions::Mcqs(mcqs) => mcqs.iter().map(|q| q.marks).collect(),
            ImportedQuestions::CodingChallenges(challenges) => challenges.iter().map(|c| c.marks).collect(),
        };
        self.test
            .marks_with(incoming)
            .map_err(|_| Error::ImportValidation(format!("Total marks cannot exceed {}", u32::MAX)))?;
        match imported {
            ImportedQuestions::Mcqs(mcqs) => {
                for mut mcq in mcqs {
                    mcq.id = self.next_id();
                    self.test.mcqs.push(mcq);
                }
            }
            ImportedQuestions::CodingChallenges(challenges) => {
                self.test.coding_challenges.extend(challenges);
            }
        }
        self.test.recompute_totals()?;
        tracing::info!(session_id = %self.id, count, ?target, "questions imported");
        Ok(count)
    }

    /// Validates and, if clean, flips into the saving state and returns the
    /// test to hand to the save endpoint.
    pub fn begin_submit(&mut self) -> Result<Test> {
        match self.status {
            SessionStatus::Saving => {
                return Err(Error::Conflict("A save is already in progress".to_string()))
            }
            SessionStatus::Saved | SessionStatus::Cancelled => {
                return Err(Error::Conflict("This authoring session is closed".to_string()))
            }
            SessionStatus::Editing => {}
        }

        self.test.recompute_totals()?;
        if let Err(errs) = validate_test(&self.test) {
            self.field_errors = field_messages(&errs);
            tracing::info!(session_id = %self.id, fields = ?self.field_errors.keys().collect::<Vec<_>>(), "submit blocked by validation");
            return Err(Error::Validation(errs));
        }

        self.field_errors.clear();
        self.save_error = None;
        self.status = SessionStatus::Saving;
        Ok(self.test.clone())
    }

    pub fn finish_submit(&mut self, outcome: Result<()>, dashboard_path: &str, nav: &dyn Navigator) -> Result<()> {
        match outcome {
            Ok(()) => {
                self.status = SessionStatus::Saved;
                tracing::info!(session_id = %self.id, title = %self.test.title, "test saved");
                nav.navigate(dashboard_path);
                Ok(())
            }
            Err(e) => {
                self.status = SessionStatus::Editing;
                let message = e.to_string();
                tracing::warn!(session_id = %self.id, error = %message, "test save failed");
                self.save_error = Some(message);
                Err(e)
            }
        }
    }

    /// Single-owner variant of the submit flow.
    pub async fn submit(&mut self, save: &dyn SaveClient, dashboard_path: &str, nav: &dyn Navigator) -> Result<()> {
        let test = self.begin_submit()?;
        let outcome = save.save_test(&test).await;
        self.finish_submit(outcome, dashboard_path, nav)
    }

    /// Returns whether the session was abandoned. Without confirmation
    /// nothing changes.
    pub fn cancel(&mut self, confirmed: bool, dashboard_path: &str, nav: &dyn Navigator) -> bool {
        if !confirmed {
            return false;
        }
        self.status = SessionStatus::Cancelled;
        nav.navigate(dashboard_path);
        true
    }
}

impl Default for AuthoringSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::navigation::MockNavigator;
    use crate::services::save_service::MockSaveClient;

    const DASHBOARD: &str = "/vendor/dashboard";

    fn ready_session() -> AuthoringSession {
        let mut session = AuthoringSession::new();
        session.update_details(DetailsPatch {
            title: Some("Backend screening".into()),
            category: Some(TestCategory::Programming),
            test_type: Some(TestType::Mixed),
            duration: Some(45),
            passing_score: Some(60),
            ..DetailsPatch::default()
        })
        .unwrap();
        session
    }

    fn commit_question(session: &mut AuthoringSession, text: &str, marks: u32) -> u64 {
        session.mcq_draft.set_question(text);
        session.mcq_draft.set_marks(marks).unwrap();
        session.commit_mcq().unwrap().id
    }

    #[test]
    fn total_marks_tracks_every_change() {
        let mut session = AuthoringSession::new();
        commit_question(&mut session, "Q1", 2);
        commit_question(&mut session, "Q2", 3);
        assert_eq!(session.test.total_marks, 5);

        session
            .coding_draft
            .apply_fields(crate::services::coding_editor::ChallengeFields {
                marks: Some(10),
                ..Default::default()
            })
            .unwrap();
        session.commit_challenge().unwrap();
        assert_eq!(session.test.total_marks, 15);

        session.remove_mcq(0).unwrap();
        assert_eq!(session.test.total_marks, 13);
        session.remove_challenge(0).unwrap();
        assert_eq!(session.test.total_marks, 3);
        assert_eq!(session.test.total_questions, 1);

        assert!(session.remove_mcq(4).is_err());
        assert_eq!(session.test.total_marks, 3);
    }

    #[test]
    fn mcq_ids_are_unique_even_in_quick_succession() {
        let mut session = AuthoringSession::new();
        let ids: BTreeSet<u64> = (0..50)
            .map(|i| commit_question(&mut session, &format!("Q{}", i), 1))
            .collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn commit_without_question_text_changes_nothing() {
        let mut session = AuthoringSession::new();
        assert!(session.commit_mcq().is_err());
        assert!(session.test.mcqs.is_empty());
        assert_eq!(session.test.total_marks, 0);
    }

    #[test]
    fn version_history_is_kept_outside_the_test() {
        let mut session = AuthoringSession::new();
        let id = commit_question(&mut session, "Original", 1);
        session.snapshot_version(id).unwrap();
        session.test.mcqs[0].question = "Edited".into();
        session.snapshot_version(id).unwrap();

        let versions = session.versions(id);
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].mcq.question, "Original");
        assert_eq!(versions[1].mcq.question, "Edited");
        assert!(versions[0].saved_at <= versions[1].saved_at);

        assert!(session.snapshot_version(999).is_err());
        assert!(session.versions(999).is_empty());

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("versions").is_none());
    }

    #[test]
    fn failed_import_leaves_test_untouched() {
        let mut session = AuthoringSession::new();
        commit_question(&mut session, "Existing", 2);
        let before = session.test.clone();

        let csv = "question,options,correctOptions\nBroken row,[\"x\"]\n";
        let err = session
            .import_questions(csv, ImportFormat::Csv, ImportTarget::Mcqs)
            .unwrap_err();
        assert!(matches!(err, Error::ImportValidation(_)));
        assert_eq!(session.test, before);
    }

    #[test]
    fn json_import_appends_and_recomputes() {
        let mut session = AuthoringSession::new();
        let json = r#"[
            {"question": "A?", "options": ["1", "2"], "correctOptions": [0], "marks": 4},
            {"question": "B?", "options": ["1", "2"], "correctOptions": [1], "marks": 6}
        ]"#;
        let count = session
            .import_questions(json, ImportFormat::Json, ImportTarget::Mcqs)
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(session.test.mcqs[0].question, "A?");
        assert_eq!(session.test.mcqs[1].question, "B?");
        assert_ne!(session.test.mcqs[0].id, session.test.mcqs[1].id);
        assert_eq!(session.test.total_marks, 10);
    }

    #[test]
    fn import_that_would_overflow_total_marks_is_rejected_whole() {
        let mut session = AuthoringSession::new();
        commit_question(&mut session, "Existing", 2);
        let before = session.test.clone();

        let json = r#"[
            {"question": "Huge", "options": ["1", "2"], "correctOptions": [0], "marks": 4294967295},
            {"question": "Small", "options": ["1", "2"], "correctOptions": [1], "marks": 1}
        ]"#;
        let err = session
            .import_questions(json, ImportFormat::Json, ImportTarget::Mcqs)
            .unwrap_err();
        assert!(matches!(err, Error::ImportValidation(_)));
        assert_eq!(session.test, before);
        assert_eq!(session.test.total_marks, 2);
    }

    #[test]
    fn commit_that_would_overflow_total_marks_keeps_the_draft() {
        let mut session = AuthoringSession::new();
        commit_question(&mut session, "Heavy", u32::MAX);

        session.mcq_draft.set_question("One more");
        assert!(matches!(session.commit_mcq(), Err(Error::BadRequest(_))));
        assert_eq!(session.test.mcqs.len(), 1);
        assert_eq!(session.test.total_marks, u32::MAX);
        assert_eq!(session.mcq_draft.mcq.question, "One more");

        assert!(session.commit_challenge().is_err());
        assert!(session.test.coding_challenges.is_empty());
    }

    #[test]
    fn closed_or_saving_session_refuses_edits() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        assert!(matches!(
            session.update_details(DetailsPatch::default()),
            Err(Error::Conflict(_))
        ));

        session.status = SessionStatus::Saved;
        session.mcq_draft.set_question("Late");
        assert!(matches!(session.commit_mcq(), Err(Error::Conflict(_))));
        assert!(matches!(
            session.import_questions("[]", ImportFormat::Json, ImportTarget::Mcqs),
            Err(Error::Conflict(_))
        ));
        assert!(session.set_setting("results", "showResults", serde_json::json!(false)).is_err());
        assert!(session.test.mcqs.is_empty());
    }

    #[test]
    fn submit_with_errors_never_calls_save() {
        let mut session = AuthoringSession::new();
        let mut save = MockSaveClient::new();
        save.expect_save_test().never();
        let mut nav = MockNavigator::new();
        nav.expect_navigate().never();

        let err = tokio_test::block_on(session.submit(&save, DASHBOARD, &nav)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(session.field_errors.contains_key("title"));
        assert_eq!(session.status, SessionStatus::Editing);
    }

    #[tokio::test]
    async fn successful_submit_navigates_to_dashboard() {
        let mut session = ready_session();
        commit_question(&mut session, "Q", 5);

        let mut save = MockSaveClient::new();
        save.expect_save_test()
            .withf(|t| t.title == "Backend screening" && t.total_marks == 5)
            .times(1)
            .returning(|_| Ok(()));
        let mut nav = MockNavigator::new();
        nav.expect_navigate().withf(|d| d == DASHBOARD).times(1).return_const(());

        session.submit(&save, DASHBOARD, &nav).await.unwrap();
        assert_eq!(session.status, SessionStatus::Saved);
        assert!(session.field_errors.is_empty());
    }

    #[tokio::test]
    async fn failed_save_keeps_test_for_retry() {
        let mut session = ready_session();
        let before = session.test.clone();

        let mut save = MockSaveClient::new();
        save.expect_save_test()
            .times(1)
            .returning(|_| Err(Error::Save("status 500: boom".into())));
        let mut nav = MockNavigator::new();
        nav.expect_navigate().never();

        assert!(session.submit(&save, DASHBOARD, &nav).await.is_err());
        assert_eq!(session.status, SessionStatus::Editing);
        assert_eq!(session.save_error.as_deref(), Some("Failed to save test: status 500: boom"));
        assert_eq!(session.test, before);

        let mut retry = MockSaveClient::new();
        retry.expect_save_test().times(1).returning(|_| Ok(()));
        let mut nav = MockNavigator::new();
        nav.expect_navigate().times(1).return_const(());
        session.submit(&retry, DASHBOARD, &nav).await.unwrap();
        assert!(session.save_error.is_none());
    }

    #[test]
    fn second_submit_while_saving_is_refused() {
        let mut session = ready_session();
        session.begin_submit().unwrap();
        assert!(matches!(session.begin_submit(), Err(Error::Conflict(_))));
    }

    #[test]
    fn cancel_without_confirmation_changes_nothing() {
        let mut session = ready_session();
        session.set_tab(Tab::Settings);
        let before = session.test.clone();

        let mut nav = MockNavigator::new();
        nav.expect_navigate().never();
        assert!(!session.cancel(false, DASHBOARD, &nav));
        assert_eq!(session.test, before);
        assert_eq!(session.active_tab, Tab::Settings);
        assert_eq!(session.status, SessionStatus::Editing);
    }

    #[test]
    fn confirmed_cancel_navigates() {
        let mut session = ready_session();
        let mut nav = MockNavigator::new();
        nav.expect_navigate().withf(|d| d == DASHBOARD).times(1).return_const(());
        assert!(session.cancel(true, DASHBOARD, &nav));
        assert_eq!(session.status, SessionStatus::Cancelled);
    }
}
