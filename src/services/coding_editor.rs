use crate::error::{Error, Result};
use crate::models::coding_challenge::{CodingChallenge, Language, TestCase};
use crate::models::mcq::QuestionDifficulty;
use serde::{Deserialize, Serialize};

/// Draft challenge plus the test case currently being typed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingDraft {
    pub challenge: CodingChallenge,
    pub test_case: TestCase,
}

/// Partial update of the draft challenge's text and limits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub problem_statement: Option<String>,
    pub constraints: Option<String>,
    pub marks: Option<u32>,
    pub time_limit: Option<u32>,
    pub memory_limit: Option<u32>,
    pub difficulty: Option<QuestionDifficulty>,
}

impl CodingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_fields(&mut self, fields: ChallengeFields) -> Result<()> {
        for (name, value) in [
            ("marks", fields.marks),
            ("timeLimit", fields.time_limit),
            ("memoryLimit", fields.memory_limit),
        ] {
            if value == Some(0) {
                return Err(Error::BadRequest(format!("{} must be positive", name)));
            }
        }

        let c = &mut self.challenge;
        if let Some(v) = fields.title {
            c.title = v;
        }
        if let Some(v) = fields.description {
            c.description = v;
        }
        if let Some(v) = fields.problem_statement {
            c.problem_statement = v;
        }
        if let Some(v) = fields.constraints {
            c.constraints = v;
        }
        if let Some(v) = fields.marks {
            c.marks = v;
        }
        if let Some(v) = fields.time_limit {
            c.time_limit = v;
        }
        if let Some(v) = fields.memory_limit {
            c.memory_limit = v;
        }
        if let Some(v) = fields.difficulty {
            c.difficulty = v;
        }
        Ok(())
    }

    pub fn toggle_language(&mut self, language: Language) {
        let langs = &mut self.challenge.allowed_languages;
        if !langs.remove(&language) {
            langs.insert(language);
        }
    }

    pub fn set_test_case(&mut self, input: Option<String>, output: Option<String>, is_hidden: Option<bool>) {
        if let Some(v) = input {
            self.test_case.input = v;
        }
        if let Some(v) = output {
            self.test_case.output = v;
        }
        if let Some(v) = is_hidden {
            self.test_case.is_hidden = v;
        }
    }

    pub fn add_test_case(&mut self) {
        let case = std::mem::take(&mut self.test_case);
        self.challenge.test_cases.push(case);
    }

    pub fn remove_test_case(&mut self, index: usize) -> Result<()> {
        if index >= self.challenge.test_cases.len() {
            return Err(Error::BadRequest(format!("Test case {} out of range", index)));
        }
        self.challenge.test_cases.remove(index);
        Ok(())
    }

    /// No required fields here; whatever is in the draft gets committed.
    pub fn take_for_commit(&mut self) -> CodingChallenge {
        self.test_case = TestCase::default();
        std::mem::take(&mut self.challenge)
    }
}
