use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mcq {
    #[serde(default)]
    pub id: u64,
    pub question: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_options: BTreeSet<usize>,
    #[serde(default)]
    pub answer_type: AnswerType,
    #[serde(default = "default_marks")]
    pub marks: u32,
    #[serde(default)]
    pub difficulty: QuestionDifficulty,
    #[serde(default)]
    pub tags: Vec<String>,
}

pub fn default_marks() -> u32 {
    1
}

impl Default for Mcq {
    fn default() -> Self {
        Self {
            id: 0,
            question: String::new(),
            options: vec![String::new(), String::new()],
            correct_options: BTreeSet::new(),
            answer_type: AnswerType::Single,
            marks: default_marks(),
            difficulty: QuestionDifficulty::Medium,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    #[default]
    Single,
    Multiple,
}

/// Difficulty of a single question or challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}
