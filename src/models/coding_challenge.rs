use crate::models::mcq::{default_marks, QuestionDifficulty};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingChallenge {
    pub title: String,
    pub description: String,
    pub problem_statement: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub allowed_languages: BTreeSet<Language>,
    #[serde(default)]
    pub language_implementations: BTreeMap<Language, String>,
    #[serde(default = "default_marks")]
    pub marks: u32,
    #[serde(default = "default_time_limit")]
    pub time_limit: u32,
    #[serde(default = "default_memory_limit")]
    pub memory_limit: u32,
    #[serde(default)]
    pub difficulty: QuestionDifficulty,
    #[serde(default)]
    pub test_cases: Vec<TestCase>,
}

/// Seconds.
fn default_time_limit() -> u32 {
    2
}

/// Megabytes.
fn default_memory_limit() -> u32 {
    256
}

impl Default for CodingChallenge {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            problem_statement: String::new(),
            constraints: String::new(),
            allowed_languages: BTreeSet::new(),
            language_implementations: BTreeMap::new(),
            marks: default_marks(),
            time_limit: default_time_limit(),
            memory_limit: default_memory_limit(),
            difficulty: QuestionDifficulty::Medium,
            test_cases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub is_hidden: bool,
}

/// Languages a coding challenge may allow. Wire names match the labels shown
/// to vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    #[serde(rename = "C++")]
    Cpp,
    #[serde(rename = "C#")]
    CSharp,
    Ruby,
    #[serde(rename = "PHP")]
    Php,
    Go,
    Swift,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::Python,
        Language::JavaScript,
        Language::Java,
        Language::Cpp,
        Language::CSharp,
        Language::Ruby,
        Language::Php,
        Language::Go,
        Language::Swift,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::JavaScript => "JavaScript",
            Language::Java => "Java",
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Ruby => "Ruby",
            Language::Php => "PHP",
            Language::Go => "Go",
            Language::Swift => "Swift",
        }
    }
}
