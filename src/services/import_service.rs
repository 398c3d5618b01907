use crate::error::{Error, Result};
use crate::models::coding_challenge::CodingChallenge;
use crate::models::mcq::{AnswerType, Mcq};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

const MCQ_REQUIRED: [&str; 3] = ["question", "options", "correctOptions"];
const CODING_REQUIRED: [&str; 3] = ["title", "description", "problemStatement"];
const JSON_ARRAY_COLUMNS: [&str; 2] = ["options", "correctOptions"];
const NUMERIC_COLUMNS: [&str; 3] = ["marks", "timeLimit", "memoryLimit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFormat {
    Csv,
    Json,
}

impl ImportFormat {
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(Error::BadRequest(format!(
                "Unsupported file '{}': expected a .csv or .json file",
                name
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportTarget {
    Mcqs,
    CodingChallenges,
}

impl ImportTarget {
    fn required_fields(self) -> &'static [&'static str] {
        match self {
            ImportTarget::Mcqs => &MCQ_REQUIRED,
            ImportTarget::CodingChallenges => &CODING_REQUIRED,
        }
    }
}

/// Decoded and checked records, ready to be appended to the test.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedQuestions {
    Mcqs(Vec<Mcq>),
    CodingChallenges(Vec<CodingChallenge>),
}

impl ImportedQuestions {
    pub fn len(&self) -> usize {
        match self {
            ImportedQuestions::Mcqs(v) => v.len(),
            ImportedQuestions::CodingChallenges(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decodes an uploaded file into questions for `target`. Nothing is applied
/// here, so a failure never leaves a test half-imported.
pub fn import_questions(contents: &str, format: ImportFormat, target: ImportTarget) -> Result<ImportedQuestions> {
    let decoded = match format {
        ImportFormat::Json => serde_json::from_str::<JsonValue>(contents)
            .map_err(|e| Error::ImportParse(format!("Invalid JSON: {}", e)))?,
        ImportFormat::Csv => parse_csv(contents)?,
    };

    let records = match decoded {
        JsonValue::Array(records) => records,
        _ => {
            return Err(Error::ImportValidation(
                "Expected a list of questions".to_string(),
            ))
        }
    };

    for record in &records {
        let obj = record.as_object().ok_or_else(|| {
            Error::ImportValidation("Every question must be an object".to_string())
        })?;
        for field in target.required_fields() {
            if is_missing(obj.get(*field)) {
                return Err(Error::ImportValidation(format!(
                    "Missing required field: {}",
                    field
                )));
            }
        }
    }

    let imported = match target {
        ImportTarget::Mcqs => ImportedQuestions::Mcqs(
            records
                .into_iter()
                .map(decode_mcq)
                .collect::<Result<Vec<_>>>()?,
        ),
        ImportTarget::CodingChallenges => ImportedQuestions::CodingChallenges(
            records
                .into_iter()
                .map(decode_challenge)
                .collect::<Result<Vec<_>>>()?,
        ),
    };

    tracing::debug!(count = imported.len(), ?format, ?target, "decoded import file");
    Ok(imported)
}

fn is_missing(value: Option<&JsonValue>) -> bool {
    match value {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn decode_mcq(record: JsonValue) -> Result<Mcq> {
    let answer_type_given = record.get("answerType").is_some();
    let mut mcq: Mcq = serde_json::from_value(record)
        .map_err(|e| Error::ImportValidation(format!("Invalid question: {}", e)))?;

    if !answer_type_given && mcq.correct_options.len() > 1 {
        mcq.answer_type = AnswerType::Multiple;
    }
    if mcq.answer_type == AnswerType::Single && mcq.correct_options.len() > 1 {
        return Err(Error::ImportValidation(format!(
            "Question '{}' is single-answer but marks {} options correct",
            mcq.question,
            mcq.correct_options.len()
        )));
    }
    if mcq.marks == 0 {
        return Err(Error::ImportValidation(format!(
            "Question '{}': marks must be positive",
            mcq.question
        )));
    }
    if let Some(bad) = mcq.correct_options.iter().find(|&&i| i >= mcq.options.len()) {
        return Err(Error::ImportValidation(format!(
            "Question '{}' marks option {} correct but has only {} options",
            mcq.question,
            bad,
            mcq.options.len()
        )));
    }
    // Ids are handed out by the session.
    mcq.id = 0;
    Ok(mcq)
}

fn decode_challenge(record: JsonValue) -> Result<CodingChallenge> {
    let challenge: CodingChallenge = serde_json::from_value(record)
        .map_err(|e| Error::ImportValidation(format!("Invalid coding challenge: {}", e)))?;
    for (field, value) in [
        ("marks", challenge.marks),
        ("timeLimit", challenge.time_limit),
        ("memoryLimit", challenge.memory_limit),
    ] {
        if value == 0 {
            return Err(Error::ImportValidation(format!(
                "Coding challenge '{}': {} must be positive",
                challenge.title, field
            )));
        }
    }
    Ok(challenge)
}

/// Header line, then one record per line split on bare commas. There is no
/// quoting: a comma inside a value shifts every later column of that row.
fn parse_csv(contents: &str) -> Result<JsonValue> {
    let mut lines = contents.lines().map(|l| l.trim_end_matches('\r'));
    let headers: Vec<&str> = match lines.next() {
        Some(h) if !h.trim().is_empty() => h.split(',').map(str::trim).collect(),
        _ => return Err(Error::ImportParse("CSV file has no header row".to_string())),
    };

    let mut records = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut record = Map::new();
        for (header, raw) in headers.iter().zip(line.split(',')) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let value = if JSON_ARRAY_COLUMNS.contains(header) {
                serde_json::from_str(raw).map_err(|e| {
                    Error::ImportParse(format!(
                        "Row {}: column '{}' is not a JSON array: {}",
                        line_no + 2,
                        header,
                        e
                    ))
                })?
            } else if NUMERIC_COLUMNS.contains(header) {
                raw.parse::<u64>()
                    .map(JsonValue::from)
                    .map_err(|e| {
                        Error::ImportParse(format!(
                            "Row {}: column '{}' is not a number: {}",
                            line_no + 2,
                            header,
                            e
                        ))
                    })?
            } else {
                JsonValue::String(raw.to_string())
            };
            record.insert(header.to_string(), value);
        }
        records.push(JsonValue::Object(record));
    }
    Ok(JsonValue::Array(records))
}
