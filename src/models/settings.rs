use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Settings {
    pub proctoring: ProctoringSettings,
    pub timing: TimingSettings,
    pub access: AccessSettings,
    pub results: ResultsSettings,
    pub advanced: AdvancedSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ProctoringSettings {
    pub enabled: bool,
    pub webcam: bool,
    pub screen: bool,
    pub recording: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TimingSettings {
    pub time_per_question: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AccessSettings {
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub require_registration: bool,
    /// Only meaningful for `AccessType::Domain`; an empty list is accepted.
    pub allowed_domains: Vec<String>,
}

impl Default for AccessSettings {
    fn default() -> Self {
        Self {
            access_type: AccessType::Private,
            require_registration: true,
            allowed_domains: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessType {
    #[default]
    Private,
    Public,
    Domain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ResultsSettings {
    pub show_results: bool,
    pub show_answers: bool,
    pub allow_review: bool,
}

impl Default for ResultsSettings {
    fn default() -> Self {
        Self {
            show_results: true,
            show_answers: false,
            allow_review: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct AdvancedSettings {
    pub randomize_questions: bool,
    pub prevent_copy: bool,
    pub negative_marking: bool,
}

/// Older clients send a flat bag of booleans instead of the category tree.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlatSettings {
    pub randomize_questions: Option<bool>,
    pub show_results: Option<bool>,
    pub allow_review: Option<bool>,
    pub proctoring: Option<bool>,
    pub time_per_question: Option<bool>,
    pub negative_marking: Option<bool>,
}

impl From<FlatSettings> for Settings {
    fn from(flat: FlatSettings) -> Self {
        let mut settings = Settings::default();
        if let Some(v) = flat.randomize_questions {
            settings.advanced.randomize_questions = v;
        }
        if let Some(v) = flat.show_results {
            settings.results.show_results = v;
        }
        if let Some(v) = flat.allow_review {
            settings.results.allow_review = v;
        }
        if let Some(v) = flat.proctoring {
            settings.proctoring.enabled = v;
        }
        if let Some(v) = flat.time_per_question {
            settings.timing.time_per_question = v;
        }
        if let Some(v) = flat.negative_marking {
            settings.advanced.negative_marking = v;
        }
        settings
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingsShape {
    Nested(Settings),
    Flat(FlatSettings),
}

/// Accepts either the nested or the legacy flat shape and always yields the
/// nested one.
pub fn deserialize_reconciled<'de, D>(deserializer: D) -> Result<Settings, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match SettingsShape::deserialize(deserializer)? {
        SettingsShape::Nested(settings) => settings,
        SettingsShape::Flat(flat) => flat.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_reconciled")]
        settings: Settings,
    }

    #[test]
    fn flat_shape_migrates_into_categories() {
        let holder: Holder = serde_json::from_value(json!({
            "settings": {
                "randomizeQuestions": true,
                "showResults": false,
                "proctoring": true,
                "timePerQuestion": true,
                "negativeMarking": true
            }
        }))
        .unwrap();

        let s = holder.settings;
        assert!(s.advanced.randomize_questions);
        assert!(!s.results.show_results);
        assert!(s.results.allow_review);
        assert!(s.proctoring.enabled);
        assert!(!s.proctoring.webcam);
        assert!(s.timing.time_per_question);
        assert!(s.advanced.negative_marking);
    }

    #[test]
    fn nested_shape_passes_through() {
        let holder: Holder = serde_json::from_value(json!({
            "settings": {
                "proctoring": { "enabled": true, "webcam": true },
                "access": { "type": "domain", "allowedDomains": ["acme.io"] }
            }
        }))
        .unwrap();

        let s = holder.settings;
        assert!(s.proctoring.webcam);
        assert_eq!(s.access.access_type, AccessType::Domain);
        assert_eq!(s.access.allowed_domains, vec!["acme.io".to_string()]);
        assert!(s.access.require_registration);
    }

    #[test]
    fn empty_object_is_default() {
        let holder: Holder = serde_json::from_value(json!({ "settings": {} })).unwrap();
        assert_eq!(holder.settings, Settings::default());
    }
}
