use crate::error::{Error, Result};
use crate::models::settings::Settings;
use serde_json::{Map, Value as JsonValue};

/// Writes `settings[category][key] = value` using the wire (camelCase) names.
///
/// The value has to fit the field's type. Combinations such as domain access
/// without any allowed domain are accepted as-is.
pub fn set_setting(settings: &mut Settings, category: &str, key: &str, value: JsonValue) -> Result<()> {
    let mut tree = serde_json::to_value(&*settings)?;
    let root = tree
        .as_object_mut()
        .ok_or_else(|| Error::BadRequest("Settings are not an object".to_string()))?;

    let section = root
        .entry(category.to_string())
        .or_insert_with(|| JsonValue::Object(Map::new()));
    let section = section
        .as_object_mut()
        .ok_or_else(|| Error::BadRequest(format!("Setting category '{}' is not a group", category)))?;
    section.insert(key.to_string(), value);

    let updated: Settings = serde_json::from_value(tree)
        .map_err(|e| Error::BadRequest(format!("Invalid setting {}.{}: {}", category, key, e)))?;
    *settings = updated;
    Ok(())
}
