use crate::models::test::Test;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{ValidationError, ValidationErrors};

/// Checks the fields a test needs before it can be handed to the save
/// endpoint. Never touches its input.
pub fn validate_test(test: &Test) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if test.title.trim().is_empty() {
        errors.add("title", required("Title is required"));
    }
    if test.category.is_none() {
        errors.add("category", required("Category is required"));
    }
    if test.test_type.is_none() {
        errors.add("type", required("Test type is required"));
    }
    if test.duration.is_none() {
        errors.add("duration", required("Duration is required"));
    }
    if test.passing_score.is_none() {
        errors.add("passingScore", required("Passing score is required"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn required(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("required");
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Flattens validator output into one message per field, first error wins.
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}
