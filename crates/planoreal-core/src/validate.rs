//! Structural validation of a raw request body.
//!
//! Every rule runs independently so the client sees all problems with a
//! submission at once.

use serde_json::Value;
use thiserror::Error;

use crate::request::{
    CLASS_PROFILE_KEYS, DURATION_KEYS, GRADE_KEYS, OBJECTIVES_KEYS, RESOURCES_KEYS, SUBJECT_KEYS,
    field,
};

pub const SUBJECT_REQUIRED: &str = "Assunto da aula é obrigatório";
pub const GRADE_REQUIRED: &str = "Série é obrigatória";
pub const DURATION_REQUIRED: &str = "Duração é obrigatória";
pub const OBJECTIVES_REQUIRED: &str = "Pelo menos um objetivo pedagógico é obrigatório";
pub const RESOURCES_NOT_ARRAY: &str = "Recursos deve ser um array";
pub const CLASS_PROFILE_NOT_ARRAY: &str = "Perfil da turma deve ser um array";

/// A rejected submission, carrying every violated rule in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid lesson request: {}", .details.join("; "))]
pub struct ValidationErrors {
    pub details: Vec<String>,
}

impl ValidationErrors {
    pub fn new(details: Vec<String>) -> Self {
        Self { details }
    }
}

/// Check a raw request body and return the list of violations.
///
/// An empty list means the body is structurally valid. A body that is not a
/// JSON object fails all four required-field rules.
pub fn validate_request(body: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_non_blank_string(field(body, SUBJECT_KEYS)) {
        errors.push(SUBJECT_REQUIRED.to_string());
    }
    if !is_non_blank_string(field(body, GRADE_KEYS)) {
        errors.push(GRADE_REQUIRED.to_string());
    }

    let duration_ok = match field(body, DURATION_KEYS) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    };
    if !duration_ok {
        errors.push(DURATION_REQUIRED.to_string());
    }

    let objectives_ok = matches!(
        field(body, OBJECTIVES_KEYS),
        Some(Value::Array(items)) if !items.is_empty()
    );
    if !objectives_ok {
        errors.push(OBJECTIVES_REQUIRED.to_string());
    }

    if !is_absent_or_array(field(body, RESOURCES_KEYS)) {
        errors.push(RESOURCES_NOT_ARRAY.to_string());
    }
    if !is_absent_or_array(field(body, CLASS_PROFILE_KEYS)) {
        errors.push(CLASS_PROFILE_NOT_ARRAY.to_string());
    }

    errors
}

/// Like [`validate_request`], but as a `Result` for `?` call sites.
pub fn check_request(body: &Value) -> Result<(), ValidationErrors> {
    let errors = validate_request(body);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors::new(errors))
    }
}

fn is_non_blank_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

// JSON `null` counts as absent.
fn is_absent_or_array(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null) | Some(Value::Array(_)))
}
