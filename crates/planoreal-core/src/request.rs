//! Inbound lesson request as submitted by the web form.
//!
//! Field names follow the public API (`subject`, `gradeLevel`, ...). The
//! Portuguese names used by the original form (`assunto`, `serie`, ...) are
//! accepted as aliases.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepted JSON keys for each request field, public name first.
pub const SUBJECT_KEYS: &[&str] = &["subject", "assunto"];
pub const GRADE_KEYS: &[&str] = &["gradeLevel", "serie"];
pub const DURATION_KEYS: &[&str] = &["duration", "duracao"];
pub const OBJECTIVES_KEYS: &[&str] = &["objectives", "objetivo"];
pub const RESOURCES_KEYS: &[&str] = &["resources", "recursos"];
pub const CLASS_PROFILE_KEYS: &[&str] = &["classProfile", "perfilTurma"];

/// Look up the first present key among `keys` in a JSON object.
///
/// Returns `None` when `body` is not an object or none of the keys exist.
pub fn field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    let obj = body.as_object()?;
    keys.iter().find_map(|k| obj.get(*k))
}

/// Lesson duration as submitted: either free text ("50", "50 minutos") or a
/// JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Number(f64),
    Text(String),
}

impl From<&str> for DurationInput {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<u32> for DurationInput {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// A validated but not yet normalized lesson request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonRequest {
    #[serde(alias = "assunto")]
    pub subject: String,
    #[serde(alias = "serie")]
    pub grade_level: String,
    #[serde(alias = "duracao")]
    pub duration: DurationInput,
    #[serde(alias = "objetivo", deserialize_with = "text_list")]
    pub objectives: Vec<String>,
    #[serde(default, alias = "recursos", deserialize_with = "optional_text_list")]
    pub resources: Vec<String>,
    #[serde(default, alias = "perfilTurma", deserialize_with = "optional_text_list")]
    pub class_profile: Vec<String>,
}

/// Render a list element as text. Strings pass through, `null` becomes
/// empty, anything else uses its JSON representation.
fn element_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<Value>::deserialize(deserializer)?;
    Ok(items.into_iter().map(element_text).collect())
}

fn optional_text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(element_text)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_public_field_names() {
        let req: LessonRequest = serde_json::from_value(json!({
            "subject": "Frações",
            "gradeLevel": "5º ano EF",
            "duration": "50",
            "objectives": ["Introdução ao tema"],
            "resources": ["Quadro e giz/caneta"],
            "classProfile": ["Turma calma"],
        }))
        .unwrap();
        assert_eq!(req.subject, "Frações");
        assert_eq!(req.grade_level, "5º ano EF");
        assert_eq!(req.duration, DurationInput::Text("50".to_string()));
        assert_eq!(req.resources, vec!["Quadro e giz/caneta"]);
        assert_eq!(req.class_profile, vec!["Turma calma"]);
    }

    #[test]
    fn deserializes_portuguese_aliases() {
        let req: LessonRequest = serde_json::from_value(json!({
            "assunto": "Ciclo da água",
            "serie": "3º ano EF",
            "duracao": 45,
            "objetivo": ["Revisão"],
            "recursos": [],
            "perfilTurma": ["Turma pequena"],
        }))
        .unwrap();
        assert_eq!(req.subject, "Ciclo da água");
        assert_eq!(req.duration, DurationInput::Number(45.0));
        assert_eq!(req.class_profile, vec!["Turma pequena"]);
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let req: LessonRequest = serde_json::from_value(json!({
            "subject": "x",
            "gradeLevel": "y",
            "duration": "30",
            "objectives": ["a"],
            "resources": null,
        }))
        .unwrap();
        assert!(req.resources.is_empty());
        assert!(req.class_profile.is_empty());
    }

    #[test]
    fn non_string_list_elements_become_text() {
        let req: LessonRequest = serde_json::from_value(json!({
            "subject": "x",
            "gradeLevel": "y",
            "duration": "30",
            "objectives": [1, null, "b"],
        }))
        .unwrap();
        assert_eq!(req.objectives, vec!["1", "", "b"]);
    }

    #[test]
    fn field_prefers_public_name() {
        let body = json!({ "subject": "a", "assunto": "b" });
        assert_eq!(field(&body, SUBJECT_KEYS), Some(&json!("a")));
        assert_eq!(field(&json!([1]), SUBJECT_KEYS), None);
    }
}
