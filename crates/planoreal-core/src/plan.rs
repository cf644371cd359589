//! The lesson plan returned by the model.
//!
//! The plan is kept as the JSON object the model produced, so unknown keys
//! and unexpected shapes pass through to the client untouched. Accessors
//! read the known keys leniently for rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const KEY_OBJECTIVE: &str = "objetivo_da_aula";
pub const KEY_PHASES: &str = "estrutura";
pub const KEY_PHASE_LABEL: &str = "etapa";
pub const KEY_PHASE_MINUTES: &str = "tempo_minutos";
pub const KEY_PHASE_DESCRIPTION: &str = "descricao";
pub const KEY_MAIN_ACTIVITY: &str = "atividade_principal";
pub const KEY_QUICK_ASSESSMENT: &str = "avaliacao_rapida";
pub const KEY_TEACHER_NOTES: &str = "observacoes_para_o_professor";

/// A parsed lesson plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LessonPlan {
    fields: Map<String, Value>,
}

/// One step of the lesson structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    pub label: String,
    /// Minutes as written by the model; may be a range like "10-15".
    pub minutes: String,
    pub description: String,
}

impl LessonPlan {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// The opening statement (overall lesson objective).
    pub fn objective(&self) -> Option<String> {
        self.fields.get(KEY_OBJECTIVE).and_then(non_empty_text)
    }

    /// Lesson phases in order. Entries that are not objects are skipped.
    pub fn phases(&self) -> Vec<Phase> {
        let Some(Value::Array(items)) = self.fields.get(KEY_PHASES) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| Phase {
                label: text_of(obj.get(KEY_PHASE_LABEL)),
                minutes: text_of(obj.get(KEY_PHASE_MINUTES)),
                description: text_of(obj.get(KEY_PHASE_DESCRIPTION)),
            })
            .collect()
    }

    pub fn main_activity(&self) -> Option<String> {
        self.fields.get(KEY_MAIN_ACTIVITY).and_then(non_empty_text)
    }

    pub fn quick_assessment(&self) -> Option<String> {
        self.fields.get(KEY_QUICK_ASSESSMENT).and_then(non_empty_text)
    }

    pub fn teacher_notes(&self) -> Option<String> {
        self.fields.get(KEY_TEACHER_NOTES).and_then(non_empty_text)
    }
}

/// Scalar JSON as display text. Strings are trimmed; numbers and booleans
/// use their JSON form; anything else is empty.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

fn text_of(value: Option<&Value>) -> String {
    value.map(scalar_text).unwrap_or_default()
}

fn non_empty_text(value: &Value) -> Option<String> {
    Some(scalar_text(value)).filter(|s| !s.is_empty())
}
