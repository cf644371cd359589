//! Normalization of a validated request into prompt-ready values.
//!
//! Free text is trimmed and bounded, duration is coerced to whole minutes,
//! and the resource and class-size selections collapse into canonical
//! states so the prompt synthesizer never sees the raw ambiguity.

use crate::request::{DurationInput, LessonRequest};

/// Maximum number of characters kept from any free-text field.
pub const MAX_FIELD_CHARS: usize = 500;

/// Duration used when the submitted value does not parse to a positive integer.
pub const DEFAULT_DURATION_MINUTES: u32 = 45;

/// Placeholder for an empty objectives list.
pub const UNSPECIFIED_OBJECTIVES: &str = "Não especificado";

/// Placeholder for an empty class profile.
pub const DEFAULT_PROFILE: &str = "Perfil padrão";

/// Resource entries meaning "only the teacher, no materials". Compared
/// case-insensitively against sanitized entries.
pub const INSTRUCTOR_ONLY_MARKERS: &[&str] = &[
    "nenhum",
    "apenas professor",
    "somente professor",
    "nenhum recurso além do professor",
    "nenhum recurso alem do professor",
];

/// Resource clause used for the instructor-only state.
pub const INSTRUCTOR_ONLY_SENTENCE: &str = "Nenhum recurso disponível além do professor e sua voz \
(sem quadro, sem materiais adicionais, apenas a presença do professor e sua voz).";

pub const SMALL_CLASS_MARKER: &str = "turma pequena";
pub const LARGE_CLASS_MARKER: &str = "turma numerosa";

/// What the teacher has available besides themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceAvailability {
    /// No physical materials, board or tools.
    InstructorOnly,
    /// Explicit, non-empty list of sanitized resources.
    Listed(Vec<String>),
}

impl ResourceAvailability {
    pub fn is_instructor_only(&self) -> bool {
        matches!(self, Self::InstructorOnly)
    }

    /// Text embedded in the prompt's resources clause.
    pub fn clause(&self) -> String {
        match self {
            Self::InstructorOnly => INSTRUCTOR_ONLY_SENTENCE.to_string(),
            Self::Listed(items) => items.join(", "),
        }
    }
}

/// Declared class size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassSize {
    Small,
    Large,
    /// Neither marker present: the plan must scale to any class size.
    Unspecified,
}

/// A request ready for prompt synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    pub subject: String,
    pub grade: String,
    pub duration_minutes: u32,
    pub objectives_text: String,
    pub resources: ResourceAvailability,
    pub profile_text: String,
    pub class_size: ClassSize,
}

/// Normalize a validated request.
pub fn normalize(request: &LessonRequest) -> NormalizedRequest {
    let objectives = sanitize_list(&request.objectives);
    let objectives_text = if objectives.is_empty() {
        UNSPECIFIED_OBJECTIVES.to_string()
    } else {
        objectives.join(", ")
    };

    let profile = sanitize_list(&request.class_profile);
    let profile_text = if profile.is_empty() {
        DEFAULT_PROFILE.to_string()
    } else {
        profile.join(", ")
    };

    NormalizedRequest {
        subject: sanitize_string(&request.subject),
        grade: sanitize_string(&request.grade_level),
        duration_minutes: parse_duration(&request.duration),
        objectives_text,
        resources: resolve_resources(&request.resources),
        class_size: resolve_class_size(&profile),
        profile_text,
    }
}

/// Trim and truncate to [`MAX_FIELD_CHARS`] characters.
pub fn sanitize_string(s: &str) -> String {
    s.trim().chars().take(MAX_FIELD_CHARS).collect()
}

/// Sanitize each entry and drop the ones that end up empty.
pub fn sanitize_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| sanitize_string(s))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Coerce a submitted duration to whole minutes.
///
/// Text uses its leading integer ("50 minutos" is 50); numbers drop their
/// fractional part. Anything that does not yield a positive value that fits
/// in `u32` becomes [`DEFAULT_DURATION_MINUTES`].
pub fn parse_duration(input: &DurationInput) -> u32 {
    let parsed = match input {
        DurationInput::Text(s) => leading_integer(s.trim()),
        DurationInput::Number(n) if n.is_finite() && *n >= 1.0 && *n < 4_294_967_296.0 => {
            Some(n.trunc() as u32)
        }
        DurationInput::Number(_) => None,
    };
    parsed
        .filter(|m| *m > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

/// Parse an optional `+` followed by the longest run of ASCII digits.
/// A leading `-` yields `None`.
fn leading_integer(s: &str) -> Option<u32> {
    let digits = s.strip_prefix('+').unwrap_or(s);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Collapse resources into a canonical availability state.
///
/// An empty list and any instructor-only marker (even alongside other
/// entries) both yield [`ResourceAvailability::InstructorOnly`].
pub fn resolve_resources(raw: &[String]) -> ResourceAvailability {
    let items = sanitize_list(raw);
    let instructor_only = items.is_empty()
        || items.iter().any(|r| {
            let lower = r.to_lowercase();
            INSTRUCTOR_ONLY_MARKERS.contains(&lower.as_str())
        });
    if instructor_only {
        ResourceAvailability::InstructorOnly
    } else {
        ResourceAvailability::Listed(items)
    }
}

/// Determine the class size from sanitized profile entries.
///
/// The small-class marker is checked first, so a profile naming both sizes
/// resolves to [`ClassSize::Small`].
pub fn resolve_class_size(profile: &[String]) -> ClassSize {
    let has = |marker: &str| profile.iter().any(|p| p.to_lowercase() == marker);
    if has(SMALL_CLASS_MARKER) {
        ClassSize::Small
    } else if has(LARGE_CLASS_MARKER) {
        ClassSize::Large
    } else {
        ClassSize::Unspecified
    }
}
