//! Turns raw generator text into a validated [`CourseOutline`].
//!
//! Models wrap their JSON in markdown fences, sprinkle control characters
//! and leave raw newlines inside strings. The steps below repair exactly
//! those cases and nothing else:
//!
//! 1. [`strip_fences`] unwraps one of the [`FENCE_OPENERS`].
//! 2. [`strip_control_chars`] drops characters strict JSON rejects.
//! 3. [`escape_raw_whitespace`] escapes literal tabs/newlines inside strings.
//! 4. [`validate`] checks the module/subtopic shape.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fence openers we recognise, most specific first.
pub const FENCE_OPENERS: [&str; 3] = ["```json", "```JSON", "```"];

static FENCED_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:json|JSON)?\s*(\{.*\})\s*```").expect("fence pattern is valid")
});

pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("Failed to parse JSON from model response: {0}")]
    Json(String),
    #[error("Response missing 'modules' key")]
    MissingModules,
    #[error("Module {index} missing required field '{field}'")]
    ModuleMissingField { index: usize, field: &'static str },
    #[error("Subtopic {index} of module {module} missing required field '{field}'")]
    SubtopicMissingField {
        module: usize,
        index: usize,
        field: &'static str,
    },
    #[error("Unexpected response shape: {0}")]
    InvalidShape(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtopicOutline {
    pub title: String,
    pub video_url: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutline {
    pub title: String,
    pub subtopics: Vec<SubtopicOutline>,
}

/// Validated generator output, before video references are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseOutline {
    pub modules: Vec<ModuleOutline>,
}

pub fn normalize_response(text: &str) -> NormalizeResult<CourseOutline> {
    let unfenced = strip_fences(text);
    let cleaned = strip_control_chars(&unfenced);
    let escaped = escape_raw_whitespace(&cleaned);

    let value: Value =
        serde_json::from_str(&escaped).map_err(|e| NormalizeError::Json(e.to_string()))?;
    validate(&value)
}

/// Removes a surrounding markdown fence.
///
/// When the whole reply is one fenced object the object is extracted.
/// Otherwise a leading fence line and a trailing fence line are dropped if
/// present. Unfenced text is only trimmed.
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !FENCE_OPENERS.iter().any(|f| trimmed.starts_with(f)) {
        return trimmed.to_string();
    }

    if let Some(caps) = FENCED_OBJECT.captures(trimmed) {
        return caps[1].to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.first().is_some_and(|l| l.starts_with("```")) {
        lines.remove(0);
    }
    if lines.last().is_some_and(|l| l.trim_start().starts_with("```")) {
        lines.pop();
    }
    lines.join("\n")
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\r' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

/// Drops carriage returns and control characters except tab and newline.
pub fn strip_control_chars(text: &str) -> String {
    text.chars().filter(|c| !is_stripped_control(*c)).collect()
}

/// Escapes literal tab and newline characters that sit inside JSON strings,
/// leaving structural whitespace alone.
pub fn escape_raw_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            match c {
                _ if escaped => {
                    escaped = false;
                    out.push(c);
                }
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
        } else {
            if c == '"' {
                in_string = true;
            }
            out.push(c);
        }
    }

    out
}

fn required_str(obj: &Map<String, Value>, field: &'static str) -> Option<NormalizeResult<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(Ok(s.clone())),
        Some(other) => Some(Err(NormalizeError::InvalidShape(format!(
            "'{field}' must be a string, got {other}"
        )))),
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> NormalizeResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| NormalizeError::InvalidShape(format!("{what} must be an object")))
}

fn as_array<'a>(value: &'a Value, what: &str) -> NormalizeResult<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| NormalizeError::InvalidShape(format!("{what} must be an array")))
}

/// Checks the parsed reply against the module/subtopic schema.
pub fn validate(value: &Value) -> NormalizeResult<CourseOutline> {
    let root = as_object(value, "response")?;
    let modules = match root.get("modules") {
        None | Some(Value::Null) => return Err(NormalizeError::MissingModules),
        Some(v) => as_array(v, "'modules'")?,
    };

    let mut outline = Vec::with_capacity(modules.len());
    for (index, module) in modules.iter().enumerate() {
        let module = as_object(module, "module")?;

        let title = required_str(module, "title")
            .ok_or(NormalizeError::ModuleMissingField { index, field: "title" })??;
        let subtopics = match module.get("subtopics") {
            None | Some(Value::Null) => {
                return Err(NormalizeError::ModuleMissingField {
                    index,
                    field: "subtopics",
                });
            }
            Some(v) => as_array(v, "'subtopics'")?,
        };

        let mut subs = Vec::with_capacity(subtopics.len());
        for (sub_index, subtopic) in subtopics.iter().enumerate() {
            let subtopic = as_object(subtopic, "subtopic")?;
            let field = |name: &'static str| {
                required_str(subtopic, name).unwrap_or(Err(NormalizeError::SubtopicMissingField {
                    module: index,
                    index: sub_index,
                    field: name,
                }))
            };

            subs.push(SubtopicOutline {
                title: field("title")?,
                video_url: field("video_url")?,
                content: field("content")?,
            });
        }

        outline.push(ModuleOutline {
            title,
            subtopics: subs,
        });
    }

    Ok(CourseOutline { modules: outline })
}
