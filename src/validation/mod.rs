//! Declarative input schemas.
//!
//! A [`Schema`] lists every accepted field with its [`Rule`]. Checking an input
//! reports all problems at once as [`FieldError`]s; on success the coerced
//! values come back as [`CheckedFields`] for the typed constructors in
//! [`task`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod task;

pub use task::{CreateTask, ListTasksQuery, ReplaceTask, TaskId, TaskPatch};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("validation failed for {} field(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.field.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// String, trimmed before the length check (counted in characters).
    Text { min: usize, max: usize },
    /// JSON `true` / `false`.
    Boolean,
    /// String equal to one of the listed literals.
    OneOf(&'static [&'static str]),
    /// Integer given as a JSON number or as base-10 digits in a string.
    Integer { min: i64, max: Option<i64> },
}

impl Rule {
    fn check(&self, name: &str, value: &Value) -> Result<Checked, String> {
        match *self {
            Rule::Text { min, max } => {
                let Value::String(raw) = value else {
                    return Err(format!("\"{name}\" must be a string"));
                };
                let trimmed = raw.trim();
                let len = trimmed.chars().count();
                if len < min {
                    return Err(if min == 1 {
                        format!("\"{name}\" is not allowed to be empty")
                    } else {
                        format!("\"{name}\" must be at least {min} characters")
                    });
                }
                if len > max {
                    return Err(format!("\"{name}\" must be at most {max} characters"));
                }
                Ok(Checked::Text(trimmed.to_string()))
            }
            Rule::Boolean => match value {
                Value::Bool(flag) => Ok(Checked::Bool(*flag)),
                _ => Err(format!("\"{name}\" must be a boolean")),
            },
            Rule::OneOf(options) => value
                .as_str()
                .and_then(|raw| options.iter().find(|option| **option == raw))
                .copied()
                .map(Checked::Choice)
                .ok_or_else(|| format!("\"{name}\" must be one of [{}]", options.join(", "))),
            Rule::Integer { min, max } => {
                let parsed = match value {
                    Value::Number(number) => number.as_i64(),
                    Value::String(raw) => parse_integer(raw),
                    _ => None,
                };
                let Some(parsed) = parsed else {
                    return Err(format!("\"{name}\" must be an integer"));
                };
                if parsed < min {
                    return Err(format!("\"{name}\" must be greater than or equal to {min}"));
                }
                if let Some(max) = max {
                    if parsed > max {
                        return Err(format!("\"{name}\" must be less than or equal to {max}"));
                    }
                }
                Ok(Checked::Integer(parsed))
            }
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub rule: Rule,
    pub required: bool,
    pub nullable: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: true,
            nullable: false,
        }
    }

    pub const fn optional(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            required: false,
            nullable: false,
        }
    }

    /// Accepts an explicit JSON `null`.
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }
}

/// The accepted field set of one input shape. Anything not listed is rejected.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(fields: &'static [FieldSpec]) -> Self {
        Self { fields }
    }

    pub fn check_body(&self, body: &Value) -> Result<CheckedFields, ValidationErrors> {
        match body {
            Value::Object(object) => self.check(object),
            other => Err(ValidationErrors(vec![FieldError::new(
                "body",
                "request body must be a JSON object",
                Some(other.clone()),
            )])),
        }
    }

    /// Query strings and path segments: every value arrives as text. Keys are
    /// checked in sorted order so reported details are stable.
    pub fn check_params(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<CheckedFields, ValidationErrors> {
        let sorted: BTreeMap<&String, &String> = params.iter().collect();
        let object: Map<String, Value> = sorted
            .into_iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();
        self.check(&object)
    }

    pub fn check(&self, input: &Map<String, Value>) -> Result<CheckedFields, ValidationErrors> {
        let mut errors = Vec::new();
        let mut checked = CheckedFields::default();

        for spec in self.fields {
            match input.get(spec.name) {
                None if spec.required => errors.push(FieldError::new(
                    spec.name,
                    format!("\"{}\" is required", spec.name),
                    None,
                )),
                None => {}
                Some(Value::Null) if spec.nullable => {
                    checked.0.insert(spec.name, Checked::Null);
                }
                Some(value) => match spec.rule.check(spec.name, value) {
                    Ok(value) => {
                        checked.0.insert(spec.name, value);
                    }
                    Err(message) => {
                        errors.push(FieldError::new(spec.name, message, Some(value.clone())))
                    }
                },
            }
        }

        for (key, value) in input {
            if !self.fields.iter().any(|spec| spec.name == key.as_str()) {
                errors.push(FieldError::new(
                    key.as_str(),
                    format!("\"{key}\" is not allowed"),
                    Some(value.clone()),
                ));
            }
        }

        if errors.is_empty() {
            Ok(checked)
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Checked {
    Null,
    Text(String),
    Bool(bool),
    Choice(&'static str),
    Integer(i64),
}

/// Coerced values keyed by field name; absent fields were not supplied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckedFields(BTreeMap<&'static str, Checked>);

impl CheckedFields {
    /// Value of a field the schema marks as required. A missing value is
    /// reported like any other missing field rather than defaulted.
    pub fn required<T>(
        &self,
        name: &str,
        read: impl FnOnce(&Self, &str) -> Option<T>,
    ) -> Result<T, ValidationErrors> {
        read(self, name).ok_or_else(|| {
            ValidationErrors(vec![FieldError::new(
                name,
                format!("\"{name}\" is required"),
                None,
            )])
        })
    }

    pub fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name) {
            Some(Checked::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    /// `Some(None)` when the field was an explicit `null`.
    pub fn nullable_text(&self, name: &str) -> Option<Option<String>> {
        match self.0.get(name) {
            Some(Checked::Null) => Some(None),
            Some(Checked::Text(text)) => Some(Some(text.clone())),
            _ => None,
        }
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(Checked::Bool(flag)) => Some(*flag),
            _ => None,
        }
    }

    pub fn choice(&self, name: &str) -> Option<&'static str> {
        match self.0.get(name) {
            Some(Checked::Choice(choice)) => Some(choice),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.0.get(name) {
            Some(Checked::Integer(value)) => Some(*value),
            _ => None,
        }
    }
}
