use std::collections::HashMap;

use serde_json::Value;

use super::{CheckedFields, FieldSpec, Rule, Schema, ValidationErrors};
use crate::db::entities::task::Priority;

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const LIST_LIMIT_MAX: i64 = 100;

const TITLE: Rule = Rule::Text {
    min: 1,
    max: TITLE_MAX_CHARS,
};
const DESCRIPTION: Rule = Rule::Text {
    min: 0,
    max: DESCRIPTION_MAX_CHARS,
};
const PRIORITY: Rule = Rule::OneOf(&Priority::NAMES);

pub static CREATE_TASK: Schema = Schema::new(&[
    FieldSpec::required("title", TITLE),
    FieldSpec::optional("description", DESCRIPTION).nullable(),
    FieldSpec::optional("priority", PRIORITY),
]);

pub static REPLACE_TASK: Schema = Schema::new(&[
    FieldSpec::required("title", TITLE),
    FieldSpec::required("description", DESCRIPTION).nullable(),
    FieldSpec::required("completed", Rule::Boolean),
    FieldSpec::required("priority", PRIORITY),
]);

pub static PATCH_TASK: Schema = Schema::new(&[
    FieldSpec::optional("title", TITLE),
    FieldSpec::optional("description", DESCRIPTION).nullable(),
    FieldSpec::optional("completed", Rule::Boolean),
    FieldSpec::optional("priority", PRIORITY),
]);

pub static TASK_ID: Schema = Schema::new(&[FieldSpec::required(
    "id",
    Rule::Integer { min: 1, max: None },
)]);

pub static LIST_TASKS: Schema = Schema::new(&[
    FieldSpec::optional("completed", Rule::OneOf(&["true", "false"])),
    FieldSpec::optional("priority", PRIORITY),
    FieldSpec::optional(
        "limit",
        Rule::Integer {
            min: 1,
            max: Some(LIST_LIMIT_MAX),
        },
    ),
    FieldSpec::optional("offset", Rule::Integer { min: 0, max: None }),
]);

fn priority(fields: &CheckedFields, name: &str) -> Option<Priority> {
    fields.choice(name).and_then(Priority::from_name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
}

impl CreateTask {
    pub fn from_body(body: &Value) -> Result<Self, ValidationErrors> {
        let fields = CREATE_TASK.check_body(body)?;
        Ok(Self {
            title: fields.required("title", CheckedFields::text)?,
            description: fields.nullable_text("description").flatten(),
            priority: priority(&fields, "priority").unwrap_or_default(),
        })
    }
}

/// Body of a full update: every mutable field, `description` possibly null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub priority: Priority,
}

impl ReplaceTask {
    pub fn from_body(body: &Value) -> Result<Self, ValidationErrors> {
        let fields = REPLACE_TASK.check_body(body)?;
        Ok(Self {
            title: fields.required("title", CheckedFields::text)?,
            description: fields.required("description", CheckedFields::nullable_text)?,
            completed: fields.required("completed", CheckedFields::boolean)?,
            priority: fields.required("priority", priority)?,
        })
    }
}

/// Body of a partial update. `None` means "not supplied";
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskPatch {
    pub fn from_body(body: &Value) -> Result<Self, ValidationErrors> {
        let fields = PATCH_TASK.check_body(body)?;
        Ok(Self {
            title: fields.text("title"),
            description: fields.nullable_text("description"),
            completed: fields.boolean("completed"),
            priority: priority(&fields, "priority"),
        })
    }
}

impl From<ReplaceTask> for TaskPatch {
    fn from(replace: ReplaceTask) -> Self {
        Self {
            title: Some(replace.title),
            description: Some(replace.description),
            completed: Some(replace.completed),
            priority: Some(replace.priority),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub i64);

impl TaskId {
    pub fn from_param(raw: &str) -> Result<Self, ValidationErrors> {
        let params = HashMap::from([("id".to_string(), raw.to_string())]);
        let fields = TASK_ID.check_params(&params)?;
        Ok(Self(fields.required("id", CheckedFields::integer)?))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated list filters. Paging defaults are applied by the list operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListTasksQuery {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl ListTasksQuery {
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let fields = LIST_TASKS.check_params(params)?;
        Ok(Self {
            completed: fields.choice("completed").map(|flag| flag == "true"),
            priority: priority(&fields, "priority"),
            limit: fields.integer("limit").and_then(|v| u64::try_from(v).ok()),
            offset: fields.integer("offset").and_then(|v| u64::try_from(v).ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn create_applies_defaults() {
        let task = CreateTask::from_body(&json!({ "title": "  Buy milk " })).expect("valid");

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.description, None);
        assert_eq!(task.priority, Priority::Medium);
    }

    #[test]
    fn title_length_boundary_is_200_characters() {
        let ok = "a".repeat(200);
        assert!(CreateTask::from_body(&json!({ "title": ok })).is_ok());

        let too_long = "a".repeat(201);
        let errors = CreateTask::from_body(&json!({ "title": too_long })).expect_err("201 chars");
        assert_eq!(errors.0[0].field, "title");
        assert_eq!(errors.0[0].message, "\"title\" must be at most 200 characters");
    }

    #[test]
    fn title_length_counts_characters_not_bytes() {
        let accented = "é".repeat(200);
        assert!(CreateTask::from_body(&json!({ "title": accented })).is_ok());
    }

    #[test]
    fn create_rejects_unknown_priority_and_fields() {
        let errors = CreateTask::from_body(&json!({
            "title": "x",
            "priority": "urgent",
            "completed": true,
        }))
        .expect_err("invalid");

        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["priority", "completed"]);
        assert_eq!(
            errors.0[0].message,
            "\"priority\" must be one of [low, medium, high]"
        );
    }

    #[test]
    fn description_limit_and_null() {
        let long = "d".repeat(1001);
        assert!(CreateTask::from_body(&json!({ "title": "x", "description": long })).is_err());

        let task =
            CreateTask::from_body(&json!({ "title": "x", "description": null })).expect("null ok");
        assert_eq!(task.description, None);
    }

    #[test]
    fn replace_requires_every_field() {
        let errors = ReplaceTask::from_body(&json!({ "title": "x" })).expect_err("partial");
        let fields: Vec<&str> = errors.fields().collect();
        assert_eq!(fields, vec!["description", "completed", "priority"]);

        let replace = ReplaceTask::from_body(&json!({
            "title": "x",
            "description": null,
            "completed": true,
            "priority": "high",
        }))
        .expect("complete body");
        assert_eq!(replace.description, None);
        assert!(replace.completed);
        assert_eq!(replace.priority, Priority::High);
    }

    #[test]
    fn patch_distinguishes_absent_from_null() {
        let empty = TaskPatch::from_body(&json!({})).expect("empty patch is valid here");
        assert_eq!(empty, TaskPatch::default());

        let cleared = TaskPatch::from_body(&json!({ "description": null })).expect("valid");
        assert_eq!(cleared.description, Some(None));
        assert_eq!(cleared.title, None);
    }

    #[test]
    fn patch_rejects_wrong_types() {
        let errors = TaskPatch::from_body(&json!({ "completed": "yes", "title": "" }))
            .expect_err("invalid");
        let messages: Vec<&str> = errors.0.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "\"title\" is not allowed to be empty",
                "\"completed\" must be a boolean"
            ]
        );
    }

    #[test]
    fn id_must_be_positive_integer() {
        assert_eq!(TaskId::from_param("42").expect("valid"), TaskId(42));
        for raw in ["0", "-1", "abc", "1.5", ""] {
            assert!(TaskId::from_param(raw).is_err(), "{raw}");
        }
    }

    #[test]
    fn list_query_parses_filters_and_bounds() {
        let query = ListTasksQuery::from_params(&params(&[
            ("completed", "false"),
            ("priority", "low"),
            ("limit", "100"),
            ("offset", "0"),
        ]))
        .expect("valid");
        assert_eq!(query.completed, Some(false));
        assert_eq!(query.priority, Some(Priority::Low));
        assert_eq!(query.limit, Some(100));
        assert_eq!(query.offset, Some(0));

        for bad in [
            ("limit", "0"),
            ("limit", "101"),
            ("offset", "-1"),
            ("completed", "1"),
            ("priority", "invalid"),
            ("page", "2"),
        ] {
            assert!(ListTasksQuery::from_params(&params(&[bad])).is_err(), "{bad:?}");
        }
    }
}
