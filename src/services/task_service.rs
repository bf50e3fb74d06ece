use sea_orm::{Set, Value};
use tracing::{debug, info};

use crate::{
    db::dao::{TaskDao, TaskFilter},
    db::entities::task,
    error::AppError,
    response::Pagination,
    validation::{CreateTask, ListTasksQuery, ReplaceTask, TaskId, TaskPatch},
};

pub const DEFAULT_LIST_LIMIT: u64 = 50;
pub const DEFAULT_LIST_OFFSET: u64 = 0;

/// One mutable column: the name it is known by, where it is stored, and how
/// its value is taken out of a patch (with any storage coercion applied).
struct MutableField {
    name: &'static str,
    column: task::Column,
    value: fn(&TaskPatch) -> Option<Value>,
}

/// The only columns an update may touch. Request data never names a column
/// directly; it can only supply values for entries in this table.
const MUTABLE_FIELDS: [MutableField; 4] = [
    MutableField {
        name: "title",
        column: task::Column::Title,
        value: |patch| patch.title.clone().map(Value::from),
    },
    MutableField {
        name: "description",
        column: task::Column::Description,
        value: |patch| patch.description.clone().map(Value::from),
    },
    MutableField {
        name: "completed",
        column: task::Column::Completed,
        value: |patch| patch.completed.map(|done| Value::from(i32::from(done))),
    },
    MutableField {
        name: "priority",
        column: task::Column::Priority,
        value: |patch| patch.priority.map(Value::from),
    },
];

/// Column assignments for the fields present in `patch`, in table order.
fn assignments(patch: &TaskPatch) -> Vec<(&'static str, task::Column, Value)> {
    MUTABLE_FIELDS
        .iter()
        .filter_map(|field| (field.value)(patch).map(|value| (field.name, field.column, value)))
        .collect()
}

#[derive(Debug)]
pub struct TaskPage {
    pub tasks: Vec<task::Model>,
    pub pagination: Pagination,
}

#[derive(Clone)]
pub struct TaskService {
    task_dao: TaskDao,
}

impl TaskService {
    pub fn new(task_dao: TaskDao) -> Self {
        Self { task_dao }
    }

    pub async fn list(&self, query: ListTasksQuery) -> Result<TaskPage, AppError> {
        let filter = TaskFilter {
            completed: query.completed,
            priority: query.priority,
        };
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let offset = query.offset.unwrap_or(DEFAULT_LIST_OFFSET);

        let tasks = self.task_dao.find(filter, limit, offset).await?;
        let total = self.task_dao.count(filter).await?;
        debug!(?filter, limit, offset, total, returned = tasks.len(), "listed tasks");

        let pagination = Pagination::new(total, limit, offset, tasks.len());
        Ok(TaskPage { tasks, pagination })
    }

    pub async fn get(&self, id: TaskId) -> Result<task::Model, AppError> {
        Ok(self.task_dao.require(id.0).await?)
    }

    pub async fn create(&self, input: CreateTask) -> Result<task::Model, AppError> {
        let model = task::ActiveModel {
            title: Set(input.title),
            description: Set(input.description),
            completed: Set(false),
            priority: Set(input.priority),
            ..Default::default()
        };

        let created = self.task_dao.insert(model).await?;
        info!(task_id = created.id, "task created");
        Ok(created)
    }

    /// Rewrites all four mutable fields, whether or not they changed.
    pub async fn replace(&self, id: TaskId, input: ReplaceTask) -> Result<task::Model, AppError> {
        self.task_dao.require(id.0).await?;
        let patch = TaskPatch::from(input);
        self.write(id, &patch).await
    }

    pub async fn patch(&self, id: TaskId, patch: TaskPatch) -> Result<task::Model, AppError> {
        self.task_dao.require(id.0).await?;
        if assignments(&patch).is_empty() {
            return Err(AppError::bad_request("No valid fields to update"));
        }
        self.write(id, &patch).await
    }

    pub async fn delete(&self, id: TaskId) -> Result<(), AppError> {
        self.task_dao.require(id.0).await?;
        self.task_dao.delete(id.0).await?;
        info!(task_id = id.0, "task deleted");
        Ok(())
    }

    async fn write(&self, id: TaskId, patch: &TaskPatch) -> Result<task::Model, AppError> {
        let assignments = assignments(patch);
        let fields: Vec<&str> = assignments.iter().map(|(name, _, _)| *name).collect();
        let columns = assignments
            .into_iter()
            .map(|(_, column, value)| (column, value))
            .collect();

        let updated = self.task_dao.update_columns(id.0, columns).await?;
        info!(task_id = id.0, ?fields, "task updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::IdenStatic;

    use super::*;
    use crate::db::entities::task::Priority;

    fn names(patch: &TaskPatch) -> Vec<&'static str> {
        assignments(patch).into_iter().map(|(name, _, _)| name).collect()
    }

    #[test]
    fn empty_patch_has_no_assignments() {
        assert!(assignments(&TaskPatch::default()).is_empty());
    }

    #[test]
    fn only_present_fields_are_assigned() {
        let patch = TaskPatch {
            completed: Some(true),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        };

        assert_eq!(names(&patch), vec!["completed", "priority"]);
    }

    #[test]
    fn completed_is_stored_as_integer() {
        let patch = TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        };
        let (_, column, value) = assignments(&patch).remove(0);

        assert_eq!(column.as_str(), "completed");
        assert_eq!(value, Value::from(1_i32));
    }

    #[test]
    fn explicit_null_description_is_assigned() {
        let patch = TaskPatch {
            description: Some(None),
            ..TaskPatch::default()
        };
        let (_, column, value) = assignments(&patch).remove(0);

        assert_eq!(column.as_str(), "description");
        assert_eq!(value, Value::from(Option::<String>::None));
    }

    #[test]
    fn replace_assigns_every_mutable_field() {
        let patch = TaskPatch::from(ReplaceTask {
            title: "t".to_string(),
            description: None,
            completed: false,
            priority: Priority::Low,
        });

        assert_eq!(
            names(&patch),
            vec!["title", "description", "completed", "priority"]
        );
    }
}
