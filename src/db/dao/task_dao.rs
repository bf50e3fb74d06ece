use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Value, sea_query::Expr,
};

use super::{DaoLayerError, DaoResult};
use crate::db::entities::prelude::Task;
use crate::db::entities::task::{self, Priority};

const ENTITY: &str = "Task";

/// Equality filters shared by the page query and its count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    fn condition(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(completed) = self.completed {
            condition = condition.add(task::Column::Completed.eq(i32::from(completed)));
        }
        if let Some(priority) = self.priority {
            condition = condition.add(task::Column::Priority.eq(priority));
        }
        condition
    }
}

#[derive(Clone)]
pub struct TaskDao {
    db: DatabaseConnection,
}

impl TaskDao {
    pub fn new(db: &DatabaseConnection) -> Self {
        Self { db: db.clone() }
    }

    /// Newest first; `id` breaks ties between rows created in the same millisecond.
    pub async fn find(
        &self,
        filter: TaskFilter,
        limit: u64,
        offset: u64,
    ) -> DaoResult<Vec<task::Model>> {
        Task::find()
            .filter(filter.condition())
            .order_by_desc(task::Column::CreatedAt)
            .order_by_desc(task::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn count(&self, filter: TaskFilter) -> DaoResult<u64> {
        Task::find()
            .filter(filter.condition())
            .count(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn find_by_id(&self, id: i64) -> DaoResult<Option<task::Model>> {
        Task::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(DaoLayerError::Db)
    }

    pub async fn require(&self, id: i64) -> DaoResult<task::Model> {
        self.find_by_id(id)
            .await?
            .ok_or(DaoLayerError::NotFound { entity: ENTITY, id })
    }

    /// Inserts the row and reads it back so defaults and timestamps come from storage.
    pub async fn insert(&self, model: task::ActiveModel) -> DaoResult<task::Model> {
        let result = Task::insert(model).exec(&self.db).await?;
        self.require(result.last_insert_id).await
    }

    /// `UPDATE tasks SET <column> = ?, ... WHERE id = ?` followed by a re-read.
    ///
    /// Columns come from the caller's fixed descriptor table; only the values
    /// originate from request data and they are always bound parameters.
    pub async fn update_columns(
        &self,
        id: i64,
        assignments: Vec<(task::Column, Value)>,
    ) -> DaoResult<task::Model> {
        if assignments.is_empty() {
            return self.require(id).await;
        }

        let mut update = Task::update_many().filter(task::Column::Id.eq(id));
        for (column, value) in assignments {
            update = update.col_expr(column, Expr::value(value));
        }

        let result = update.exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound { entity: ENTITY, id });
        }
        self.require(id).await
    }

    pub async fn delete(&self, id: i64) -> DaoResult<()> {
        let result = Task::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DaoLayerError::NotFound { entity: ENTITY, id });
        }
        Ok(())
    }
}
