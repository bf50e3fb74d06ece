use std::{collections::HashMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    db::entities::task::{self, Priority},
    error::AppError,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, TaskService},
    state::AppState,
    validation::{CreateTask, ListTasksQuery, ReplaceTask, TaskId, TaskPatch},
};

/// Wire shape of a task. `completed` is reported as `0` / `1`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: u8,
    pub priority: Priority,
    pub created_at: String,
    pub updated_at: String,
}

impl From<task::Model> for TaskResponse {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            completed: u8::from(model.completed),
            priority: model.priority,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task)
                .put(replace_task)
                .patch(update_task)
                .delete(delete_task),
        )
        .with_state(state)
}

fn service(state: &AppState) -> TaskService {
    ServiceContext::from_state(state).task()
}

fn task_id(path: Result<Path<String>, PathRejection>) -> Result<TaskId, AppError> {
    let Path(raw) = path?;
    Ok(TaskId::from_param(&raw)?)
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
) -> ApiResult<Vec<TaskResponse>> {
    let Query(params) = query?;
    let query = ListTasksQuery::from_params(&params)?;
    let page = service(&state).list(query).await?;

    let tasks: Vec<TaskResponse> = page.tasks.into_iter().map(TaskResponse::from).collect();
    JsonApiResponse::paginated(tasks, page.pagination)
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<TaskResponse> {
    let id = task_id(path)?;
    let task = service(&state).get(id).await?;
    JsonApiResponse::ok(task.into())
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskResponse> {
    let Json(body) = payload?;
    let input = CreateTask::from_body(&body)?;
    let task = service(&state).create(input).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "Task created successfully", task.into())
}

async fn replace_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskResponse> {
    let id = task_id(path)?;
    let Json(body) = payload?;
    let input = ReplaceTask::from_body(&body)?;
    let task = service(&state).replace(id, input).await?;
    JsonApiResponse::with_status(StatusCode::OK, "Task updated successfully", task.into())
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<TaskResponse> {
    let id = task_id(path)?;
    let Json(body) = payload?;
    let patch = TaskPatch::from_body(&body)?;
    let task = service(&state).patch(id, patch).await?;
    JsonApiResponse::with_status(StatusCode::OK, "Task updated successfully", task.into())
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = task_id(path)?;
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
