use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::OperatorIdentity;
use crate::domain::Role;
use crate::entities::task;
use crate::errors::ServiceError;
use crate::services::tasks::ActiveTask;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub name: String,
    pub allowed_roles: Vec<Role>,
    #[serde(default)]
    pub is_timed: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartTaskRequest {
    pub task_name: String,
}

/// The operator's current mode; `active` is null between tasks.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveTaskResponse {
    pub active: Option<ActiveTask>,
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks",
    responses(
        (status = 200, description = "All tasks", body = [task::Model])
    ),
    tag = "tasks"
)]
pub async fn list_tasks(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let tasks = state.services.tasks.list().await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created", body = task::Model),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn create_task(
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let task = state
        .services
        .tasks
        .create(&payload.name, &payload.allowed_roles, payload.is_timed)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Switch the caller into a task. Any task they still have open is closed
/// first.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/start",
    request_body = StartTaskRequest,
    responses(
        (status = 200, description = "Task started", body = ActiveTask),
        (status = 403, description = "Role not allowed for this task", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown task", body = crate::errors::ErrorResponse)
    ),
    tag = "tasks"
)]
pub async fn start_task(
    State(state): State<AppState>,
    identity: OperatorIdentity,
    Json(payload): Json<StartTaskRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let active = state
        .services
        .tasks
        .start(&payload.task_name, &identity.email, identity.role)
        .await?;
    Ok(Json(active))
}

/// End the caller's current task, if any.
#[utoipa::path(
    post,
    path = "/api/v1/tasks/finish",
    responses(
        (status = 200, description = "Closed task, or null", body = ActiveTaskResponse)
    ),
    tag = "tasks"
)]
pub async fn finish_task(
    State(state): State<AppState>,
    identity: OperatorIdentity,
) -> Result<impl IntoResponse, ServiceError> {
    let active = state.services.tasks.finish(&identity.email).await?;
    Ok(Json(ActiveTaskResponse { active }))
}

/// The caller's current mode, for resuming a timed task after a reload.
#[utoipa::path(
    get,
    path = "/api/v1/tasks/active",
    responses(
        (status = 200, description = "Current mode, or null", body = ActiveTaskResponse)
    ),
    tag = "tasks"
)]
pub async fn active_task(
    State(state): State<AppState>,
    identity: OperatorIdentity,
) -> Result<impl IntoResponse, ServiceError> {
    let active = state.services.tasks.active(&identity.email).await?;
    Ok(Json(ActiveTaskResponse { active }))
}
