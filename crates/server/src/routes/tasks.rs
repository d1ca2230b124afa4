use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    task::{CreateTask, Task, UpdateTask},
    user::User,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{require_admin, require_client, require_staff},
};

pub async fn get_tasks(State(state): State<AppState>) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = state.tasks().all(&state.db().pool).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_active_tasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = state.tasks().active(&state.db().pool).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_completed_tasks(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = state.tasks().completed(&state.db().pool).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_my_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = state.tasks().my_tasks(&state.db().pool, &user.email).await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_client_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Vec<Task>>, ApiError> {
    let tasks = state
        .tasks()
        .client_tasks(&state.db().pool, &user.email)
        .await?;
    Ok(ResponseJson(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Task>, ApiError> {
    let task = state.tasks().get(&state.db().pool, id).await?;
    Ok(ResponseJson(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(payload): Json<CreateTask>,
) -> Result<(StatusCode, ResponseJson<Task>), ApiError> {
    let task = state
        .tasks()
        .create(&state.db().pool, state.mailer(), &user.email, payload)
        .await?;
    Ok((StatusCode::CREATED, ResponseJson(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTask>,
) -> Result<ResponseJson<Task>, ApiError> {
    let task = state
        .tasks()
        .update(&state.db().pool, state.mailer(), &user.email, id, payload)
        .await?;
    Ok(ResponseJson(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.tasks().delete(&state.db().pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/tasks", get(get_tasks).post(create_task))
        .route("/tasks/active", get(get_active_tasks))
        .route("/tasks/completed", get(get_completed_tasks))
        .route("/tasks/my-tasks", get(get_my_tasks))
        .route("/tasks/{id}", get(get_task).put(update_task))
        .route_layer(from_fn(require_staff));

    let admin_routes = Router::new()
        .route("/tasks/{id}", delete(delete_task))
        .route_layer(from_fn(require_admin));

    let client_routes = Router::new()
        .route("/tasks/client-tasks", get(get_client_tasks))
        .route_layer(from_fn(require_client));

    Router::new()
        .merge(staff_routes)
        .merge(admin_routes)
        .merge(client_routes)
}
