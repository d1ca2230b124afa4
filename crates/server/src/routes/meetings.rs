use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::Json as ResponseJson,
    routing::{delete, get},
};
use db::models::{
    meeting::{CreateMeeting, Meeting, UpdateMeeting},
    user::User,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{require_admin, require_staff},
};

pub async fn get_meetings(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<Meeting>>, ApiError> {
    let meetings = state.meetings().all(&state.db().pool).await?;
    Ok(ResponseJson(meetings))
}

pub async fn get_my_meetings(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<Vec<Meeting>>, ApiError> {
    let meetings = state
        .meetings()
        .my_meetings(&state.db().pool, &user.email)
        .await?;
    Ok(ResponseJson(meetings))
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<Meeting>, ApiError> {
    let meeting = state.meetings().get(&state.db().pool, id).await?;
    Ok(ResponseJson(meeting))
}

pub async fn create_meeting(
    State(state): State<AppState>,
    Json(payload): Json<CreateMeeting>,
) -> Result<(StatusCode, ResponseJson<Meeting>), ApiError> {
    let meeting = state.meetings().create(&state.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(meeting)))
}

pub async fn update_meeting(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMeeting>,
) -> Result<ResponseJson<Meeting>, ApiError> {
    let meeting = state
        .meetings()
        .update(&state.db().pool, id, payload, &user.email)
        .await?;
    Ok(ResponseJson(meeting))
}

pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.meetings().delete(&state.db().pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/meetings", get(get_meetings).post(create_meeting))
        .route("/meetings/my-meetings", get(get_my_meetings))
        .route("/meetings/{id}", get(get_meeting).put(update_meeting))
        .route_layer(from_fn(require_staff));

    let admin_routes = Router::new()
        .route("/meetings/{id}", delete(delete_meeting))
        .route_layer(from_fn(require_admin));

    Router::new().merge(staff_routes).merge(admin_routes)
}
