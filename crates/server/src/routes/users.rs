use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::user::User;
use services::services::users::UpdateUserRoleRequest;
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{require_admin, require_staff, require_super_admin},
};

pub async fn get_users(State(state): State<AppState>) -> Result<ResponseJson<Vec<User>>, ApiError> {
    let users = state.users().all(&state.db().pool).await?;
    Ok(ResponseJson(users))
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<User>, ApiError> {
    let user = state.users().me(&state.db().pool, &user.email).await?;
    Ok(ResponseJson(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<User>, ApiError> {
    let user = state.users().get(&state.db().pool, id).await?;
    Ok(ResponseJson(user))
}

pub async fn update_user_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> Result<ResponseJson<User>, ApiError> {
    let user = state.users().update_role(&state.db().pool, id, payload).await?;
    Ok(ResponseJson(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.users().delete(&state.db().pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/users", get(get_users))
        .route("/users/me", get(get_me))
        .route_layer(from_fn(require_staff));

    let admin_routes = Router::new()
        .route("/users/{id}", get(get_user))
        .route_layer(from_fn(require_admin));

    let super_admin_routes = Router::new()
        .route("/users/{id}", put(update_user_role).delete(delete_user))
        .route_layer(from_fn(require_super_admin));

    Router::new()
        .merge(staff_routes)
        .merge(admin_routes)
        .merge(super_admin_routes)
}
