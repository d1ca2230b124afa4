use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::from_fn,
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::{
    crm_entry::{CreateCrmEntry, CrmEntry, UpdateCrmEntry},
    user::User,
};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppState,
    error::ApiError,
    middleware::{require_admin, require_client, require_staff},
};

pub async fn get_crm_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<Value>, ApiError> {
    let entries = state.crm().all(&state.db().pool).await?;
    Ok(ResponseJson(json!({ "crmList": entries })))
}

pub async fn get_onboarded_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<CrmEntry>>, ApiError> {
    let entries = state.crm().onboarded(&state.db().pool).await?;
    Ok(ResponseJson(entries))
}

pub async fn get_completed_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<CrmEntry>>, ApiError> {
    let entries = state.crm().completed(&state.db().pool).await?;
    Ok(ResponseJson(entries))
}

pub async fn get_dropped_entries(
    State(state): State<AppState>,
) -> Result<ResponseJson<Vec<CrmEntry>>, ApiError> {
    let entries = state.crm().dropped(&state.db().pool).await?;
    Ok(ResponseJson(entries))
}

pub async fn get_my_crm_entry(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<CrmEntry>, ApiError> {
    let entry = state.crm().client_entry(&state.db().pool, &user.email).await?;
    Ok(ResponseJson(entry))
}

pub async fn get_crm_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<CrmEntry>, ApiError> {
    let entry = state.crm().get(&state.db().pool, id).await?;
    Ok(ResponseJson(entry))
}

pub async fn create_crm_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateCrmEntry>,
) -> Result<(StatusCode, ResponseJson<CrmEntry>), ApiError> {
    let entry = state.crm().create(&state.db().pool, payload).await?;
    Ok((StatusCode::CREATED, ResponseJson(entry)))
}

pub async fn update_crm_entry(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCrmEntry>,
) -> Result<ResponseJson<CrmEntry>, ApiError> {
    let entry = state
        .crm()
        .update(&state.db().pool, id, payload, &user.email)
        .await?;
    Ok(ResponseJson(entry))
}

pub async fn delete_crm_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.crm().delete(&state.db().pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/crm", get(get_crm_entries))
        .route("/crm/onboarded", get(get_onboarded_entries))
        .route("/crm/done", get(get_completed_entries))
        .route("/crm/closed", get(get_dropped_entries))
        .route("/crm/{id}", get(get_crm_entry).put(update_crm_entry))
        .route_layer(from_fn(require_staff));

    let admin_routes = Router::new()
        .route("/crm", post(create_crm_entry))
        .route("/crm/{id}", delete(delete_crm_entry))
        .route_layer(from_fn(require_admin));

    let client_routes = Router::new()
        .route("/crm/my-crm", get(get_my_crm_entry))
        .route_layer(from_fn(require_client));

    Router::new()
        .merge(staff_routes)
        .merge(admin_routes)
        .merge(client_routes)
}
