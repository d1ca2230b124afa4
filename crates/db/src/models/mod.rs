use sea_orm::{DbErr, JsonValue};
use serde::Serialize;

pub mod crm_entry;
pub mod ids;
pub mod meeting;
pub mod password_otp;
pub mod task;
pub mod task_assignee;
pub mod user;

/// Stored JSON array -> list of strings; anything unparseable reads as empty.
pub(crate) fn string_list(value: Option<JsonValue>) -> Vec<String> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

pub(crate) fn string_map(
    value: Option<JsonValue>,
) -> std::collections::BTreeMap<String, String> {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, DbErr> {
    serde_json::to_value(value).map_err(|err| DbErr::Custom(err.to_string()))
}
