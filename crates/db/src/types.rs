use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Account role. Stored and serialized as the bare upper-case name; the
/// legacy `ROLE_`-prefixed spelling is accepted on input via [`Role::parse`].
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[default]
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
    #[sea_orm(string_value = "CLIENT")]
    Client,
}

impl Role {
    /// Parse a role name, accepting bare ("admin") and prefixed
    /// ("ROLE_ADMIN") spellings case-insensitively.
    pub fn parse(input: &str) -> Option<Role> {
        let normalized = input.trim().to_uppercase().replace('-', "_");
        let name = normalized.strip_prefix("ROLE_").unwrap_or(&normalized);
        name.parse().ok()
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Employee | Role::SuperAdmin)
    }
}

/// Task statuses counted as finished. Reaching one of these from outside the
/// set is the only transition that bumps assignee completion counters.
pub const TERMINAL_TASK_STATUSES: [&str; 3] = ["completed", "done", "posted"];

pub fn is_terminal_task_status(status: Option<&str>) -> bool {
    match status {
        Some(s) => {
            let s = s.trim().to_lowercase();
            TERMINAL_TASK_STATUSES.contains(&s.as_str())
        }
        None => false,
    }
}

/// CRM status buckets, matched case-insensitively at query time. Status
/// strings are free text and remain the single source of truth.
pub const CRM_ONBOARDED_STATUSES: [&str; 3] = ["onboarded", "on progress", "quote sent"];
pub const CRM_COMPLETED_STATUSES: [&str; 1] = ["completed"];
pub const CRM_DROPPED_STATUSES: [&str; 1] = ["drop"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_accepts_bare_and_prefixed_names() {
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("ROLE_ADMIN"), Some(Role::Admin));
        assert_eq!(Role::parse(" Super_Admin "), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("ROLE_SUPER_ADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("client"), Some(Role::Client));
        assert_eq!(Role::parse("manager"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn staff_excludes_client() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Employee.is_staff());
        assert!(Role::SuperAdmin.is_staff());
        assert!(!Role::Client.is_staff());
    }

    #[test]
    fn terminal_bucket_matches_all_three_synonyms() {
        assert!(is_terminal_task_status(Some("completed")));
        assert!(is_terminal_task_status(Some("Done")));
        assert!(is_terminal_task_status(Some("POSTED")));
        assert!(is_terminal_task_status(Some(" completed ")));
        assert!(!is_terminal_task_status(Some("in progress")));
        assert!(!is_terminal_task_status(None));
    }
}
