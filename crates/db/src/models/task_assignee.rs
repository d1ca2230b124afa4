use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::task_assignee;
use crate::models::user::User;

/// Sentinel the clients send to mean "no assignee".
const UNASSIGNED: &str = "unassigned";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAssignee {
    pub email: String,
    pub name: String,
    pub assigned_at: DateTime<Utc>,
}

/// Result of reconciling the stored assignee set against a requested one.
/// `added` and `removed` are the deltas, `current` is the full set after
/// the sync in request order.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub current: Vec<String>,
}

/// Canonical form of a requested assignee list: trimmed, lowercased,
/// deduplicated, with blanks and the `unassigned` sentinel dropped.
pub fn normalize_emails(raw: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for email in raw {
        let email = email.trim().to_lowercase();
        if email.is_empty() || email == UNASSIGNED {
            continue;
        }
        if seen.insert(email.clone()) {
            out.push(email);
        }
    }
    out
}

impl TaskAssignee {
    fn from_model(model: task_assignee::Model) -> Self {
        Self {
            email: model.assignee_email,
            name: model.assignee_name,
            assigned_at: model.assigned_at,
        }
    }

    pub async fn find_by_task_row_id<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        let models = task_assignee::Entity::find()
            .filter(task_assignee::Column::TaskId.eq(task_row_id))
            .order_by_asc(task_assignee::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    /// Replace the assignee set of a task with `emails` (already raw; the
    /// list is normalized here). Rows for assignees present in both the old
    /// and new set are left untouched so their `assigned_at` survives.
    ///
    /// New assignees get their display name from the user registry; unknown
    /// emails are stored with the email doubling as the name.
    pub async fn replace_for_task<C: ConnectionTrait>(
        db: &C,
        task_row_id: i64,
        emails: &[String],
    ) -> Result<SyncOutcome, DbErr> {
        let requested = normalize_emails(emails);
        let existing = Self::find_by_task_row_id(db, task_row_id).await?;
        let existing_emails: Vec<String> = existing.iter().map(|a| a.email.clone()).collect();

        let removed: Vec<String> = existing_emails
            .iter()
            .filter(|e| !requested.contains(e))
            .cloned()
            .collect();
        let added: Vec<String> = requested
            .iter()
            .filter(|e| !existing_emails.contains(e))
            .cloned()
            .collect();

        if !removed.is_empty() {
            task_assignee::Entity::delete_many()
                .filter(task_assignee::Column::TaskId.eq(task_row_id))
                .filter(task_assignee::Column::AssigneeEmail.is_in(removed.clone()))
                .exec(db)
                .await?;
        }

        for email in &added {
            let name = match User::display_name_by_email(db, email).await? {
                Some(name) => name,
                None => {
                    tracing::warn!("User not found for email: {}, adding with email only", email);
                    email.clone()
                }
            };
            task_assignee::ActiveModel {
                task_id: Set(task_row_id),
                assignee_email: Set(email.clone()),
                assignee_name: Set(name),
                assigned_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        Ok(SyncOutcome {
            added,
            removed,
            current: requested,
        })
    }
}
