use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::task;
use crate::models::task_assignee::TaskAssignee;
use crate::models::{ids, string_list, to_json};
use crate::types::is_terminal_task_status;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// Legacy single-assignee field, kept for old clients. The structured
    /// set in `assignees` wins whenever it is non-empty.
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub company_id: Option<Uuid>,
    pub task_type: Option<String>,
    pub attachments: Vec<String>,
    pub task_link: Option<String>,
    pub is_visible_on_main_board: Option<bool>,
    pub assignees: Vec<TaskAssignee>,
    pub assigned_to_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub company_id: Option<Uuid>,
    pub task_type: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub task_link: Option<String>,
    pub is_visible_on_main_board: Option<bool>,
    /// Synced through `TaskAssignee::replace_for_task`, not by `create`.
    pub assigned_to_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub company_id: Option<Uuid>,
    pub task_type: Option<String>,
    pub attachments: Option<Vec<String>>,
    pub task_link: Option<String>,
    pub is_visible_on_main_board: Option<bool>,
    /// Synced through `TaskAssignee::replace_for_task`, not by
    /// `update_fields`.
    pub assigned_to_list: Option<Vec<String>>,
}

impl Task {
    async fn from_model<C: ConnectionTrait>(db: &C, model: task::Model) -> Result<Self, DbErr> {
        let company_id = match model.company_id {
            Some(row_id) => Some(
                ids::crm_entry_uuid_by_id(db, row_id)
                    .await?
                    .ok_or_else(|| {
                        DbErr::RecordNotFound(format!("crm entry row {row_id} missing"))
                    })?,
            ),
            None => None,
        };
        let assignees = TaskAssignee::find_by_task_row_id(db, model.id).await?;
        let assigned_to_list = assignees.iter().map(|a| a.email.clone()).collect();

        Ok(Self {
            id: model.uuid,
            title: model.title,
            description: model.description,
            status: model.status,
            priority: model.priority,
            assigned_to: model.assigned_to,
            due_date: model.due_date,
            company_id,
            task_type: model.task_type,
            attachments: string_list(model.attachments),
            task_link: model.task_link,
            is_visible_on_main_board: model.is_visible_on_main_board,
            assignees,
            assigned_to_list,
            created_at: model.created_at,
            last_updated_by: model.last_updated_by,
            last_updated_at: model.last_updated_at,
        })
    }

    async fn collect<C: ConnectionTrait>(
        db: &C,
        models: Vec<task::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut tasks = Vec::with_capacity(models.len());
        for model in models {
            tasks.push(Self::from_model(db, model).await?);
        }
        Ok(tasks)
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = task::Entity::find()
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    /// Tasks whose status is outside the terminal bucket. Missing status
    /// counts as active.
    pub async fn find_active<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Ok(Self::find_all(db)
            .await?
            .into_iter()
            .filter(|t| !is_terminal_task_status(t.status.as_deref()))
            .collect())
    }

    pub async fn find_completed<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Ok(Self::find_all(db)
            .await?
            .into_iter()
            .filter(|t| is_terminal_task_status(t.status.as_deref()))
            .collect())
    }

    /// Tasks visible to one assignee. Structured assignees are matched by
    /// email (case-insensitive); tasks without any structured assignee fall
    /// back to the legacy field, which matches when equal to the email or
    /// containing its local part.
    pub async fn find_for_assignee<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let email_lower = email.trim().to_lowercase();
        let local_part = email_lower.split('@').next().unwrap_or("").to_string();

        Ok(Self::find_all(db)
            .await?
            .into_iter()
            .filter(|t| {
                if !t.assigned_to_list.is_empty() {
                    return t
                        .assigned_to_list
                        .iter()
                        .any(|e| e.eq_ignore_ascii_case(&email_lower));
                }
                match &t.assigned_to {
                    Some(assigned) => {
                        assigned.eq_ignore_ascii_case(&email_lower)
                            || assigned.to_lowercase().contains(&local_part)
                    }
                    None => false,
                }
            })
            .collect())
    }

    pub async fn find_by_company<C: ConnectionTrait>(
        db: &C,
        company: Uuid,
    ) -> Result<Vec<Self>, DbErr> {
        let Some(row_id) = ids::crm_entry_id_by_uuid(db, company).await? else {
            return Ok(Vec::new());
        };
        let models = task::Entity::find()
            .filter(task::Column::CompanyId.eq(row_id))
            .order_by_desc(task::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateTask) -> Result<Self, DbErr> {
        let company_row_id = match data.company_id {
            Some(company) => Some(ids::crm_entry_id_by_uuid(db, company).await?.ok_or_else(
                || DbErr::RecordNotFound(format!("CRM Entry not found with id: {company}")),
            )?),
            None => None,
        };

        let now = Utc::now();
        let active = task::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            title: Set(data.title.clone()),
            description: Set(data.description.clone()),
            status: Set(data.status.clone()),
            priority: Set(data.priority.clone()),
            assigned_to: Set(data.assigned_to.clone()),
            due_date: Set(data.due_date),
            company_id: Set(company_row_id),
            task_type: Set(data.task_type.clone()),
            attachments: Set(data.attachments.as_ref().map(to_json).transpose()?),
            task_link: Set(data.task_link.clone()),
            is_visible_on_main_board: Set(data.is_visible_on_main_board),
            created_at: Set(now),
            last_updated_by: Set(None),
            last_updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    /// Partial update of scalar fields plus the caller stamp. The assignee
    /// set is reconciled separately so its diff stays observable.
    pub async fn update_fields<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateTask,
        updated_by: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = task::Entity::find()
            .filter(task::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut active: task::ActiveModel = record.into();
        if let Some(title) = &data.title {
            active.title = Set(title.clone());
        }
        if let Some(description) = &data.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(status) = &data.status {
            active.status = Set(Some(status.clone()));
        }
        if let Some(priority) = &data.priority {
            active.priority = Set(Some(priority.clone()));
        }
        if let Some(assigned_to) = &data.assigned_to {
            active.assigned_to = Set(Some(assigned_to.clone()));
        }
        if let Some(due_date) = data.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(company) = data.company_id {
            let row_id = ids::crm_entry_id_by_uuid(db, company).await?.ok_or_else(
                || DbErr::RecordNotFound(format!("CRM Entry not found with id: {company}")),
            )?;
            active.company_id = Set(Some(row_id));
        }
        if let Some(task_type) = &data.task_type {
            active.task_type = Set(Some(task_type.clone()));
        }
        if let Some(attachments) = &data.attachments {
            active.attachments = Set(Some(to_json(attachments)?));
        }
        if let Some(task_link) = &data.task_link {
            active.task_link = Set(Some(task_link.clone()));
        }
        if let Some(visible) = data.is_visible_on_main_board {
            active.is_visible_on_main_board = Set(Some(visible));
        }
        active.last_updated_by = Set(Some(updated_by.to_string()));
        active.last_updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(db, updated).await?))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}
