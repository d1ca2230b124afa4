use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::meeting;
use crate::models::ids;

pub const DEFAULT_MEETING_STATUS: &str = "Scheduled";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub status: String,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeeting {
    pub title: String,
    pub date_time: DateTime<Utc>,
    pub status: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeeting {
    pub title: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub company_id: Option<Uuid>,
    pub assigned_to: Option<String>,
}

impl Meeting {
    async fn from_model<C: ConnectionTrait>(db: &C, model: meeting::Model) -> Result<Self, DbErr> {
        let company_id = match model.crm_entry_id {
            Some(row_id) => Some(
                ids::crm_entry_uuid_by_id(db, row_id)
                    .await?
                    .ok_or_else(|| {
                        DbErr::RecordNotFound(format!("crm entry row {row_id} missing"))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            id: model.uuid,
            title: model.title,
            date_time: model.date_time,
            status: model.status,
            meeting_link: model.meeting_link,
            notes: model.notes,
            company_id,
            assigned_to: model.assigned_to,
            created_at: model.created_at,
            last_updated_by: model.last_updated_by,
            last_updated_at: model.last_updated_at,
        })
    }

    async fn collect<C: ConnectionTrait>(
        db: &C,
        models: Vec<meeting::Model>,
    ) -> Result<Vec<Self>, DbErr> {
        let mut meetings = Vec::with_capacity(models.len());
        for model in models {
            meetings.push(Self::from_model(db, model).await?);
        }
        Ok(meetings)
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = meeting::Entity::find()
            .order_by_desc(meeting::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    /// Meetings owned by one user: `assigned_to` equals the email or its
    /// local part, case-insensitively.
    pub async fn find_for_user<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Vec<Self>, DbErr> {
        let email_lower = email.trim().to_lowercase();
        let local_part = email_lower.split('@').next().unwrap_or("").to_string();
        let models = meeting::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(meeting::Column::AssignedTo)))
                    .is_in([email_lower, local_part]),
            )
            .order_by_desc(meeting::Column::CreatedAt)
            .all(db)
            .await?;
        Self::collect(db, models).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = meeting::Entity::find()
            .filter(meeting::Column::Uuid.eq(id))
            .one(db)
            .await?;
        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateMeeting) -> Result<Self, DbErr> {
        let crm_row_id = match data.company_id {
            Some(company) => Some(ids::crm_entry_id_by_uuid(db, company).await?.ok_or_else(
                || DbErr::RecordNotFound(format!("CRM Entry not found with id: {company}")),
            )?),
            None => None,
        };

        let now = Utc::now();
        let active = meeting::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            title: Set(data.title.clone()),
            date_time: Set(data.date_time),
            status: Set(data
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_MEETING_STATUS.to_string())),
            meeting_link: Set(data.meeting_link.clone()),
            notes: Set(data.notes.clone()),
            crm_entry_id: Set(crm_row_id),
            assigned_to: Set(data.assigned_to.clone()),
            created_at: Set(now),
            last_updated_by: Set(None),
            last_updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateMeeting,
        updated_by: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = meeting::Entity::find()
            .filter(meeting::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut active: meeting::ActiveModel = record.into();
        if let Some(title) = &data.title {
            active.title = Set(title.clone());
        }
        if let Some(date_time) = data.date_time {
            active.date_time = Set(date_time);
        }
        if let Some(status) = &data.status {
            active.status = Set(status.clone());
        }
        if let Some(meeting_link) = &data.meeting_link {
            active.meeting_link = Set(Some(meeting_link.clone()));
        }
        if let Some(notes) = &data.notes {
            active.notes = Set(Some(notes.clone()));
        }
        if let Some(company) = data.company_id {
            let row_id = ids::crm_entry_id_by_uuid(db, company).await?.ok_or_else(
                || DbErr::RecordNotFound(format!("CRM Entry not found with id: {company}")),
            )?;
            active.crm_entry_id = Set(Some(row_id));
        }
        if let Some(assigned_to) = &data.assigned_to {
            active.assigned_to = Set(Some(assigned_to.clone()));
        }
        active.last_updated_by = Set(Some(updated_by.to_string()));
        active.last_updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(db, updated).await?))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = meeting::Entity::delete_many()
            .filter(meeting::Column::Uuid.eq(id))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;
    use crate::models::crm_entry::{CreateCrmEntry, CrmEntry};

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn meeting_for(title: &str, assigned_to: Option<&str>) -> CreateMeeting {
        CreateMeeting {
            title: title.to_string(),
            date_time: Utc::now(),
            status: None,
            meeting_link: None,
            notes: None,
            company_id: None,
            assigned_to: assigned_to.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn create_defaults_status_to_scheduled() {
        let db = setup_db().await;
        let meeting = Meeting::create(&db, &meeting_for("Kickoff", None)).await.unwrap();
        assert_eq!(meeting.status, DEFAULT_MEETING_STATUS);

        let explicit = Meeting::create(
            &db,
            &CreateMeeting {
                status: Some("Cancelled".to_string()),
                ..meeting_for("Kickoff 2", None)
            },
        )
        .await
        .unwrap();
        assert_eq!(explicit.status, "Cancelled");
    }

    #[tokio::test]
    async fn find_for_user_matches_email_and_local_part() {
        let db = setup_db().await;
        Meeting::create(&db, &meeting_for("by email", Some("Ana@Example.com")))
            .await
            .unwrap();
        Meeting::create(&db, &meeting_for("by local part", Some("ana")))
            .await
            .unwrap();
        Meeting::create(&db, &meeting_for("someone else", Some("bo@example.com")))
            .await
            .unwrap();
        Meeting::create(&db, &meeting_for("unowned", None)).await.unwrap();

        let mine = Meeting::find_for_user(&db, "ana@example.com").await.unwrap();
        let titles: Vec<&str> = mine.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"by email"));
        assert!(titles.contains(&"by local part"));
    }

    #[tokio::test]
    async fn update_relinks_company_and_stamps() {
        let db = setup_db().await;
        let company = CrmEntry::create(
            &db,
            &CreateCrmEntry {
                company: "Acme".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let meeting = Meeting::create(&db, &meeting_for("Review", None)).await.unwrap();

        let updated = Meeting::update(
            &db,
            meeting.id,
            &UpdateMeeting {
                company_id: Some(company.id),
                notes: Some("bring the deck".to_string()),
                ..Default::default()
            },
            "lead@example.com",
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.company_id, Some(company.id));
        assert_eq!(updated.notes.as_deref(), Some("bring the deck"));
        assert_eq!(updated.title, "Review");
        assert_eq!(updated.last_updated_by.as_deref(), Some("lead@example.com"));
    }

    #[tokio::test]
    async fn delete_missing_returns_zero() {
        let db = setup_db().await;
        assert_eq!(Meeting::delete(&db, Uuid::new_v4()).await.unwrap(), 0);
        let meeting = Meeting::create(&db, &meeting_for("gone", None)).await.unwrap();
        assert_eq!(Meeting::delete(&db, meeting.id).await.unwrap(), 1);
        assert!(Meeting::find_by_id(&db, meeting.id).await.unwrap().is_none());
    }
}
