use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::crm_entry;
use crate::models::{string_list, string_map, to_json};
use crate::types::{CRM_COMPLETED_STATUSES, CRM_DROPPED_STATUSES, CRM_ONBOARDED_STATUSES};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmEntry {
    pub id: Uuid,
    pub company: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_image_url: Option<String>,
    pub status: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_to: Option<String>,
    pub next_follow_up: Option<NaiveDate>,
    pub last_contact: Option<NaiveDate>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub work: Vec<String>,
    pub lead_sources: Vec<String>,
    pub drive_link: Option<String>,
    pub socials: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub last_updated_by: Option<String>,
    pub last_updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCrmEntry {
    pub company: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_image_url: Option<String>,
    pub status: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_to: Option<String>,
    pub next_follow_up: Option<NaiveDate>,
    pub last_contact: Option<NaiveDate>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub work: Option<Vec<String>>,
    pub lead_sources: Option<Vec<String>>,
    pub drive_link: Option<String>,
    pub socials: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCrmEntry {
    pub company: Option<String>,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_image_url: Option<String>,
    pub status: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_to: Option<String>,
    pub next_follow_up: Option<NaiveDate>,
    pub last_contact: Option<NaiveDate>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub work: Option<Vec<String>>,
    pub lead_sources: Option<Vec<String>>,
    pub drive_link: Option<String>,
    pub socials: Option<BTreeMap<String, String>>,
}

impl CrmEntry {
    fn from_model(model: crm_entry::Model) -> Self {
        Self {
            id: model.uuid,
            company: model.company,
            contact_name: model.contact_name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            company_image_url: model.company_image_url,
            status: model.status,
            deal_value: model.deal_value,
            assigned_to: model.assigned_to,
            next_follow_up: model.next_follow_up,
            last_contact: model.last_contact,
            reference_id: model.reference_id,
            notes: model.notes,
            tags: string_list(model.tags),
            work: string_list(model.work),
            lead_sources: string_list(model.lead_sources),
            drive_link: model.drive_link,
            socials: string_map(model.socials),
            created_at: model.created_at,
            last_updated_by: model.last_updated_by,
            last_updated_at: model.last_updated_at,
        }
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = crm_entry::Entity::find()
            .order_by_desc(crm_entry::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    async fn find_by_statuses<C: ConnectionTrait>(
        db: &C,
        statuses: &[&str],
    ) -> Result<Vec<Self>, DbErr> {
        let values: Vec<String> = statuses.iter().map(|s| s.to_string()).collect();
        let models = crm_entry::Entity::find()
            .filter(Expr::expr(Func::lower(Expr::col(crm_entry::Column::Status))).is_in(values))
            .order_by_desc(crm_entry::Column::CreatedAt)
            .all(db)
            .await?;
        Ok(models.into_iter().map(Self::from_model).collect())
    }

    /// Active registry entries: status onboarded, on progress or quote sent.
    pub async fn find_onboarded<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Self::find_by_statuses(db, &CRM_ONBOARDED_STATUSES).await
    }

    pub async fn find_completed<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Self::find_by_statuses(db, &CRM_COMPLETED_STATUSES).await
    }

    pub async fn find_dropped<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        Self::find_by_statuses(db, &CRM_DROPPED_STATUSES).await
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = crm_entry::Entity::find()
            .filter(crm_entry::Column::Uuid.eq(id))
            .one(db)
            .await?;
        Ok(record.map(Self::from_model))
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateCrmEntry) -> Result<Self, DbErr> {
        let now = Utc::now();
        let active = crm_entry::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            company: Set(data.company.clone()),
            contact_name: Set(data.contact_name.clone()),
            email: Set(data.email.clone()),
            phone: Set(data.phone.clone()),
            address: Set(data.address.clone()),
            company_image_url: Set(data.company_image_url.clone()),
            status: Set(data.status.clone()),
            deal_value: Set(data.deal_value),
            assigned_to: Set(data.assigned_to.clone()),
            next_follow_up: Set(data.next_follow_up),
            last_contact: Set(data.last_contact),
            reference_id: Set(data.reference_id.clone()),
            notes: Set(data.notes.clone()),
            tags: Set(data.tags.as_ref().map(to_json).transpose()?),
            work: Set(data.work.as_ref().map(to_json).transpose()?),
            lead_sources: Set(data.lead_sources.as_ref().map(to_json).transpose()?),
            drive_link: Set(data.drive_link.clone()),
            socials: Set(data.socials.as_ref().map(to_json).transpose()?),
            created_at: Set(now),
            last_updated_by: Set(None),
            last_updated_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Ok(Self::from_model(model))
    }

    /// Partial update: only fields present in `data` overwrite stored values.
    /// `last_updated_by`/`last_updated_at` are always stamped from the
    /// caller, never from the request body.
    pub async fn update<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        data: &UpdateCrmEntry,
        updated_by: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = crm_entry::Entity::find()
            .filter(crm_entry::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut active: crm_entry::ActiveModel = record.into();
        if let Some(company) = &data.company {
            active.company = Set(company.clone());
        }
        if let Some(contact_name) = &data.contact_name {
            active.contact_name = Set(Some(contact_name.clone()));
        }
        if let Some(email) = &data.email {
            active.email = Set(Some(email.clone()));
        }
        if let Some(phone) = &data.phone {
            active.phone = Set(Some(phone.clone()));
        }
        if let Some(address) = &data.address {
            active.address = Set(Some(address.clone()));
        }
        if let Some(company_image_url) = &data.company_image_url {
            active.company_image_url = Set(Some(company_image_url.clone()));
        }
        if let Some(status) = &data.status {
            active.status = Set(Some(status.clone()));
        }
        if let Some(deal_value) = data.deal_value {
            active.deal_value = Set(Some(deal_value));
        }
        if let Some(assigned_to) = &data.assigned_to {
            active.assigned_to = Set(Some(assigned_to.clone()));
        }
        if let Some(next_follow_up) = data.next_follow_up {
            active.next_follow_up = Set(Some(next_follow_up));
        }
        if let Some(last_contact) = data.last_contact {
            active.last_contact = Set(Some(last_contact));
        }
        if let Some(reference_id) = &data.reference_id {
            active.reference_id = Set(Some(reference_id.clone()));
        }
        if let Some(notes) = &data.notes {
            active.notes = Set(Some(notes.clone()));
        }
        if let Some(tags) = &data.tags {
            active.tags = Set(Some(to_json(tags)?));
        }
        if let Some(work) = &data.work {
            active.work = Set(Some(to_json(work)?));
        }
        if let Some(lead_sources) = &data.lead_sources {
            active.lead_sources = Set(Some(to_json(lead_sources)?));
        }
        if let Some(drive_link) = &data.drive_link {
            active.drive_link = Set(Some(drive_link.clone()));
        }
        if let Some(socials) = &data.socials {
            active.socials = Set(Some(to_json(socials)?));
        }
        active.last_updated_by = Set(Some(updated_by.to_string()));
        active.last_updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(updated)))
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = crm_entry::Entity::delete_many()
            .filter(crm_entry::Column::Uuid.eq(id))
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

    async fn setup_db() -> sea_orm::DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    fn entry_with_status(company: &str, status: &str) -> CreateCrmEntry {
        CreateCrmEntry {
            company: company.to_string(),
            status: Some(status.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn json_fields_round_trip() {
        let db = setup_db().await;
        let mut socials = BTreeMap::new();
        socials.insert("linkedin".to_string(), "https://linkedin.com/x".to_string());

        let created = CrmEntry::create(
            &db,
            &CreateCrmEntry {
                company: "Acme".to_string(),
                tags: Some(vec!["priority".to_string(), "design".to_string()]),
                socials: Some(socials.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let found = CrmEntry::find_by_id(&db, created.id).await.unwrap().unwrap();
        assert_eq!(found.tags, vec!["priority", "design"]);
        assert_eq!(found.socials, socials);
        assert!(found.work.is_empty());
    }

    #[tokio::test]
    async fn status_buckets_match_case_insensitively() {
        let db = setup_db().await;
        CrmEntry::create(&db, &entry_with_status("A", "Onboarded"))
            .await
            .unwrap();
        CrmEntry::create(&db, &entry_with_status("B", "QUOTE SENT"))
            .await
            .unwrap();
        CrmEntry::create(&db, &entry_with_status("C", "completed"))
            .await
            .unwrap();
        CrmEntry::create(&db, &entry_with_status("D", "Drop"))
            .await
            .unwrap();
        CrmEntry::create(&db, &entry_with_status("E", "negotiating"))
            .await
            .unwrap();

        let onboarded = CrmEntry::find_onboarded(&db).await.unwrap();
        let completed = CrmEntry::find_completed(&db).await.unwrap();
        let dropped = CrmEntry::find_dropped(&db).await.unwrap();

        fn names(entries: &[CrmEntry]) -> Vec<&str> {
            let mut v: Vec<&str> = entries.iter().map(|e| e.company.as_str()).collect();
            v.sort();
            v
        }
        assert_eq!(names(&onboarded), vec!["A", "B"]);
        assert_eq!(names(&completed), vec!["C"]);
        assert_eq!(names(&dropped), vec!["D"]);
        assert_eq!(CrmEntry::find_all(&db).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn partial_update_preserves_untouched_fields_and_stamps_caller() {
        let db = setup_db().await;
        let created = CrmEntry::create(
            &db,
            &CreateCrmEntry {
                company: "Acme".to_string(),
                email: Some("contact@acme.com".to_string()),
                status: Some("onboarded".to_string()),
                tags: Some(vec!["priority".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = CrmEntry::update(
            &db,
            created.id,
            &UpdateCrmEntry {
                status: Some("Dropped".to_string()),
                ..Default::default()
            },
            "admin@example.com",
        )
        .await
        .unwrap()
        .unwrap();

        assert_eq!(updated.status.as_deref(), Some("Dropped"));
        assert_eq!(updated.company, "Acme");
        assert_eq!(updated.email.as_deref(), Some("contact@acme.com"));
        assert_eq!(updated.tags, vec!["priority"]);
        assert_eq!(updated.last_updated_by.as_deref(), Some("admin@example.com"));
    }

    #[tokio::test]
    async fn update_missing_entry_returns_none() {
        let db = setup_db().await;
        let result = CrmEntry::update(
            &db,
            Uuid::new_v4(),
            &UpdateCrmEntry::default(),
            "admin@example.com",
        )
        .await
        .unwrap();
        assert!(result.is_none());
        assert_eq!(CrmEntry::delete(&db, Uuid::new_v4()).await.unwrap(), 0);
    }
}
