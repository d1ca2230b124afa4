use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::types::Role;

use crate::{entities::user, models::ids};

/// Sanitized user projection. The password hash never leaves the entity
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub tasks_completed: i32,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub client_crm_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub google_id: Option<String>,
    pub avatar_url: Option<String>,
    pub client_crm_id: Option<Uuid>,
}

impl User {
    async fn from_model<C: ConnectionTrait>(db: &C, model: user::Model) -> Result<Self, DbErr> {
        let client_crm_id = match model.client_crm_id {
            Some(id) => ids::crm_entry_uuid_by_id(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("CRM entry not found".to_string()))
                .map(Some)?,
            None => None,
        };

        Ok(Self {
            id: model.uuid,
            name: model.name,
            email: model.email,
            role: model.role,
            tasks_completed: model.tasks_completed,
            google_id: model.google_id,
            avatar_url: model.avatar_url,
            client_crm_id,
            created_at: model.created_at,
        })
    }

    pub async fn find_all<C: ConnectionTrait>(db: &C) -> Result<Vec<Self>, DbErr> {
        let models = user::Entity::find().all(db).await?;
        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(Self::from_model(db, model).await?);
        }
        Ok(users)
    }

    pub async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?;

        match record {
            Some(model) => Ok(Some(Self::from_model(db, model).await?)),
            None => Ok(None),
        }
    }

    pub async fn email_exists<C: ConnectionTrait>(db: &C, email: &str) -> Result<bool, DbErr> {
        let id: Option<i64> = user::Entity::find()
            .select_only()
            .column(user::Column::Id)
            .filter(user::Column::Email.eq(email))
            .into_tuple()
            .one(db)
            .await?;
        Ok(id.is_some())
    }

    pub async fn password_hash_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<String>, DbErr> {
        user::Entity::find()
            .select_only()
            .column(user::Column::PasswordHash)
            .filter(user::Column::Email.eq(email))
            .into_tuple()
            .one(db)
            .await
    }

    pub async fn display_name_by_email<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<Option<String>, DbErr> {
        user::Entity::find()
            .select_only()
            .column(user::Column::Name)
            .filter(user::Column::Email.eq(email))
            .into_tuple()
            .one(db)
            .await
    }

    pub async fn create<C: ConnectionTrait>(db: &C, data: &CreateUser) -> Result<Self, DbErr> {
        let client_crm_id = match data.client_crm_id {
            Some(id) => ids::crm_entry_id_by_uuid(db, id)
                .await?
                .ok_or(DbErr::RecordNotFound("CRM entry not found".to_string()))
                .map(Some)?,
            None => None,
        };

        let active = user::ActiveModel {
            uuid: Set(Uuid::new_v4()),
            name: Set(data.name.clone()),
            email: Set(data.email.clone()),
            password_hash: Set(data.password_hash.clone()),
            role: Set(data.role),
            tasks_completed: Set(0),
            google_id: Set(data.google_id.clone()),
            avatar_url: Set(data.avatar_url.clone()),
            client_crm_id: Set(client_crm_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active.insert(db).await?;
        Self::from_model(db, model).await
    }

    pub async fn update_role<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        role: Role,
    ) -> Result<Option<Self>, DbErr> {
        let record = user::Entity::find()
            .filter(user::Column::Uuid.eq(id))
            .one(db)
            .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = record.into();
        active.role = Set(role);
        let updated = active.update(db).await?;
        Ok(Some(Self::from_model(db, updated).await?))
    }

    pub async fn update_password_hash<C: ConnectionTrait>(
        db: &C,
        email: &str,
        password_hash: &str,
    ) -> Result<u64, DbErr> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .filter(user::Column::Email.eq(email))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn update_google_profile<C: ConnectionTrait>(
        db: &C,
        email: &str,
        google_id: &str,
        avatar_url: Option<&str>,
    ) -> Result<u64, DbErr> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::GoogleId, Expr::value(google_id))
            .col_expr(
                user::Column::AvatarUrl,
                Expr::value(avatar_url.map(str::to_string)),
            )
            .filter(user::Column::Email.eq(email))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Atomic storage-level increment of the completion counter. Never a
    /// read-modify-write, so concurrent completions cannot lose updates.
    pub async fn increment_tasks_completed<C: ConnectionTrait>(
        db: &C,
        email: &str,
    ) -> Result<u64, DbErr> {
        let result = user::Entity::update_many()
            .col_expr(
                user::Column::TasksCompleted,
                Expr::col(user::Column::TasksCompleted).add(1),
            )
            .filter(user::Column::Email.eq(email))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<u64, DbErr> {
        let result = user::Entity::delete_many()
            .filter(user::Column::Uuid.eq(id))
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

    fn sample_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "argon2-hash".to_string(),
            role: Role::Employee,
            google_id: None,
            avatar_url: None,
            client_crm_id: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_back() {
        let db = setup_db().await;
        let created = User::create(&db, &sample_user("a@example.com"))
            .await
            .unwrap();
        assert_eq!(created.tasks_completed, 0);
        assert_eq!(created.role, Role::Employee);

        let found = User::find_by_email(&db, "a@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
        assert!(User::email_exists(&db, "a@example.com").await.unwrap());
        assert!(!User::email_exists(&db, "b@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_rejected_by_schema() {
        let db = setup_db().await;
        User::create(&db, &sample_user("dup@example.com"))
            .await
            .unwrap();
        let err = User::create(&db, &sample_user("dup@example.com")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn increment_is_per_email_and_additive() {
        let db = setup_db().await;
        User::create(&db, &sample_user("inc@example.com"))
            .await
            .unwrap();

        assert_eq!(
            User::increment_tasks_completed(&db, "inc@example.com")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            User::increment_tasks_completed(&db, "inc@example.com")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            User::increment_tasks_completed(&db, "missing@example.com")
                .await
                .unwrap(),
            0
        );

        let user = User::find_by_email(&db, "inc@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.tasks_completed, 2);
    }

    #[tokio::test]
    async fn role_update_touches_only_role() {
        let db = setup_db().await;
        let created = User::create(&db, &sample_user("role@example.com"))
            .await
            .unwrap();

        let updated = User::update_role(&db, created.id, Role::SuperAdmin)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, Role::SuperAdmin);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);

        let missing = User::update_role(&db, Uuid::new_v4(), Role::Admin)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
