use db::models::user::User;
use db::types::Role;
use db::{DbErr, DbPool};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("Invalid role. Must be ADMIN, EMPLOYEE, or SUPER_ADMIN")]
    InvalidRole,
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for UserServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => UserServiceError::NotFound(message),
            other => UserServiceError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, UserServiceError>;

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

#[derive(Clone, Default)]
pub struct UsersService;

impl UsersService {
    pub fn new() -> Self {
        Self
    }

    pub async fn all(&self, pool: &DbPool) -> Result<Vec<User>> {
        Ok(User::find_all(pool).await?)
    }

    pub async fn me(&self, pool: &DbPool, email: &str) -> Result<User> {
        User::find_by_email(pool, email)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(format!("User not found with email: {email}")))
    }

    pub async fn get(&self, pool: &DbPool, id: Uuid) -> Result<User> {
        User::find_by_id(pool, id)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(format!("User not found with id: {id}")))
    }

    /// Role change by a super admin. Unlike self-registration this accepts
    /// every role, CLIENT included.
    pub async fn update_role(
        &self,
        pool: &DbPool,
        id: Uuid,
        request: UpdateUserRoleRequest,
    ) -> Result<User> {
        let role = Role::parse(&request.role).ok_or(UserServiceError::InvalidRole)?;
        let updated = User::update_role(pool, id, role)
            .await?
            .ok_or_else(|| UserServiceError::NotFound(format!("User not found with id: {id}")))?;
        tracing::info!("role of {} set to {}", updated.email, updated.role);
        Ok(updated)
    }

    pub async fn delete(&self, pool: &DbPool, id: Uuid) -> Result<()> {
        let rows = User::delete(pool, id).await?;
        if rows == 0 {
            return Err(UserServiceError::NotFound(format!(
                "User not found with id: {id}"
            )));
        }
        tracing::info!("deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use db::models::user::CreateUser;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    use super::*;

    async fn setup_db() -> DbPool {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db_migration::Migrator::up(&db, None).await.unwrap();
        db
    }

    async fn seed(pool: &DbPool, email: &str) -> User {
        User::create(
            pool,
            &CreateUser {
                name: "Someone".to_string(),
                email: email.to_string(),
                password_hash: "irrelevant".to_string(),
                role: Role::Employee,
                google_id: None,
                avatar_url: None,
                client_crm_id: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn lookups_carry_the_identifier_in_the_message() {
        let pool = setup_db().await;
        let service = UsersService::new();

        let err = service.me(&pool, "ghost@example.com").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "User not found with email: ghost@example.com"
        );

        let id = Uuid::new_v4();
        let err = service.get(&pool, id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("User not found with id: {id}"));
    }

    #[tokio::test]
    async fn update_role_accepts_every_role_including_client() {
        let pool = setup_db().await;
        let service = UsersService::new();
        let user = seed(&pool, "promote@example.com").await;

        for (raw, expected) in [
            ("ADMIN", Role::Admin),
            ("employee", Role::Employee),
            ("ROLE_SUPER_ADMIN", Role::SuperAdmin),
            ("CLIENT", Role::Client),
        ] {
            let updated = service
                .update_role(
                    &pool,
                    user.id,
                    UpdateUserRoleRequest {
                        role: raw.to_string(),
                    },
                )
                .await
                .unwrap();
            assert_eq!(updated.role, expected);
        }
    }

    #[tokio::test]
    async fn update_role_rejects_unknown_names() {
        let pool = setup_db().await;
        let service = UsersService::new();
        let user = seed(&pool, "stay@example.com").await;

        let err = service
            .update_role(
                &pool,
                user.id,
                UpdateUserRoleRequest {
                    role: "OVERLORD".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid role. Must be ADMIN, EMPLOYEE, or SUPER_ADMIN"
        );
        assert_eq!(
            service.get(&pool, user.id).await.unwrap().role,
            Role::Employee
        );
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let pool = setup_db().await;
        let service = UsersService::new();
        let user = seed(&pool, "bye@example.com").await;

        service.delete(&pool, user.id).await.unwrap();
        let err = service.delete(&pool, user.id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("User not found with id: {}", user.id));
    }
}
