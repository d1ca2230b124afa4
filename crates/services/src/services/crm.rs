use db::models::crm_entry::{CreateCrmEntry, CrmEntry, UpdateCrmEntry};
use db::models::user::User;
use db::{DbErr, DbPool};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CrmServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("Client user '{0}' is not linked to any CRM entry. Please contact administrator.")]
    ClientNotLinked(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for CrmServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => CrmServiceError::NotFound(message),
            other => CrmServiceError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrmServiceError>;

#[derive(Clone, Default)]
pub struct CrmService;

impl CrmService {
    pub fn new() -> Self {
        Self
    }

    pub async fn all(&self, pool: &DbPool) -> Result<Vec<CrmEntry>> {
        Ok(CrmEntry::find_all(pool).await?)
    }

    pub async fn onboarded(&self, pool: &DbPool) -> Result<Vec<CrmEntry>> {
        Ok(CrmEntry::find_onboarded(pool).await?)
    }

    pub async fn completed(&self, pool: &DbPool) -> Result<Vec<CrmEntry>> {
        Ok(CrmEntry::find_completed(pool).await?)
    }

    pub async fn dropped(&self, pool: &DbPool) -> Result<Vec<CrmEntry>> {
        Ok(CrmEntry::find_dropped(pool).await?)
    }

    pub async fn get(&self, pool: &DbPool, id: Uuid) -> Result<CrmEntry> {
        CrmEntry::find_by_id(pool, id)
            .await?
            .ok_or_else(|| CrmServiceError::NotFound(format!("CRM Entry not found with id: {id}")))
    }

    /// The single CRM entry a client account is linked to.
    pub async fn client_entry(&self, pool: &DbPool, email: &str) -> Result<CrmEntry> {
        let user = User::find_by_email(pool, email)
            .await?
            .ok_or_else(|| CrmServiceError::NotFound(format!("User not found with email: {email}")))?;
        let link = user
            .client_crm_id
            .ok_or_else(|| CrmServiceError::ClientNotLinked(email.to_string()))?;
        self.get(pool, link).await
    }

    pub async fn create(&self, pool: &DbPool, data: CreateCrmEntry) -> Result<CrmEntry> {
        let entry = CrmEntry::create(pool, &data).await?;
        tracing::info!("created crm entry {} ({})", entry.company, entry.id);
        Ok(entry)
    }

    pub async fn update(
        &self,
        pool: &DbPool,
        id: Uuid,
        data: UpdateCrmEntry,
        updated_by: &str,
    ) -> Result<CrmEntry> {
        CrmEntry::update(pool, id, &data, updated_by)
            .await?
            .ok_or_else(|| CrmServiceError::NotFound(format!("CRM Entry not found with id: {id}")))
    }

    pub async fn delete(&self, pool: &DbPool, id: Uuid) -> Result<()> {
        let rows = CrmEntry::delete(pool, id).await?;
        if rows == 0 {
            return Err(CrmServiceError::NotFound(format!(
                "CRM Entry not found with id: {id}"
            )));
        }
        tracing::info!("deleted crm entry {}", id);
        Ok(())
    }
}
