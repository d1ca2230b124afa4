use db::models::meeting::{CreateMeeting, Meeting, UpdateMeeting};
use db::{DbErr, DbPool};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MeetingServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for MeetingServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => MeetingServiceError::NotFound(message),
            other => MeetingServiceError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, MeetingServiceError>;

#[derive(Clone, Default)]
pub struct MeetingsService;

impl MeetingsService {
    pub fn new() -> Self {
        Self
    }

    pub async fn all(&self, pool: &DbPool) -> Result<Vec<Meeting>> {
        Ok(Meeting::find_all(pool).await?)
    }

    pub async fn my_meetings(&self, pool: &DbPool, email: &str) -> Result<Vec<Meeting>> {
        Ok(Meeting::find_for_user(pool, email).await?)
    }

    pub async fn get(&self, pool: &DbPool, id: Uuid) -> Result<Meeting> {
        Meeting::find_by_id(pool, id)
            .await?
            .ok_or_else(|| MeetingServiceError::NotFound(format!("Meeting not found with id: {id}")))
    }

    pub async fn create(&self, pool: &DbPool, data: CreateMeeting) -> Result<Meeting> {
        let meeting = Meeting::create(pool, &data).await?;
        tracing::info!("created meeting {} ({})", meeting.title, meeting.id);
        Ok(meeting)
    }

    pub async fn update(
        &self,
        pool: &DbPool,
        id: Uuid,
        data: UpdateMeeting,
        updated_by: &str,
    ) -> Result<Meeting> {
        Meeting::update(pool, id, &data, updated_by)
            .await?
            .ok_or_else(|| MeetingServiceError::NotFound(format!("Meeting not found with id: {id}")))
    }

    pub async fn delete(&self, pool: &DbPool, id: Uuid) -> Result<()> {
        let rows = Meeting::delete(pool, id).await?;
        if rows == 0 {
            return Err(MeetingServiceError::NotFound(format!(
                "Meeting not found with id: {id}"
            )));
        }
        tracing::info!("deleted meeting {}", id);
        Ok(())
    }
}
