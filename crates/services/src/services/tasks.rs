use db::models::ids;
use db::models::task::{CreateTask, Task, UpdateTask};
use db::models::task_assignee::TaskAssignee;
use db::models::user::User;
use db::types::is_terminal_task_status;
use db::{DbErr, DbPool, TransactionTrait};
use thiserror::Error;
use uuid::Uuid;

use crate::services::email::{task_assignment_email, Mailer};

#[derive(Debug, Error)]
pub enum TaskServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("Client user '{0}' is not linked to any CRM entry. Please contact administrator.")]
    ClientNotLinked(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for TaskServiceError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::RecordNotFound(message) => TaskServiceError::NotFound(message),
            other => TaskServiceError::Database(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskServiceError>;

#[derive(Clone, Default)]
pub struct TasksService;

impl TasksService {
    pub fn new() -> Self {
        Self
    }

    pub async fn all(&self, pool: &DbPool) -> Result<Vec<Task>> {
        Ok(Task::find_all(pool).await?)
    }

    pub async fn active(&self, pool: &DbPool) -> Result<Vec<Task>> {
        Ok(Task::find_active(pool).await?)
    }

    pub async fn completed(&self, pool: &DbPool) -> Result<Vec<Task>> {
        Ok(Task::find_completed(pool).await?)
    }

    pub async fn my_tasks(&self, pool: &DbPool, email: &str) -> Result<Vec<Task>> {
        Ok(Task::find_for_assignee(pool, email).await?)
    }

    /// Tasks of the CRM entry a client account is linked to.
    pub async fn client_tasks(&self, pool: &DbPool, email: &str) -> Result<Vec<Task>> {
        let user = User::find_by_email(pool, email)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(format!("User not found with email: {email}")))?;
        let company = user
            .client_crm_id
            .ok_or_else(|| TaskServiceError::ClientNotLinked(email.to_string()))?;
        Ok(Task::find_by_company(pool, company).await?)
    }

    pub async fn get(&self, pool: &DbPool, id: Uuid) -> Result<Task> {
        Task::find_by_id(pool, id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(format!("Task not found with id: {id}")))
    }

    /// Creates the task and its assignee set in one transaction, then mails
    /// every assignee once the write is durable.
    pub async fn create(
        &self,
        pool: &DbPool,
        mailer: &dyn Mailer,
        creator_email: &str,
        data: CreateTask,
    ) -> Result<Task> {
        let txn = pool.begin().await?;
        let task = Task::create(&txn, &data).await?;
        let (task, notify) = match &data.assigned_to_list {
            Some(emails) => {
                let row_id = ids::task_id_by_uuid(&txn, task.id).await?.ok_or_else(|| {
                    DbErr::RecordNotFound(format!("Task not found with id: {}", task.id))
                })?;
                let outcome = TaskAssignee::replace_for_task(&txn, row_id, emails).await?;
                let task = Task::find_by_id(&txn, task.id).await?.ok_or_else(|| {
                    TaskServiceError::NotFound(format!("Task not found with id: {}", task.id))
                })?;
                (task, outcome.current)
            }
            None => (task, Vec::new()),
        };
        txn.commit().await?;

        tracing::info!("created task {} ({})", task.title, task.id);
        self.notify_assignees(pool, mailer, creator_email, &task, &notify)
            .await;
        Ok(task)
    }

    /// Partial update. Reconciles the assignee set when one is sent, and
    /// bumps each assignee's completion counter when the status moves from
    /// an active value into the terminal bucket. Counter bumps for unknown
    /// emails are logged and skipped, never fatal.
    ///
    /// Only newly added assignees are notified.
    pub async fn update(
        &self,
        pool: &DbPool,
        mailer: &dyn Mailer,
        updater_email: &str,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Task> {
        let txn = pool.begin().await?;
        let before = Task::find_by_id(&txn, id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(format!("Task not found with id: {id}")))?;
        let was_terminal = is_terminal_task_status(before.status.as_deref());

        Task::update_fields(&txn, id, &data, updater_email)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(format!("Task not found with id: {id}")))?;

        let newly_added = match &data.assigned_to_list {
            Some(emails) => {
                let row_id = ids::task_id_by_uuid(&txn, id).await?.ok_or_else(|| {
                    DbErr::RecordNotFound(format!("Task not found with id: {id}"))
                })?;
                TaskAssignee::replace_for_task(&txn, row_id, emails)
                    .await?
                    .added
            }
            None => Vec::new(),
        };

        let task = Task::find_by_id(&txn, id)
            .await?
            .ok_or_else(|| TaskServiceError::NotFound(format!("Task not found with id: {id}")))?;
        let now_terminal = is_terminal_task_status(task.status.as_deref());

        if !was_terminal && now_terminal {
            for email in completion_targets(&task) {
                match User::increment_tasks_completed(&txn, &email).await {
                    Ok(0) => tracing::warn!("Could not increment tasks for user: {}", email),
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!("Could not increment tasks for user: {}: {}", email, err)
                    }
                }
            }
        }
        txn.commit().await?;

        self.notify_assignees(pool, mailer, updater_email, &task, &newly_added)
            .await;
        Ok(task)
    }

    pub async fn delete(&self, pool: &DbPool, id: Uuid) -> Result<()> {
        let rows = Task::delete(pool, id).await?;
        if rows == 0 {
            return Err(TaskServiceError::NotFound(format!(
                "Task not found with id: {id}"
            )));
        }
        tracing::info!("deleted task {}", id);
        Ok(())
    }

    async fn notify_assignees(
        &self,
        pool: &DbPool,
        mailer: &dyn Mailer,
        assigner_email: &str,
        task: &Task,
        recipients: &[String],
    ) {
        if recipients.is_empty() {
            return;
        }
        let assigner_name = match User::display_name_by_email(pool, assigner_email).await {
            Ok(Some(name)) => name,
            _ => assigner_email.to_string(),
        };
        for email in recipients {
            if let Err(err) = mailer
                .send(task_assignment_email(email, &assigner_name, task))
                .await
            {
                tracing::error!(
                    "Failed to send task assignment email to: {} for task: {}: {}",
                    email,
                    task.title,
                    err
                );
            }
        }
    }
}

/// Who gets credit when a task completes. The structured assignee set wins;
/// a task that only has the legacy free-text field counts for it only when
/// it holds an email address.
fn completion_targets(task: &Task) -> Vec<String> {
    if !task.assigned_to_list.is_empty() {
        return task.assigned_to_list.clone();
    }
    match task.assigned_to.as_deref() {
        Some(assigned) if assigned.contains('@') => vec![assigned.trim().to_lowercase()],
        _ => Vec::new(),
    }
}
