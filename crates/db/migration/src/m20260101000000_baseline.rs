use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(CrmEntries::Table)
                    .col(pk_id_col(manager, CrmEntries::Id))
                    .col(uuid_col(CrmEntries::Uuid))
                    .col(ColumnDef::new(CrmEntries::Company).string().not_null())
                    .col(ColumnDef::new(CrmEntries::ContactName).string())
                    .col(ColumnDef::new(CrmEntries::Email).string())
                    .col(ColumnDef::new(CrmEntries::Phone).string())
                    .col(ColumnDef::new(CrmEntries::Address).string())
                    .col(ColumnDef::new(CrmEntries::CompanyImageUrl).string())
                    .col(ColumnDef::new(CrmEntries::Status).string())
                    .col(ColumnDef::new(CrmEntries::DealValue).double())
                    .col(ColumnDef::new(CrmEntries::AssignedTo).string())
                    .col(ColumnDef::new(CrmEntries::NextFollowUp).date())
                    .col(ColumnDef::new(CrmEntries::LastContact).date())
                    .col(ColumnDef::new(CrmEntries::ReferenceId).string())
                    .col(ColumnDef::new(CrmEntries::Notes).text())
                    .col(ColumnDef::new(CrmEntries::Tags).json())
                    .col(ColumnDef::new(CrmEntries::Work).json())
                    .col(ColumnDef::new(CrmEntries::LeadSources).json())
                    .col(ColumnDef::new(CrmEntries::DriveLink).string())
                    .col(ColumnDef::new(CrmEntries::Socials).json())
                    .col(timestamp_col(CrmEntries::CreatedAt))
                    .col(ColumnDef::new(CrmEntries::LastUpdatedBy).string())
                    .col(timestamp_col(CrmEntries::LastUpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_crm_entries_uuid")
                    .table(CrmEntries::Table)
                    .col(CrmEntries::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_crm_entries_status")
                    .table(CrmEntries::Table)
                    .col(CrmEntries::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_crm_entries_reference_id")
                    .table(CrmEntries::Table)
                    .col(CrmEntries::ReferenceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Users::Table)
                    .col(pk_id_col(manager, Users::Id))
                    .col(uuid_col(Users::Uuid))
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("EMPLOYEE")),
                    )
                    .col(
                        ColumnDef::new(Users::TasksCompleted)
                            .integer()
                            .not_null()
                            .default(Expr::val(0)),
                    )
                    .col(ColumnDef::new(Users::GoogleId).string())
                    .col(ColumnDef::new(Users::AvatarUrl).string())
                    .col(fk_id_nullable_col(manager, Users::ClientCrmId))
                    .col(timestamp_col(Users::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_client_crm_id")
                            .from(Users::Table, Users::ClientCrmId)
                            .to(CrmEntries::Table, CrmEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_uuid")
                    .table(Users::Table)
                    .col(Users::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_email")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_users_google_id")
                    .table(Users::Table)
                    .col(Users::GoogleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Tasks::Table)
                    .col(pk_id_col(manager, Tasks::Id))
                    .col(uuid_col(Tasks::Uuid))
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text())
                    .col(ColumnDef::new(Tasks::Status).string())
                    .col(ColumnDef::new(Tasks::Priority).string())
                    .col(ColumnDef::new(Tasks::AssignedTo).string())
                    .col(ColumnDef::new(Tasks::DueDate).date())
                    .col(fk_id_nullable_col(manager, Tasks::CompanyId))
                    .col(ColumnDef::new(Tasks::TaskType).string())
                    .col(ColumnDef::new(Tasks::Attachments).json())
                    .col(ColumnDef::new(Tasks::TaskLink).string())
                    .col(ColumnDef::new(Tasks::IsVisibleOnMainBoard).boolean())
                    .col(timestamp_col(Tasks::CreatedAt))
                    .col(ColumnDef::new(Tasks::LastUpdatedBy).string())
                    .col(timestamp_col(Tasks::LastUpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tasks_company_id")
                            .from(Tasks::Table, Tasks::CompanyId)
                            .to(CrmEntries::Table, CrmEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_uuid")
                    .table(Tasks::Table)
                    .col(Tasks::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_company_id")
                    .table(Tasks::Table)
                    .col(Tasks::CompanyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_tasks_status")
                    .table(Tasks::Table)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(TaskAssignees::Table)
                    .col(pk_id_col(manager, TaskAssignees::Id))
                    .col(fk_id_col(manager, TaskAssignees::TaskId))
                    .col(ColumnDef::new(TaskAssignees::AssigneeEmail).string().not_null())
                    .col(ColumnDef::new(TaskAssignees::AssigneeName).string().not_null())
                    .col(timestamp_col(TaskAssignees::AssignedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_task_assignees_task_id")
                            .from(TaskAssignees::Table, TaskAssignees::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_assignees_task_id")
                    .table(TaskAssignees::Table)
                    .col(TaskAssignees::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_task_assignees_task_id_email")
                    .table(TaskAssignees::Table)
                    .col(TaskAssignees::TaskId)
                    .col(TaskAssignees::AssigneeEmail)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(Meetings::Table)
                    .col(pk_id_col(manager, Meetings::Id))
                    .col(uuid_col(Meetings::Uuid))
                    .col(ColumnDef::new(Meetings::Title).string().not_null())
                    .col(ColumnDef::new(Meetings::DateTime).timestamp().not_null())
                    .col(
                        ColumnDef::new(Meetings::Status)
                            .string_len(32)
                            .not_null()
                            .default(Expr::val("Scheduled")),
                    )
                    .col(ColumnDef::new(Meetings::MeetingLink).string())
                    .col(ColumnDef::new(Meetings::Notes).text())
                    .col(fk_id_nullable_col(manager, Meetings::CrmEntryId))
                    .col(ColumnDef::new(Meetings::AssignedTo).string())
                    .col(timestamp_col(Meetings::CreatedAt))
                    .col(ColumnDef::new(Meetings::LastUpdatedBy).string())
                    .col(timestamp_col(Meetings::LastUpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_meetings_crm_entry_id")
                            .from(Meetings::Table, Meetings::CrmEntryId)
                            .to(CrmEntries::Table, CrmEntries::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_meetings_uuid")
                    .table(Meetings::Table)
                    .col(Meetings::Uuid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_meetings_crm_entry_id")
                    .table(Meetings::Table)
                    .col(Meetings::CrmEntryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create().if_not_exists()
                    .table(PasswordOtps::Table)
                    .col(pk_id_col(manager, PasswordOtps::Id))
                    .col(ColumnDef::new(PasswordOtps::Email).string().not_null())
                    .col(ColumnDef::new(PasswordOtps::OtpCode).string_len(16).not_null())
                    .col(ColumnDef::new(PasswordOtps::ExpiresAt).timestamp().not_null())
                    .col(timestamp_col(PasswordOtps::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create().if_not_exists()
                    .name("idx_password_otps_email")
                    .table(PasswordOtps::Table)
                    .col(PasswordOtps::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordOtps::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Meetings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaskAssignees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CrmEntries::Table).to_owned())
            .await?;
        Ok(())
    }
}

fn pk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().auto_increment().primary_key().to_owned()
}

fn fk_id_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.not_null().to_owned()
}

fn fk_id_nullable_col<T: Iden>(manager: &SchemaManager, col: T) -> ColumnDef {
    let mut col = ColumnDef::new(col);
    match manager.get_database_backend() {
        DatabaseBackend::Sqlite => {
            col.integer();
        }
        _ => {
            col.big_integer();
        }
    }
    col.to_owned()
}

fn uuid_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col).uuid().not_null().to_owned()
}

fn timestamp_col<T: Iden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(Iden)]
enum CrmEntries {
    Table,
    Id,
    Uuid,
    Company,
    ContactName,
    Email,
    Phone,
    Address,
    CompanyImageUrl,
    Status,
    DealValue,
    AssignedTo,
    NextFollowUp,
    LastContact,
    ReferenceId,
    Notes,
    Tags,
    Work,
    LeadSources,
    DriveLink,
    Socials,
    CreatedAt,
    LastUpdatedBy,
    LastUpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Uuid,
    Name,
    Email,
    PasswordHash,
    Role,
    TasksCompleted,
    GoogleId,
    AvatarUrl,
    ClientCrmId,
    CreatedAt,
}

#[derive(Iden)]
enum Tasks {
    Table,
    Id,
    Uuid,
    Title,
    Description,
    Status,
    Priority,
    AssignedTo,
    DueDate,
    CompanyId,
    TaskType,
    Attachments,
    TaskLink,
    IsVisibleOnMainBoard,
    CreatedAt,
    LastUpdatedBy,
    LastUpdatedAt,
}

#[derive(Iden)]
enum TaskAssignees {
    Table,
    Id,
    TaskId,
    AssigneeEmail,
    AssigneeName,
    AssignedAt,
}

#[derive(Iden)]
enum Meetings {
    Table,
    Id,
    Uuid,
    Title,
    DateTime,
    Status,
    MeetingLink,
    Notes,
    CrmEntryId,
    AssignedTo,
    CreatedAt,
    LastUpdatedBy,
    LastUpdatedAt,
}

#[derive(Iden)]
enum PasswordOtps {
    Table,
    Id,
    Email,
    OtpCode,
    ExpiresAt,
    CreatedAt,
}
