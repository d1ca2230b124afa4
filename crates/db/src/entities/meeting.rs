use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "meetings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub title: String,
    pub date_time: DateTimeUtc,
    pub status: String,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub crm_entry_id: Option<i64>,
    pub assigned_to: Option<String>,
    pub created_at: DateTimeUtc,
    pub last_updated_by: Option<String>,
    pub last_updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
