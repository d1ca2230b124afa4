use sea_orm::JsonValue;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crm_entries")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub uuid: Uuid,
    pub company: String,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company_image_url: Option<String>,
    pub status: Option<String>,
    pub deal_value: Option<f64>,
    pub assigned_to: Option<String>,
    pub next_follow_up: Option<Date>,
    pub last_contact: Option<Date>,
    pub reference_id: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<JsonValue>,
    pub work: Option<JsonValue>,
    pub lead_sources: Option<JsonValue>,
    pub drive_link: Option<String>,
    pub socials: Option<JsonValue>,
    pub created_at: DateTimeUtc,
    pub last_updated_by: Option<String>,
    pub last_updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
