use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::entities::{crm_entry, task};

pub async fn crm_entry_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    crm_entry::Entity::find()
        .select_only()
        .column(crm_entry::Column::Id)
        .filter(crm_entry::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}

pub async fn crm_entry_uuid_by_id<C: ConnectionTrait>(
    db: &C,
    id: i64,
) -> Result<Option<Uuid>, DbErr> {
    crm_entry::Entity::find()
        .select_only()
        .column(crm_entry::Column::Uuid)
        .filter(crm_entry::Column::Id.eq(id))
        .into_tuple()
        .one(db)
        .await
}

pub async fn task_id_by_uuid<C: ConnectionTrait>(
    db: &C,
    uuid: Uuid,
) -> Result<Option<i64>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Id)
        .filter(task::Column::Uuid.eq(uuid))
        .into_tuple()
        .one(db)
        .await
}
