use sea_orm::entity::prelude::*;
use serde::Serialize;

/// One farmer's pledge inside a pool. A farmer appears at most once per pool;
/// the join path checks for an existing row inside the same transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "group_buy_participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(indexed)]
    pub pool_id: i32,
    pub farmer_id: i32,
    pub quantity: i32,
    pub joined_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entities::group_buy_pool::Entity",
        from = "Column::PoolId",
        to = "crate::entities::group_buy_pool::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Pool,
    #[sea_orm(
        belongs_to = "crate::entities::user::Entity",
        from = "Column::FarmerId",
        to = "crate::entities::user::Column::Id"
    )]
    Farmer,
}

impl Related<crate::entities::group_buy_pool::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pool.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
