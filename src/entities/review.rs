use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Post-order review of a farmer. One review per order, enforced by the
/// unique column plus a check inside the recording transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub order_id: i32,
    pub reviewer_id: i32,
    #[sea_orm(indexed)]
    pub farmer_id: i32,
    pub rating: i32,
    pub product_quality: i32,
    pub communication: i32,
    pub delivery_speed: i32,
    #[sea_orm(column_type = "Text")]
    pub comment: String,
    #[sea_orm(default = true)]
    pub would_recommend: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::entities::order::Entity",
        from = "Column::OrderId",
        to = "crate::entities::order::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Order,
    #[sea_orm(
        belongs_to = "crate::entities::user::Entity",
        from = "Column::FarmerId",
        to = "crate::entities::user::Column::Id"
    )]
    Farmer,
}

impl Related<crate::entities::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
