use sea_orm::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = WarehouseSupplyLog)]
#[sea_orm(table_name = "warehouse_supply_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub supply_id: Uuid,
    pub change_amount: i32,
    pub comment: Option<String>,
    pub operator_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::warehouse_supply::Entity",
        from = "Column::SupplyId",
        to = "super::warehouse_supply::Column::Id"
    )]
    Supply,
}

impl Related<super::warehouse_supply::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supply.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
