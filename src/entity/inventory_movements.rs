use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    #[sea_orm(string_value = "ENTRY")]
    Entry,
    #[sea_orm(string_value = "EXIT")]
    Exit,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "LOSS")]
    Loss,
}

impl MovementType {
    /// Stored quantity for a caller-supplied amount. Exits and losses take
    /// stock away, so they are written negated; `None` when the negation
    /// does not fit in an i32.
    pub fn signed(self, quantity: i32) -> Option<i32> {
        match self {
            MovementType::Entry | MovementType::Adjustment => Some(quantity),
            MovementType::Exit | MovementType::Loss => quantity.checked_neg(),
        }
    }
}

/// Append-only ledger row; never updated once written.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub user_id: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_delete = "Restrict"
    )]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
