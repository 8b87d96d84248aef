use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_tables::{create_from_entity, create_index, drop_table};
use crate::entity::{delivery_notes, incidents, suppliers};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250201_000002_create_logistics_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_from_entity(manager, suppliers::Entity).await?;
        create_from_entity(manager, incidents::Entity).await?;
        create_from_entity(manager, delivery_notes::Entity).await?;

        create_index(
            manager,
            "idx_suppliers_name",
            suppliers::Entity,
            suppliers::Column::Name,
        )
        .await?;
        create_index(
            manager,
            "idx_incidents_order_id",
            incidents::Entity,
            incidents::Column::OrderId,
        )
        .await?;
        create_index(
            manager,
            "idx_incidents_status",
            incidents::Entity,
            incidents::Column::Status,
        )
        .await?;
        create_index(
            manager,
            "idx_delivery_notes_order_id",
            delivery_notes::Entity,
            delivery_notes::Column::OrderId,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, delivery_notes::Entity).await?;
        drop_table(manager, incidents::Entity).await?;
        drop_table(manager, suppliers::Entity).await?;
        Ok(())
    }
}
