use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    audit_logs, inventory_movements, order_items, orders, password_reset_tokens, products, users,
};

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250101_000001_create_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Parents before children so foreign keys resolve.
        create_from_entity(manager, users::Entity).await?;
        create_from_entity(manager, products::Entity).await?;
        create_from_entity(manager, orders::Entity).await?;
        create_from_entity(manager, order_items::Entity).await?;
        create_from_entity(manager, inventory_movements::Entity).await?;
        create_from_entity(manager, audit_logs::Entity).await?;
        create_from_entity(manager, password_reset_tokens::Entity).await?;

        create_index(manager, "idx_orders_status", orders::Entity, orders::Column::Status).await?;
        create_index(
            manager,
            "idx_orders_created_at",
            orders::Entity,
            orders::Column::CreatedAt,
        )
        .await?;
        create_index(
            manager,
            "idx_order_items_order_id",
            order_items::Entity,
            order_items::Column::OrderId,
        )
        .await?;
        create_index(
            manager,
            "idx_order_items_product_id",
            order_items::Entity,
            order_items::Column::ProductId,
        )
        .await?;
        create_index(
            manager,
            "idx_inventory_movements_product_id",
            inventory_movements::Entity,
            inventory_movements::Column::ProductId,
        )
        .await?;
        create_index(
            manager,
            "idx_inventory_movements_type",
            inventory_movements::Entity,
            inventory_movements::Column::MovementType,
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        drop_table(manager, password_reset_tokens::Entity).await?;
        drop_table(manager, audit_logs::Entity).await?;
        drop_table(manager, inventory_movements::Entity).await?;
        drop_table(manager, order_items::Entity).await?;
        drop_table(manager, orders::Entity).await?;
        drop_table(manager, products::Entity).await?;
        drop_table(manager, users::Entity).await?;
        Ok(())
    }
}

pub(super) async fn create_from_entity<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    entity: E,
) -> Result<(), DbErr> {
    let schema = Schema::new(manager.get_database_backend());
    manager
        .create_table(
            schema
                .create_table_from_entity(entity)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

pub(super) async fn create_index<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    name: &str,
    entity: E,
    column: E::Column,
) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .name(name)
                .table(entity)
                .col(column)
                .if_not_exists()
                .to_owned(),
        )
        .await
}

pub(super) async fn drop_table<E: EntityTrait>(manager: &SchemaManager<'_>, entity: E) -> Result<(), DbErr> {
    manager
        .drop_table(Table::drop().table(entity).if_exists().to_owned())
        .await
}
