use chrono::Utc;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::inventory::{MovementFilter, MovementList, RecordMovementRequest},
    entity::{
        inventory_movements::{
            self, ActiveModel as MovementActive, Column as MovementCol, Entity as Movements,
            MovementType,
        },
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{InventoryMovement, ProductStock},
    pagination::{Filters, PageQuery, paginate},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{field_error, invalid},
};

/// Append-only stock ledger for products.
///
/// Stock is never stored; it is the sum of a product's movements, so
/// concurrent writers only ever insert and cannot lose an update. Reading
/// it costs one aggregate over the product's history.
pub struct InventoryLedger<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> InventoryLedger<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn record_entry(
        &self,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
        user_id: Option<Uuid>,
    ) -> AppResult<inventory_movements::Model> {
        self.record(MovementType::Entry, product_id, quantity, reason, user_id, None)
            .await
    }

    /// `quantity` is the positive amount taken out.
    pub async fn record_exit(
        &self,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
        user_id: Option<Uuid>,
    ) -> AppResult<inventory_movements::Model> {
        self.record(MovementType::Exit, product_id, quantity, reason, user_id, None)
            .await
    }

    /// Stored as given; the sign is the caller's.
    pub async fn record_adjustment(
        &self,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
        user_id: Option<Uuid>,
    ) -> AppResult<inventory_movements::Model> {
        self.record(MovementType::Adjustment, product_id, quantity, reason, user_id, None)
            .await
    }

    pub async fn record_loss(
        &self,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
        user_id: Option<Uuid>,
    ) -> AppResult<inventory_movements::Model> {
        self.record(MovementType::Loss, product_id, quantity, reason, user_id, None)
            .await
    }

    /// Writes one movement row. Nothing stops stock from going negative.
    pub async fn record(
        &self,
        kind: MovementType,
        product_id: Uuid,
        quantity: i32,
        reason: Option<String>,
        user_id: Option<Uuid>,
        notes: Option<String>,
    ) -> AppResult<inventory_movements::Model> {
        let stored = kind
            .signed(quantity)
            .ok_or_else(|| field_error("quantity", invalid("range", "is out of range")))?;
        let movement = MovementActive {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            movement_type: Set(kind),
            quantity: Set(stored),
            reason: Set(reason),
            user_id: Set(user_id),
            notes: Set(notes),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.conn)
        .await?;

        tracing::info!(
            movement_id = %movement.id,
            %product_id,
            kind = %kind.to_value(),
            quantity = movement.quantity,
            "inventory movement recorded"
        );
        Ok(movement)
    }

    /// Sum of every movement for the product; zero when there are none.
    pub async fn current_stock(&self, product_id: Uuid) -> AppResult<i64> {
        let stock = Movements::find()
            .select_only()
            .column_as(MovementCol::Quantity.sum(), "stock")
            .filter(MovementCol::ProductId.eq(product_id))
            .into_tuple::<Option<i64>>()
            .one(self.conn)
            .await?
            .flatten()
            .unwrap_or(0);
        Ok(stock)
    }
}

fn default_reason(kind: MovementType) -> &'static str {
    match kind {
        MovementType::Entry => "Manual entry",
        MovementType::Exit => "Manual exit",
        MovementType::Adjustment => "Manual adjustment",
        MovementType::Loss => "Manual loss",
    }
}

fn action_for(kind: MovementType) -> &'static str {
    match kind {
        MovementType::Entry => "inventory_entry",
        MovementType::Exit => "inventory_exit",
        MovementType::Adjustment => "inventory_adjustment",
        MovementType::Loss => "inventory_loss",
    }
}

/// Validates and records a movement on behalf of an admin. The acting user
/// defaults to the caller.
pub async fn record_movement(
    state: &AppState,
    user: &AuthUser,
    kind: MovementType,
    payload: RecordMovementRequest,
) -> AppResult<ApiResponse<InventoryMovement>> {
    ensure_admin(user)?;
    payload.validate_for(kind)?;

    let reason = payload
        .reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| default_reason(kind).to_string());
    let actor = payload.user_id.unwrap_or(user.user_id);

    let movement = InventoryLedger::new(&state.orm)
        .record(
            kind,
            payload.product_id,
            payload.quantity,
            Some(reason),
            Some(actor),
            payload.notes,
        )
        .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        action_for(kind),
        "inventory_movements",
        serde_json::json!({
            "movement_id": movement.id,
            "product_id": movement.product_id,
            "quantity": movement.quantity,
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Movement recorded",
        InventoryMovement::from(movement),
        None,
    ))
}

pub async fn list_movements(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
    filter: MovementFilter,
) -> AppResult<ApiResponse<MovementList>> {
    ensure_admin(user)?;

    let mut filters: Filters<Movements> = Vec::new();
    if let Some(kind) = filter.movement_type {
        filters.push((MovementCol::MovementType, kind.into_value().into()));
    }

    let page = paginate::<Movements, _>(&state.orm, &query, filters)
        .await?
        .map(InventoryMovement::from);

    Ok(ApiResponse::success(
        "Ok",
        MovementList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn list_product_movements(
    state: &AppState,
    product_id: Uuid,
    query: PageQuery,
) -> AppResult<ApiResponse<MovementList>> {
    let page = paginate::<Movements, _>(
        &state.orm,
        &query,
        vec![(MovementCol::ProductId, product_id.into())],
    )
    .await?
    .map(InventoryMovement::from);

    Ok(ApiResponse::success(
        "Ok",
        MovementList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn get_movement(
    state: &AppState,
    id: Uuid,
) -> AppResult<ApiResponse<InventoryMovement>> {
    let movement = Movements::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Ok",
        InventoryMovement::from(movement),
        Some(Meta::empty()),
    ))
}

/// Current stock of an existing product.
pub async fn product_stock(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductStock>> {
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let stock = InventoryLedger::new(&state.orm)
        .current_stock(product_id)
        .await?;

    Ok(ApiResponse::success(
        "Ok",
        ProductStock { product_id, stock },
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_default_reason() {
        assert_eq!(default_reason(MovementType::Exit), "Manual exit");
        assert_eq!(default_reason(MovementType::Loss), "Manual loss");
        assert_eq!(action_for(MovementType::Adjustment), "inventory_adjustment");
    }
}
