use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::orders::{CreateOrderItemRequest, OrderItemInput, OrderItemList, UpdateOrderItemRequest},
    entity::{
        order_items::{self, ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{self, Entity as Orders},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin},
    models::OrderItem,
    response::{ApiResponse, Meta},
    services::order_service::new_item,
    state::AppState,
};

async fn find_order(state: &AppState, id: Uuid) -> AppResult<orders::Model> {
    Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn find_item(state: &AppState, id: Uuid) -> AppResult<order_items::Model> {
    OrderItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn list_order_items(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderItemList>> {
    let order = find_order(state, order_id).await?;
    ensure_self_or_admin(user, order.user_id)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderItemList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_order_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderItem>> {
    let item = find_item(state, id).await?;
    let order = find_order(state, item.order_id).await?;
    ensure_self_or_admin(user, order.user_id)?;
    Ok(ApiResponse::success(
        "Ok",
        OrderItem::from(item),
        Some(Meta::empty()),
    ))
}

/// Adds a line to an existing order. The order total is left as it was.
pub async fn create_order_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_admin(user)?;
    payload.validate()?;

    let order = find_order(state, payload.order_id).await?;
    let line = OrderItemInput {
        product_id: payload.product_id,
        quantity: payload.quantity,
        unit_price: payload.unit_price,
    };
    let item = new_item(order.id, &line, Utc::now())
        .insert(&state.orm)
        .await?;

    tracing::info!(order_id = %order.id, item_id = %item.id, "order item added");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_item_create",
        "order_items",
        serde_json::json!({ "order_id": order.id, "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success("Order item created", OrderItem::from(item), None))
}

pub async fn update_order_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderItemRequest,
) -> AppResult<ApiResponse<OrderItem>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_item(state, id).await?;
    let mut active: OrderItemActive = existing.into();
    if let Some(quantity) = payload.quantity {
        active.quantity = Set(quantity);
    }
    if let Some(unit_price) = payload.unit_price {
        active.unit_price = Set(unit_price);
    }
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_item_update",
        "order_items",
        serde_json::json!({ "item_id": item.id }),
    )
    .await;

    Ok(ApiResponse::success("Order item updated", OrderItem::from(item), None))
}

pub async fn delete_order_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = OrderItems::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_item_delete",
        "order_items",
        serde_json::json!({ "item_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order item deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}
