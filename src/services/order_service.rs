use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    audit,
    config::OrderPolicy,
    db::with_transaction,
    dto::orders::{
        CreateOrderRequest, CreateOrderWithItemsRequest, OrderFilter, OrderItemInput, OrderList,
        OrderWithItems, UpdateOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        order_items::{
            self, ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{self, ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, OrderStatus},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin, ensure_superadmin},
    models::{Order, OrderItem},
    pagination::{Filters, PageQuery, paginate},
    response::{ApiResponse, Meta},
    state::AppState,
    validation::{field_error, invalid},
};

/// Order lifecycle operations over one connection.
///
/// Cheap to build; construct one per request from the shared state.
pub struct OrderWorkflow<'a> {
    conn: &'a DatabaseConnection,
    policy: OrderPolicy,
}

impl<'a> OrderWorkflow<'a> {
    pub fn new(conn: &'a DatabaseConnection, policy: OrderPolicy) -> Self {
        Self { conn, policy }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.orm, state.config.order_policy)
    }

    /// Inserts an order header on its own.
    pub async fn create(&self, header: CreateOrderRequest) -> AppResult<orders::Model> {
        let order = new_order(Uuid::new_v4(), header, Utc::now())
            .insert(self.conn)
            .await?;
        tracing::info!(order_id = %order.id, order_number = %order.order_number, "order created");
        Ok(order)
    }

    /// Inserts the header and every line in one transaction. Any failed
    /// insert (duplicate number, unknown product) rolls the whole order back.
    ///
    /// An empty `items` list is not rejected here.
    pub async fn create_with_items(
        &self,
        header: CreateOrderRequest,
        items: Vec<OrderItemInput>,
    ) -> AppResult<(orders::Model, Vec<order_items::Model>)> {
        if self.policy.verify_totals {
            check_total(header.total_amount, &items)?;
        }

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let order = new_order(order_id, header, now);
        let lines: Vec<OrderItemActive> = items
            .iter()
            .map(|item| new_item(order_id, item, now))
            .collect();

        let (order, lines) = with_transaction(self.conn, move |txn| {
            Box::pin(async move {
                let order = order.insert(txn).await?;
                let mut saved = Vec::with_capacity(lines.len());
                for line in lines {
                    saved.push(line.insert(txn).await?);
                }
                Ok((order, saved))
            })
        })
        .await?;

        tracing::info!(
            order_id = %order.id,
            order_number = %order.order_number,
            items = lines.len(),
            "order created with items"
        );
        Ok((order, lines))
    }

    pub async fn find(&self, id: Uuid) -> AppResult<orders::Model> {
        Orders::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Looks an order up by its human-readable number.
    pub async fn find_by_number(&self, order_number: &str) -> AppResult<orders::Model> {
        Orders::find()
            .filter(OrderCol::OrderNumber.eq(order_number.trim()))
            .one(self.conn)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn find_with_items(
        &self,
        id: Uuid,
    ) -> AppResult<(orders::Model, Vec<order_items::Model>)> {
        let order = self.find(id).await?;
        self.attach_items(order).await
    }

    async fn attach_items(
        &self,
        order: orders::Model,
    ) -> AppResult<(orders::Model, Vec<order_items::Model>)> {
        let items = order
            .find_related(OrderItems)
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(self.conn)
            .await?;
        Ok((order, items))
    }

    /// Any status may replace any other unless strict transitions are on.
    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> AppResult<orders::Model> {
        let existing = self.find(id).await?;
        let from = existing.status;
        if self.policy.strict_transitions && !from.can_transition_to(status) {
            return Err(AppError::InvalidTransition { from, to: status });
        }

        let mut active: OrderActive = existing.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().into());
        let order = active.update(self.conn).await?;

        tracing::info!(order_id = %order.id, %from, to = %status, "order status changed");
        Ok(order)
    }

    pub async fn cancel(&self, id: Uuid) -> AppResult<orders::Model> {
        self.update_status(id, OrderStatus::Cancelled).await
    }
}

fn new_order(id: Uuid, header: CreateOrderRequest, now: DateTime<Utc>) -> OrderActive {
    OrderActive {
        id: Set(id),
        order_number: Set(header.order_number.trim().to_string()),
        user_id: Set(header.user_id),
        status: Set(OrderStatus::Pending),
        total_amount: Set(header.total_amount),
        notes: Set(header.notes),
        delivery_address: Set(header.delivery_address),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

pub(crate) fn new_item(order_id: Uuid, item: &OrderItemInput, now: DateTime<Utc>) -> OrderItemActive {
    OrderItemActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(item.product_id),
        quantity: Set(item.quantity),
        unit_price: Set(item.unit_price),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

fn check_total(total_amount: i64, items: &[OrderItemInput]) -> Result<(), ValidationErrors> {
    let expected = items.iter().try_fold(0i64, |acc, item| {
        item.line_total().and_then(|line| acc.checked_add(line))
    });
    match expected {
        Some(expected) if expected == total_amount => Ok(()),
        Some(expected) => Err(field_error(
            "total_amount",
            invalid("mismatch", format!("must equal the sum of the items ({expected})")),
        )),
        None => Err(field_error(
            "total_amount",
            invalid("overflow", "the sum of the items is out of range"),
        )),
    }
}

fn with_items(order: orders::Model, items: Vec<order_items::Model>) -> OrderWithItems {
    OrderWithItems {
        order: Order::from(order),
        items: items.into_iter().map(OrderItem::from).collect(),
    }
}

pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_self_or_admin(user, payload.user_id)?;
    payload.validate()?;

    let order = OrderWorkflow::from_state(state).create(payload).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "order_number": order.order_number }),
    )
    .await;

    Ok(ApiResponse::success("Order created", Order::from(order), None))
}

pub async fn create_order_with_items(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderWithItemsRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    ensure_self_or_admin(user, payload.order.user_id)?;
    payload.validate()?;

    let (order, items) = OrderWorkflow::from_state(state)
        .create_with_items(payload.order, payload.items)
        .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({
            "order_id": order.id,
            "order_number": order.order_number,
            "items": items.len(),
        }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        with_items(order, items),
        None,
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let (order, items) = OrderWorkflow::from_state(state).find_with_items(id).await?;
    ensure_self_or_admin(user, order.user_id)?;
    Ok(ApiResponse::success(
        "Ok",
        with_items(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn get_order_by_number(
    state: &AppState,
    user: &AuthUser,
    order_number: &str,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let workflow = OrderWorkflow::from_state(state);
    let order = workflow.find_by_number(order_number).await?;
    ensure_self_or_admin(user, order.user_id)?;
    let (order, items) = workflow.attach_items(order).await?;
    Ok(ApiResponse::success(
        "Ok",
        with_items(order, items),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
    filter: OrderFilter,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_admin(user)?;

    let mut filters: Filters<Orders> = Vec::new();
    if let Some(status) = filter.status {
        filters.push((OrderCol::Status, status.into_value().into()));
    }

    let page = paginate::<Orders, _>(&state.orm, &query, filters)
        .await?
        .map(Order::from);

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn list_orders_by_user(
    state: &AppState,
    user: &AuthUser,
    user_id: Uuid,
    query: PageQuery,
) -> AppResult<ApiResponse<OrderList>> {
    ensure_self_or_admin(user, user_id)?;

    let page = paginate::<Orders, _>(&state.orm, &query, vec![(OrderCol::UserId, user_id.into())])
        .await?
        .map(Order::from);

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn update_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = OrderWorkflow::from_state(state).find(id).await?;
    let mut active: OrderActive = existing.into();
    if let Some(total_amount) = payload.total_amount {
        active.total_amount = Set(total_amount);
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(delivery_address) = payload.delivery_address {
        active.delivery_address = Set(Some(delivery_address));
    }
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = %order.id, "order updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_update",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success("Order updated", Order::from(order), None))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;

    let order = OrderWorkflow::from_state(state)
        .update_status(id, payload.status)
        .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success("Order status updated", Order::from(order), None))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let workflow = OrderWorkflow::from_state(state);
    let existing = workflow.find(id).await?;
    ensure_self_or_admin(user, existing.user_id)?;

    let order = workflow.cancel(id).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success("Order cancelled", Order::from(order), None))
}

/// Removes the order; its items go with it through the cascade.
pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(order_id = %id, "order deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}
