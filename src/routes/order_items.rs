use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{CreateOrderItemRequest, UpdateOrderItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::OrderItem,
    response::ApiResponse,
    services::order_item_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_order_item)).route(
        "/{id}",
        get(get_order_item)
            .put(update_order_item)
            .delete(delete_order_item),
    )
}

#[utoipa::path(
    post,
    path = "/api/order-items",
    request_body = CreateOrderItemRequest,
    responses(
        (status = 201, description = "Item added", body = ApiResponse<OrderItem>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn create_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateOrderItemRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderItem>>)> {
    let resp = order_item_service::create_order_item(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/order-items/{id}",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Order item", body = ApiResponse<OrderItem>),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn get_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::get_order_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/order-items/{id}",
    params(("id" = Uuid, Path, description = "Order item ID")),
    request_body = UpdateOrderItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ApiResponse<OrderItem>)
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn update_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderItemRequest>,
) -> AppResult<Json<ApiResponse<OrderItem>>> {
    let resp = order_item_service::update_order_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/order-items/{id}",
    params(("id" = Uuid, Path, description = "Order item ID")),
    responses(
        (status = 200, description = "Item deleted")
    ),
    security(("bearer_auth" = [])),
    tag = "Order items"
)]
pub async fn delete_order_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = order_item_service::delete_order_item(&state, &user, id).await?;
    Ok(Json(resp))
}
