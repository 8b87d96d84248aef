use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{MovementFilter, MovementList, RecordMovementRequest},
    entity::inventory_movements::MovementType,
    error::AppResult,
    middleware::auth::AuthUser,
    models::{InventoryMovement, ProductStock},
    pagination::PageQuery,
    response::ApiResponse,
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movements))
        .route("/entry", post(record_entry))
        .route("/exit", post(record_exit))
        .route("/adjustment", post(record_adjustment))
        .route("/loss", post(record_loss))
        .route("/product/{product_id}", get(list_product_movements))
        .route("/product/{product_id}/stock", get(product_stock))
        .route("/{id}", get(get_movement))
}

type Created = AppResult<(StatusCode, Json<ApiResponse<InventoryMovement>>)>;

async fn record(
    state: AppState,
    user: AuthUser,
    kind: MovementType,
    payload: RecordMovementRequest,
) -> Created {
    let resp = inventory_service::record_movement(&state, &user, kind, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    params(PageQuery, MovementFilter),
    responses(
        (status = 200, description = "All movements", body = ApiResponse<MovementList>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<ApiResponse<MovementList>>> {
    let resp = inventory_service::list_movements(&state, &user, query, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory/entry",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Stock entry recorded", body = ApiResponse<InventoryMovement>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn record_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Created {
    record(state, user, MovementType::Entry, payload).await
}

#[utoipa::path(
    post,
    path = "/api/inventory/exit",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Stock exit recorded", body = ApiResponse<InventoryMovement>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn record_exit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Created {
    record(state, user, MovementType::Exit, payload).await
}

#[utoipa::path(
    post,
    path = "/api/inventory/adjustment",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Adjustment recorded", body = ApiResponse<InventoryMovement>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn record_adjustment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Created {
    record(state, user, MovementType::Adjustment, payload).await
}

#[utoipa::path(
    post,
    path = "/api/inventory/loss",
    request_body = RecordMovementRequest,
    responses(
        (status = 201, description = "Loss recorded", body = ApiResponse<InventoryMovement>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn record_loss(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordMovementRequest>,
) -> Created {
    record(state, user, MovementType::Loss, payload).await
}

#[utoipa::path(
    get,
    path = "/api/inventory/product/{product_id}",
    params(
        ("product_id" = Uuid, Path, description = "Product ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Movements of one product", body = ApiResponse<MovementList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_product_movements(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<MovementList>>> {
    let resp = inventory_service::list_product_movements(&state, product_id, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/product/{product_id}/stock",
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Current stock", body = ApiResponse<ProductStock>),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn product_stock(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductStock>>> {
    let resp = inventory_service::product_stock(&state, product_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Movement ID")),
    responses(
        (status = 200, description = "Movement", body = ApiResponse<InventoryMovement>),
        (status = 404, description = "Movement not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn get_movement(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryMovement>>> {
    let resp = inventory_service::get_movement(&state, id).await?;
    Ok(Json(resp))
}
