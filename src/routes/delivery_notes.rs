use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::delivery_notes::{
        CreateDeliveryNoteRequest, DeliveryNoteFilter, DeliveryNoteList, UpdateDeliveryNoteRequest,
        UpdateDeliveryStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::DeliveryNote,
    pagination::PageQuery,
    response::ApiResponse,
    services::delivery_note_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_delivery_notes).post(create_delivery_note))
        .route("/order/{order_id}", get(list_delivery_notes_by_order))
        .route(
            "/{id}",
            get(get_delivery_note)
                .put(update_delivery_note)
                .delete(delete_delivery_note),
        )
        .route("/{id}/status", patch(update_delivery_status))
}

#[utoipa::path(
    get,
    path = "/api/delivery-notes",
    params(PageQuery, DeliveryNoteFilter),
    responses(
        (status = 200, description = "All delivery notes", body = ApiResponse<DeliveryNoteList>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn list_delivery_notes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
    Query(filter): Query<DeliveryNoteFilter>,
) -> AppResult<Json<ApiResponse<DeliveryNoteList>>> {
    let resp = delivery_note_service::list_delivery_notes(&state, &user, query, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery-notes/order/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Delivery notes of the order, newest first", body = ApiResponse<DeliveryNoteList>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn list_delivery_notes_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeliveryNoteList>>> {
    let resp = delivery_note_service::list_delivery_notes_by_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/delivery-notes/{id}",
    params(("id" = Uuid, Path, description = "Delivery note ID")),
    responses(
        (status = 200, description = "Delivery note", body = ApiResponse<DeliveryNote>),
        (status = 404, description = "Delivery note not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn get_delivery_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<DeliveryNote>>> {
    let resp = delivery_note_service::get_delivery_note(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/delivery-notes",
    request_body = CreateDeliveryNoteRequest,
    responses(
        (status = 201, description = "Delivery note created", body = ApiResponse<DeliveryNote>),
        (status = 409, description = "Duplicate note number")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn create_delivery_note(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDeliveryNoteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<DeliveryNote>>)> {
    let resp = delivery_note_service::create_delivery_note(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/delivery-notes/{id}",
    params(("id" = Uuid, Path, description = "Delivery note ID")),
    request_body = UpdateDeliveryNoteRequest,
    responses(
        (status = 200, description = "Delivery note updated", body = ApiResponse<DeliveryNote>)
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn update_delivery_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDeliveryNoteRequest>,
) -> AppResult<Json<ApiResponse<DeliveryNote>>> {
    let resp = delivery_note_service::update_delivery_note(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/delivery-notes/{id}/status",
    params(("id" = Uuid, Path, description = "Delivery note ID")),
    request_body = UpdateDeliveryStatusRequest,
    responses(
        (status = 200, description = "Delivery status updated", body = ApiResponse<DeliveryNote>)
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDeliveryStatusRequest>,
) -> AppResult<Json<ApiResponse<DeliveryNote>>> {
    let resp = delivery_note_service::update_delivery_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/delivery-notes/{id}",
    params(("id" = Uuid, Path, description = "Delivery note ID")),
    responses(
        (status = 200, description = "Delivery note deleted"),
        (status = 403, description = "Superadmins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Delivery notes"
)]
pub async fn delete_delivery_note(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = delivery_note_service::delete_delivery_note(&state, &user, id).await?;
    Ok(Json(resp))
}
