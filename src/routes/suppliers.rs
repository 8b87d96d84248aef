use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::suppliers::{
        CreateSupplierRequest, SupplierFilter, SupplierList, SupplierSearch, UpdateSupplierRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Supplier,
    pagination::PageQuery,
    response::ApiResponse,
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/search", get(search_suppliers))
        .route(
            "/{id}",
            get(get_supplier)
                .put(update_supplier)
                .patch(deactivate_supplier)
                .delete(deactivate_supplier),
        )
        .route("/{id}/hard", delete(delete_supplier))
}

#[utoipa::path(
    get,
    path = "/api/suppliers",
    params(PageQuery, SupplierFilter),
    responses(
        (status = 200, description = "Suppliers", body = ApiResponse<SupplierList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<PageQuery>,
    Query(filter): Query<SupplierFilter>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let resp = supplier_service::list_suppliers(&state, query, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/search",
    params(SupplierSearch),
    responses(
        (status = 200, description = "Up to 20 matches ordered by name", body = ApiResponse<SupplierList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn search_suppliers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(search): Query<SupplierSearch>,
) -> AppResult<Json<ApiResponse<SupplierList>>> {
    let resp = supplier_service::search_suppliers(&state, search.q.as_deref()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier", body = ApiResponse<Supplier>),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::get_supplier(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = ApiResponse<Supplier>),
        (status = 409, description = "Duplicate email or tax id")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Supplier>>)> {
    let resp = supplier_service::create_supplier(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated", body = ApiResponse<Supplier>),
        (status = 409, description = "Duplicate email or tax id")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::update_supplier(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier deactivated", body = ApiResponse<Supplier>)
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Supplier>>> {
    let resp = supplier_service::deactivate_supplier(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}/hard",
    params(("id" = Uuid, Path, description = "Supplier ID")),
    responses(
        (status = 200, description = "Supplier removed"),
        (status = 403, description = "Superadmins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = supplier_service::delete_supplier(&state, &user, id).await?;
    Ok(Json(resp))
}
