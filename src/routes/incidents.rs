use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::incidents::{
        CreateIncidentRequest, IncidentFilter, IncidentList, ResolveIncidentRequest,
        UpdateIncidentRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::Incident,
    pagination::PageQuery,
    response::ApiResponse,
    services::incident_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_incidents).post(create_incident))
        .route("/order/{order_id}", get(list_incidents_by_order))
        .route(
            "/{id}",
            get(get_incident).put(update_incident).delete(delete_incident),
        )
        .route("/{id}/resolve", patch(resolve_incident))
}

#[utoipa::path(
    get,
    path = "/api/incidents",
    params(PageQuery, IncidentFilter),
    responses(
        (status = 200, description = "All incidents", body = ApiResponse<IncidentList>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn list_incidents(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
    Query(filter): Query<IncidentFilter>,
) -> AppResult<Json<ApiResponse<IncidentList>>> {
    let resp = incident_service::list_incidents(&state, &user, query, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/incidents/order/{order_id}",
    params(("order_id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Incidents of the order, newest first", body = ApiResponse<IncidentList>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn list_incidents_by_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<IncidentList>>> {
    let resp = incident_service::list_incidents_by_order(&state, &user, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Incident", body = ApiResponse<Incident>),
        (status = 404, description = "Incident not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn get_incident(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let resp = incident_service::get_incident(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/incidents",
    request_body = CreateIncidentRequest,
    responses(
        (status = 201, description = "Incident reported", body = ApiResponse<Incident>),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn create_incident(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateIncidentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Incident>>)> {
    let resp = incident_service::create_incident(&state, &user, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = UpdateIncidentRequest,
    responses(
        (status = 200, description = "Incident updated", body = ApiResponse<Incident>)
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn update_incident(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIncidentRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let resp = incident_service::update_incident(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/incidents/{id}/resolve",
    params(("id" = Uuid, Path, description = "Incident ID")),
    request_body = ResolveIncidentRequest,
    responses(
        (status = 200, description = "Incident resolved", body = ApiResponse<Incident>),
        (status = 403, description = "Admins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn resolve_incident(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveIncidentRequest>,
) -> AppResult<Json<ApiResponse<Incident>>> {
    let resp = incident_service::resolve_incident(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/incidents/{id}",
    params(("id" = Uuid, Path, description = "Incident ID")),
    responses(
        (status = 200, description = "Incident deleted"),
        (status = 403, description = "Superadmins only")
    ),
    security(("bearer_auth" = [])),
    tag = "Incidents"
)]
pub async fn delete_incident(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = incident_service::delete_incident(&state, &user, id).await?;
    Ok(Json(resp))
}
