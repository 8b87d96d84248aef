use chrono::Utc;
use sea_orm::{ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::incidents::{
        CreateIncidentRequest, IncidentFilter, IncidentList, ResolveIncidentRequest,
        UpdateIncidentRequest,
    },
    entity::incidents::{self, ActiveModel, Column, Entity as Incidents, IncidentStatus},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin, ensure_superadmin},
    models::Incident,
    pagination::{Filters, PageQuery, paginate},
    response::{ApiResponse, Meta},
    services::order_service::OrderWorkflow,
    state::AppState,
};

async fn find_incident(state: &AppState, id: Uuid) -> AppResult<incidents::Model> {
    Incidents::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// The reporter, the owner of the order and admins may see an incident.
async fn ensure_can_view(
    state: &AppState,
    user: &AuthUser,
    incident: &incidents::Model,
) -> AppResult<()> {
    if user.is_admin() || incident.user_id == user.user_id {
        return Ok(());
    }
    let order = OrderWorkflow::from_state(state).find(incident.order_id).await?;
    ensure_self_or_admin(user, order.user_id)
}

pub async fn list_incidents(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
    filter: IncidentFilter,
) -> AppResult<ApiResponse<IncidentList>> {
    ensure_admin(user)?;

    let mut filters: Filters<Incidents> = Vec::new();
    if let Some(status) = filter.status {
        filters.push((Column::Status, status.into_value().into()));
    }
    if let Some(priority) = filter.priority {
        filters.push((Column::Priority, priority.into_value().into()));
    }

    let page = paginate::<Incidents, _>(&state.orm, &query, filters)
        .await?
        .map(Incident::from);

    Ok(ApiResponse::success(
        "Incidents",
        IncidentList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn get_incident(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Incident>> {
    let incident = find_incident(state, id).await?;
    ensure_can_view(state, user, &incident).await?;
    Ok(ApiResponse::success(
        "Incident",
        Incident::from(incident),
        Some(Meta::empty()),
    ))
}

/// Newest first.
pub async fn list_incidents_by_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<IncidentList>> {
    let order = OrderWorkflow::from_state(state).find(order_id).await?;
    ensure_self_or_admin(user, order.user_id)?;

    let items = Incidents::find()
        .filter(Column::OrderId.eq(order_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Incident::from)
        .collect();

    Ok(ApiResponse::success(
        "Incidents",
        IncidentList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_incident(
    state: &AppState,
    user: &AuthUser,
    payload: CreateIncidentRequest,
) -> AppResult<ApiResponse<Incident>> {
    payload.validate()?;
    let order = OrderWorkflow::from_state(state).find(payload.order_id).await?;
    ensure_self_or_admin(user, order.user_id)?;

    let now = Utc::now();
    let incident = ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        priority: Set(payload.priority.unwrap_or_default()),
        status: Set(IncidentStatus::Open),
        order_id: Set(order.id),
        user_id: Set(user.user_id),
        resolution: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(
        incident_id = %incident.id,
        order_id = %incident.order_id,
        priority = %incident.priority.to_value(),
        "incident reported"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "incident_create",
        "incidents",
        serde_json::json!({ "incident_id": incident.id, "order_id": incident.order_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Incident created",
        Incident::from(incident),
        None,
    ))
}

/// The reporter may edit the wording; only admins may move the status.
pub async fn update_incident(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateIncidentRequest,
) -> AppResult<ApiResponse<Incident>> {
    payload.validate()?;
    let existing = find_incident(state, id).await?;
    ensure_self_or_admin(user, existing.user_id)?;
    if payload.status.is_some() {
        ensure_admin(user)?;
    }

    let mut active: ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(priority) = payload.priority {
        active.priority = Set(priority);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "incident_update",
        "incidents",
        serde_json::json!({ "incident_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Incident updated",
        Incident::from(updated),
        None,
    ))
}

pub async fn resolve_incident(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ResolveIncidentRequest,
) -> AppResult<ApiResponse<Incident>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_incident(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.status = Set(IncidentStatus::Resolved);
    active.resolution = Set(Some(payload.resolution.trim().to_string()));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(incident_id = %updated.id, "incident resolved");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "incident_resolve",
        "incidents",
        serde_json::json!({ "incident_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Incident resolved",
        Incident::from(updated),
        None,
    ))
}

pub async fn delete_incident(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let result = Incidents::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(incident_id = %id, "incident deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "incident_delete",
        "incidents",
        serde_json::json!({ "incident_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Incident deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}
