use chrono::{DateTime, Utc};
use sea_orm::{ActiveEnum, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::delivery_notes::{
        CreateDeliveryNoteRequest, DeliveryNoteFilter, DeliveryNoteList, UpdateDeliveryNoteRequest,
        UpdateDeliveryStatusRequest,
    },
    entity::delivery_notes::{self, ActiveModel, Column, DeliveryStatus, Entity as DeliveryNotes},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin, ensure_superadmin},
    models::DeliveryNote,
    pagination::{Filters, PageQuery, paginate},
    response::{ApiResponse, Meta},
    services::order_service::OrderWorkflow,
    state::AppState,
};

async fn find_note(state: &AppState, id: Uuid) -> AppResult<delivery_notes::Model> {
    DeliveryNotes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn number_taken(state: &AppState, note_number: &str) -> AppResult<bool> {
    Ok(DeliveryNotes::find()
        .filter(Column::NoteNumber.eq(note_number))
        .one(&state.orm)
        .await?
        .is_some())
}

/// A note marked delivered without a date is stamped with `now`.
fn delivery_date(
    status: DeliveryStatus,
    recorded: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (status, recorded) {
        (DeliveryStatus::Delivered, None) => Some(now),
        (_, recorded) => recorded,
    }
}

pub async fn list_delivery_notes(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
    filter: DeliveryNoteFilter,
) -> AppResult<ApiResponse<DeliveryNoteList>> {
    ensure_admin(user)?;

    let mut filters: Filters<DeliveryNotes> = Vec::new();
    if let Some(status) = filter.status {
        filters.push((Column::Status, status.into_value().into()));
    }

    let page = paginate::<DeliveryNotes, _>(&state.orm, &query, filters)
        .await?
        .map(DeliveryNote::from);

    Ok(ApiResponse::success(
        "Delivery notes",
        DeliveryNoteList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn get_delivery_note(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<DeliveryNote>> {
    let note = find_note(state, id).await?;
    if !user.is_admin() {
        let order = OrderWorkflow::from_state(state).find(note.order_id).await?;
        ensure_self_or_admin(user, order.user_id)?;
    }
    Ok(ApiResponse::success(
        "Delivery note",
        DeliveryNote::from(note),
        Some(Meta::empty()),
    ))
}

/// Newest first.
pub async fn list_delivery_notes_by_order(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
) -> AppResult<ApiResponse<DeliveryNoteList>> {
    let order = OrderWorkflow::from_state(state).find(order_id).await?;
    ensure_self_or_admin(user, order.user_id)?;

    let items = DeliveryNotes::find()
        .filter(Column::OrderId.eq(order_id))
        .order_by_desc(Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DeliveryNote::from)
        .collect();

    Ok(ApiResponse::success(
        "Delivery notes",
        DeliveryNoteList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_delivery_note(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDeliveryNoteRequest,
) -> AppResult<ApiResponse<DeliveryNote>> {
    ensure_admin(user)?;
    payload.validate()?;

    let order = OrderWorkflow::from_state(state).find(payload.order_id).await?;
    let note_number = payload.note_number.trim().to_string();
    if number_taken(state, &note_number).await? {
        return Err(AppError::Conflict(
            "Delivery note number already exists".into(),
        ));
    }

    let now = Utc::now();
    let status = payload.status.unwrap_or_default();
    let note = ActiveModel {
        id: Set(Uuid::new_v4()),
        note_number: Set(note_number),
        order_id: Set(order.id),
        status: Set(status),
        carrier: Set(payload.carrier.trim().to_string()),
        tracking_number: Set(payload.tracking_number),
        delivered_at: Set(delivery_date(status, payload.delivered_at, now).map(Into::into)),
        notes: Set(payload.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(
        note_id = %note.id,
        note_number = %note.note_number,
        order_id = %note.order_id,
        "delivery note created"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "delivery_note_create",
        "delivery_notes",
        serde_json::json!({ "note_id": note.id, "order_id": note.order_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Delivery note created",
        DeliveryNote::from(note),
        None,
    ))
}

pub async fn update_delivery_note(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDeliveryNoteRequest,
) -> AppResult<ApiResponse<DeliveryNote>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_note(state, id).await?;
    let mut active: ActiveModel = existing.into();
    if let Some(carrier) = payload.carrier {
        active.carrier = Set(carrier.trim().to_string());
    }
    if let Some(tracking) = payload.tracking_number {
        active.tracking_number = Set(Some(tracking));
    }
    if let Some(at) = payload.delivered_at {
        active.delivered_at = Set(Some(at.into()));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "delivery_note_update",
        "delivery_notes",
        serde_json::json!({ "note_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Delivery note updated",
        DeliveryNote::from(updated),
        None,
    ))
}

/// Any status may replace any other; delivery notes have no lifecycle graph.
pub async fn update_delivery_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDeliveryStatusRequest,
) -> AppResult<ApiResponse<DeliveryNote>> {
    ensure_admin(user)?;

    let existing = find_note(state, id).await?;
    let from = existing.status;
    let now = Utc::now();
    let delivered_at = delivery_date(
        payload.status,
        existing.delivered_at.map(|at| at.with_timezone(&Utc)),
        now,
    );

    let mut active: ActiveModel = existing.into();
    active.status = Set(payload.status);
    active.delivered_at = Set(delivered_at.map(Into::into));
    active.updated_at = Set(now.into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(
        note_id = %updated.id,
        from = %from.to_value(),
        to = %updated.status.to_value(),
        "delivery status changed"
    );
    audit::record(
        &state.orm,
        Some(user.user_id),
        "delivery_note_status",
        "delivery_notes",
        serde_json::json!({ "note_id": updated.id, "status": updated.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Delivery status updated",
        DeliveryNote::from(updated),
        None,
    ))
}

pub async fn delete_delivery_note(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let result = DeliveryNotes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(note_id = %id, "delivery note deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "delivery_note_delete",
        "delivery_notes",
        serde_json::json!({ "note_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Delivery note deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_notes_get_a_date() {
        let now = Utc::now();
        let earlier = now - chrono::Duration::days(1);
        assert_eq!(delivery_date(DeliveryStatus::Delivered, None, now), Some(now));
        assert_eq!(
            delivery_date(DeliveryStatus::Delivered, Some(earlier), now),
            Some(earlier)
        );
        assert_eq!(delivery_date(DeliveryStatus::InProgress, None, now), None);
        assert_eq!(
            delivery_date(DeliveryStatus::Failed, Some(earlier), now),
            Some(earlier)
        );
    }
}
