use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::users::{UpdateUserRequest, UserList},
    entity::users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_self_or_admin},
    models::User,
    pagination::{PageQuery, paginate},
    response::{ApiResponse, Meta},
    services::auth_service::normalize_email,
    state::AppState,
};

async fn find_user(state: &AppState, id: Uuid) -> AppResult<users::Model> {
    Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

/// Active users only.
pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: PageQuery,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;

    let page = paginate::<Users, _>(&state.orm, &query, vec![(UserCol::IsActive, true.into())])
        .await?
        .map(User::from);

    Ok(ApiResponse::success(
        "Users",
        UserList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn get_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    let model = find_user(state, id).await?;
    Ok(ApiResponse::success("User", User::from(model), Some(Meta::empty())))
}

/// Profile edits by the user or an admin; only admins may change roles.
pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_self_or_admin(user, id)?;
    if payload.role.is_some() {
        ensure_admin(user)?;
    }
    payload.validate()?;

    let existing = find_user(state, id).await?;
    let mut active: UserActive = existing.into();

    if let Some(email) = payload.email {
        let email = normalize_email(&email);
        let taken = Users::find()
            .filter(UserCol::Email.eq(email.clone()))
            .filter(UserCol::Id.ne(id))
            .one(&state.orm)
            .await?
            .is_some();
        if taken {
            return Err(AppError::Conflict("Email is already taken".into()));
        }
        active.email = Set(email);
    }
    if let Some(first_name) = payload.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(last_name.trim().to_string());
    }
    if let Some(second_last_name) = payload.second_last_name {
        active.second_last_name = Set(Some(second_last_name.trim().to_string()));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    tracing::info!(user_id = %updated.id, "user updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success("User updated", User::from(updated), None))
}

/// Deactivated users can no longer log in; their orders stay intact.
pub async fn deactivate_user(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    let existing = find_user(state, id).await?;
    let mut active: UserActive = existing.into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    tracing::info!(user_id = %id, "user deactivated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_deactivate",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::success("User deactivated", User::from(updated), None))
}
