use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    config::AppConfig,
    db::with_transaction,
    dto::auth::{
        Claims, LoginRequest, LoginResponse, RecoverRequest, RegisterRequest,
        ResetPasswordRequest,
    },
    entity::{
        password_reset_tokens::{
            ActiveModel as ResetTokenActive, Column as ResetTokenCol, Entity as ResetTokens,
        },
        users::{self, ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::User,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub const RESET_TOKEN_TTL_HOURS: i64 = 1;
const RESET_ACK: &str = "If the email is registered, recovery instructions have been sent";

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(stored_hash)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Invalid password hash")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn issue_token(config: &AppConfig, user: &users::Model) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_expires_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

async fn find_by_email(state: &AppState, email: &str) -> AppResult<Option<users::Model>> {
    Ok(Users::find()
        .filter(UserCol::Email.eq(normalize_email(email)))
        .one(&state.orm)
        .await?)
}

pub async fn register_user(
    state: &AppState,
    payload: RegisterRequest,
) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    if find_by_email(state, &payload.email).await?.is_some() {
        return Err(AppError::Conflict("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();

    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&payload.email)),
        password_hash: Set(password_hash),
        role: Set(Role::User),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        second_last_name: Set(payload.second_last_name.map(|s| s.trim().to_string())),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(user_id = %user.id, "user registered");
    audit::record(
        &state.orm,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success("User created", User::from(user), None))
}

pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    payload.validate()?;

    // Unknown, inactive and wrong-password logins are indistinguishable.
    let user = match find_by_email(state, &payload.email).await? {
        Some(u) if u.is_active => u,
        _ => return Err(AppError::Unauthorized),
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let token = issue_token(&state.config, &user)?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    let resp = LoginResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.jwt_expires_hours * 3600,
    };

    Ok(ApiResponse::success("Logged in", resp, Some(Meta::empty())))
}

pub async fn current_user(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<User>> {
    let model = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Profile", User::from(model), Some(Meta::empty())))
}

/// Issues a single-use reset token when the address belongs to an active
/// user. The reply is identical either way.
pub async fn request_password_reset(
    state: &AppState,
    payload: RecoverRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;

    if let Some(user) = find_by_email(state, &payload.email)
        .await?
        .filter(|u| u.is_active)
    {
        let now = Utc::now();
        let token = Uuid::new_v4().simple().to_string();
        ResetTokenActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            token: Set(token.clone()),
            expires_at: Set((now + Duration::hours(RESET_TOKEN_TTL_HOURS)).into()),
            used_at: Set(None),
            created_at: Set(now.into()),
        }
        .insert(&state.orm)
        .await?;

        tracing::info!(user_id = %user.id, "password reset token issued");
        audit::record(
            &state.orm,
            Some(user.id),
            "password_reset_requested",
            "users",
            serde_json::json!({ "user_id": user.id }),
        )
        .await;
    }

    Ok(ApiResponse::success(
        RESET_ACK,
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    payload.validate()?;

    let password_hash = hash_password(&payload.new_password)?;
    let token = payload.token;

    let user_id = with_transaction(&state.orm, move |txn| {
        Box::pin(async move {
            let now = Utc::now();
            let record = ResetTokens::find()
                .filter(ResetTokenCol::Token.eq(token))
                .one(txn)
                .await?
                .filter(|r| r.used_at.is_none() && r.expires_at.with_timezone(&Utc) > now)
                .ok_or_else(|| AppError::BadRequest("Invalid or expired reset token".into()))?;

            let user = Users::find_by_id(record.user_id)
                .one(txn)
                .await?
                .ok_or(AppError::NotFound)?;
            let mut active: UserActive = user.into();
            active.password_hash = Set(password_hash);
            active.updated_at = Set(now.into());
            active.update(txn).await?;

            let user_id = record.user_id;
            let mut used: ResetTokenActive = record.into();
            used.used_at = Set(Some(now.into()));
            used.update(txn).await?;

            Ok(user_id)
        })
    })
    .await?;

    tracing::info!(user_id = %user_id, "password reset");
    audit::record(
        &state.orm,
        Some(user_id),
        "password_reset",
        "users",
        serde_json::json!({ "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Password updated",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
