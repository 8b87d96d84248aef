mod common;

use common::{TEST_SECRET, auth_user, create_user, setup_state};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use smart_economato::{
    dto::{
        auth::{LoginRequest, RecoverRequest, RegisterRequest, ResetPasswordRequest},
        users::UpdateUserRequest,
    },
    entity::{
        password_reset_tokens::{Column as ResetTokenCol, Entity as ResetTokens},
        users::Role,
    },
    error::AppError,
    middleware::auth::decode_token,
    services::{auth_service, user_service},
};

fn register_request(email: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: "cocina123".into(),
        first_name: "Ana".into(),
        last_name: "Pérez".into(),
        second_last_name: None,
    }
}

fn login_request(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_then_login_issues_a_valid_token() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let user = auth_service::register_user(&state, register_request("Ana@Test.local"))
        .await?
        .data
        .expect("user");
    assert_eq!(user.email, "ana@test.local");
    assert_eq!(user.role, Role::User);

    let login = auth_service::login_user(&state, login_request("ana@test.local", "cocina123"))
        .await?
        .data
        .expect("token");
    assert_eq!(login.token_type, "Bearer");

    let claims = decode_token(TEST_SECRET, &login.access_token)?;
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.role, Role::User);

    let me = auth_service::current_user(&state, &claims)
        .await?
        .data
        .expect("profile");
    assert_eq!(me.id, user.id);
    Ok(())
}

#[tokio::test]
async fn duplicate_email_conflicts() -> anyhow::Result<()> {
    let state = setup_state().await?;
    auth_service::register_user(&state, register_request("ana@test.local")).await?;

    let again = auth_service::register_user(&state, register_request("ANA@test.local")).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn bad_credentials_and_inactive_users_are_unauthorized() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let cook = auth_service::register_user(&state, register_request("ana@test.local"))
        .await?
        .data
        .expect("user");

    let wrong = auth_service::login_user(&state, login_request("ana@test.local", "nope-nope")).await;
    assert!(matches!(wrong, Err(AppError::Unauthorized)));

    let unknown = auth_service::login_user(&state, login_request("ghost@test.local", "cocina123")).await;
    assert!(matches!(unknown, Err(AppError::Unauthorized)));

    user_service::deactivate_user(&state, &auth_user(&admin), cook.id).await?;
    let inactive = auth_service::login_user(&state, login_request("ana@test.local", "cocina123")).await;
    assert!(matches!(inactive, Err(AppError::Unauthorized)));
    Ok(())
}

#[tokio::test]
async fn password_reset_token_is_single_use() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = auth_service::register_user(&state, register_request("ana@test.local"))
        .await?
        .data
        .expect("user");

    let known = auth_service::request_password_reset(
        &state,
        RecoverRequest {
            email: "ana@test.local".into(),
        },
    )
    .await?;
    let unknown = auth_service::request_password_reset(
        &state,
        RecoverRequest {
            email: "ghost@test.local".into(),
        },
    )
    .await?;
    assert_eq!(known.message, unknown.message);

    let token = ResetTokens::find()
        .filter(ResetTokenCol::UserId.eq(user.id))
        .one(&state.orm)
        .await?
        .expect("reset token")
        .token;

    auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            token: token.clone(),
            new_password: "nueva-clave".into(),
        },
    )
    .await?;

    auth_service::login_user(&state, login_request("ana@test.local", "nueva-clave")).await?;
    let old = auth_service::login_user(&state, login_request("ana@test.local", "cocina123")).await;
    assert!(matches!(old, Err(AppError::Unauthorized)));

    let reused = auth_service::reset_password(
        &state,
        ResetPasswordRequest {
            token,
            new_password: "otra-clave".into(),
        },
    )
    .await;
    assert!(matches!(reused, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn only_admins_change_roles() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;

    let self_promotion = user_service::update_user(
        &state,
        &auth_user(&cook),
        cook.id,
        UpdateUserRequest {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(self_promotion, Err(AppError::Forbidden)));

    let renamed = user_service::update_user(
        &state,
        &auth_user(&cook),
        cook.id,
        UpdateUserRequest {
            first_name: Some("Lucía".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(renamed.first_name, "Lucía");

    let promoted = user_service::update_user(
        &state,
        &auth_user(&admin),
        cook.id,
        UpdateUserRequest {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("user");
    assert_eq!(promoted.role, Role::Admin);

    let taken = user_service::update_user(
        &state,
        &auth_user(&admin),
        cook.id,
        UpdateUserRequest {
            email: Some("admin@test.local".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));
    Ok(())
}
