#![allow(dead_code)]

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use smart_economato::{
    config::{AppConfig, OrderPolicy},
    db::{create_orm_conn, run_migrations},
    dto::orders::{CreateOrderRequest, OrderItemInput},
    entity::{
        products::{self, ActiveModel as ProductActive},
        users::{self, ActiveModel as UserActive, Role},
    },
    middleware::auth::AuthUser,
    services::auth_service::hash_password,
    state::AppState,
};
use uuid::Uuid;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_PASSWORD: &str = "secreto123";

pub fn test_config(order_policy: OrderPolicy) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        jwt_expires_hours: 1,
        cors_origin: None,
        order_policy,
    }
}

/// Fresh in-memory database with the schema applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    setup_state_with(OrderPolicy::default()).await
}

pub async fn setup_state_with(order_policy: OrderPolicy) -> anyhow::Result<AppState> {
    let config = test_config(order_policy);
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, config))
}

pub async fn create_user(state: &AppState, role: Role, email: &str) -> anyhow::Result<users::Model> {
    let now = Utc::now();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password(TEST_PASSWORD)?),
        role: Set(role),
        first_name: Set("Test".into()),
        last_name: Set("User".into()),
        second_last_name: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(user)
}

pub async fn create_product(
    state: &AppState,
    code: &str,
    price: i64,
) -> anyhow::Result<products::Model> {
    let now = Utc::now();
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("Product {code}")),
        description: Set(None),
        code: Set(code.to_string()),
        price: Set(price),
        category: Set(Some("Secos".into())),
        active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub fn auth_user(user: &users::Model) -> AuthUser {
    AuthUser {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    }
}

pub fn header(order_number: &str, user_id: Uuid, total_amount: i64) -> CreateOrderRequest {
    CreateOrderRequest {
        order_number: order_number.to_string(),
        user_id,
        total_amount,
        notes: None,
        delivery_address: Some("Cocina central".into()),
    }
}

pub fn line(product_id: Uuid, quantity: i32, unit_price: i64) -> OrderItemInput {
    OrderItemInput {
        product_id,
        quantity,
        unit_price,
    }
}
