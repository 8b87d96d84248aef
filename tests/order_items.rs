mod common;

use common::{auth_user, create_product, create_user, header, line, setup_state};
use smart_economato::{
    dto::orders::{CreateOrderItemRequest, CreateOrderWithItemsRequest, UpdateOrderItemRequest},
    entity::users::Role,
    error::AppError,
    services::{order_item_service, order_service},
};
use uuid::Uuid;

#[tokio::test]
async fn items_can_be_added_edited_and_removed() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let admin = auth_user(&create_user(&state, Role::Admin, "admin@test.local").await?);
    let oil = create_product(&state, "ACE-001", 899).await?;
    let rice = create_product(&state, "ARR-001", 250).await?;

    let order = order_service::create_order_with_items(
        &state,
        &auth_user(&cook),
        CreateOrderWithItemsRequest {
            order: header("ORD-I1", cook.id, 899),
            items: vec![line(oil.id, 1, 899)],
        },
    )
    .await?
    .data
    .expect("order")
    .order;

    let added = order_item_service::create_order_item(
        &state,
        &admin,
        CreateOrderItemRequest {
            order_id: order.id,
            product_id: rice.id,
            quantity: 4,
            unit_price: 250,
        },
    )
    .await?
    .data
    .expect("item");
    assert_eq!(added.order_id, order.id);

    let listed = order_item_service::list_order_items(&state, &auth_user(&cook), order.id)
        .await?
        .data
        .expect("items")
        .items;
    assert_eq!(listed.len(), 2);

    let edited = order_item_service::update_order_item(
        &state,
        &admin,
        added.id,
        UpdateOrderItemRequest {
            quantity: Some(6),
            unit_price: None,
        },
    )
    .await?
    .data
    .expect("item");
    assert_eq!(edited.quantity, 6);
    assert_eq!(edited.unit_price, 250);

    // Line edits leave the header total alone.
    let fetched = order_service::get_order(&state, &admin, order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.order.total_amount, 899);

    order_item_service::delete_order_item(&state, &admin, added.id).await?;
    let gone = order_item_service::get_order_item(&state, &admin, added.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    let again = order_item_service::delete_order_item(&state, &admin, added.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn item_rules_are_enforced() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let other = create_user(&state, Role::User, "otra@test.local").await?;
    let admin = auth_user(&create_user(&state, Role::Admin, "admin@test.local").await?);
    let oil = create_product(&state, "ACE-001", 899).await?;

    let request = |order_id: Uuid, quantity: i32| CreateOrderItemRequest {
        order_id,
        product_id: oil.id,
        quantity,
        unit_price: 899,
    };

    let missing = order_item_service::create_order_item(&state, &admin, request(Uuid::new_v4(), 1)).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let order = order_service::create_order_with_items(
        &state,
        &auth_user(&cook),
        CreateOrderWithItemsRequest {
            order: header("ORD-I2", cook.id, 899),
            items: vec![line(oil.id, 1, 899)],
        },
    )
    .await?
    .data
    .expect("order");

    let by_cook = order_item_service::create_order_item(&state, &auth_user(&cook), request(order.order.id, 1)).await;
    assert!(matches!(by_cook, Err(AppError::Forbidden)));

    let zero = order_item_service::create_order_item(&state, &admin, request(order.order.id, 0)).await;
    assert!(matches!(zero, Err(AppError::Validation(_))));

    let foreign = order_item_service::get_order_item(&state, &auth_user(&other), order.items[0].id).await;
    assert!(matches!(foreign, Err(AppError::Forbidden)));
    Ok(())
}
