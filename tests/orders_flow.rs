mod common;

use common::{auth_user, create_product, create_user, header, line, setup_state, setup_state_with};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use smart_economato::{
    config::OrderPolicy,
    dto::orders::{CreateOrderWithItemsRequest, UpdateOrderStatusRequest},
    entity::{
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{Entity as Orders, OrderStatus},
        users::Role,
    },
    error::AppError,
    services::order_service::{self, OrderWorkflow},
};
use uuid::Uuid;

// Order with one line -> read back -> cancel.
#[tokio::test]
async fn create_read_and_cancel_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let product = create_product(&state, "ACE-001", 2999).await?;
    let caller = auth_user(&user);

    let created = order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-1", user.id, 5998),
            items: vec![line(product.id, 2, 2999)],
        },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(created.order.status, OrderStatus::Pending);
    assert_eq!(created.order.total_amount, 5998);
    let order_id = created.order.id;

    let fetched = order_service::get_order(&state, &caller, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(fetched.items.len(), 1);
    assert_eq!(fetched.items[0].quantity, 2);
    assert_eq!(fetched.items[0].unit_price, 2999);

    order_service::update_order_status(
        &state,
        &auth_user(&admin),
        order_id,
        UpdateOrderStatusRequest {
            status: OrderStatus::Cancelled,
        },
    )
    .await?;

    let after = order_service::get_order(&state, &caller, order_id)
        .await?
        .data
        .expect("order");
    assert_eq!(after.order.status, OrderStatus::Cancelled);
    Ok(())
}

#[tokio::test]
async fn failed_item_insert_rolls_back_the_order() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let product = create_product(&state, "ARR-001", 349).await?;

    let result = order_service::create_order_with_items(
        &state,
        &auth_user(&user),
        CreateOrderWithItemsRequest {
            order: header("ORD-2", user.id, 1047),
            items: vec![line(product.id, 1, 349), line(Uuid::new_v4(), 2, 349)],
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::ConstraintViolation(_))));
    let lookup = OrderWorkflow::from_state(&state).find_by_number("ORD-2").await;
    assert!(matches!(lookup, Err(AppError::NotFound)));
    assert_eq!(OrderItems::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn duplicate_order_number_conflicts_and_keeps_first() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let product = create_product(&state, "LEC-001", 109).await?;
    let caller = auth_user(&user);

    let first = order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-3", user.id, 218),
            items: vec![line(product.id, 2, 109)],
        },
    )
    .await?
    .data
    .expect("order");

    let second = order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-3", user.id, 109),
            items: vec![line(product.id, 1, 109)],
        },
    )
    .await;
    assert!(matches!(second, Err(AppError::Conflict(_))));

    let stored = order_service::get_order(&state, &caller, first.order.id)
        .await?
        .data
        .expect("order");
    assert_eq!(stored.order, first.order);
    assert_eq!(stored.items, first.items);
    assert_eq!(OrderItems::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn repeated_reads_are_identical() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let product = create_product(&state, "HAR-001", 95).await?;
    let caller = auth_user(&user);

    let created = order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-4", user.id, 950),
            items: vec![line(product.id, 10, 95)],
        },
    )
    .await?
    .data
    .expect("order");

    let a = order_service::get_order(&state, &caller, created.order.id).await?.data.expect("a");
    let b = order_service::get_order(&state, &caller, created.order.id).await?.data.expect("b");
    assert_eq!(a.order, b.order);
    assert_eq!(a.items, b.items);
    Ok(())
}

#[tokio::test]
async fn unknown_order_is_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let caller = auth_user(&admin);

    let read = order_service::get_order(&state, &caller, Uuid::new_v4()).await;
    assert!(matches!(read, Err(AppError::NotFound)));

    let status = order_service::update_order_status(
        &state,
        &caller,
        Uuid::new_v4(),
        UpdateOrderStatusRequest {
            status: OrderStatus::Confirmed,
        },
    )
    .await;
    assert!(matches!(status, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn any_transition_is_allowed_by_default() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let workflow = OrderWorkflow::from_state(&state);

    let order = workflow.create(header("ORD-5", user.id, 0)).await?;
    let delivered = workflow.update_status(order.id, OrderStatus::Delivered).await?;
    assert_eq!(delivered.status, OrderStatus::Delivered);
    let back = workflow.update_status(order.id, OrderStatus::Pending).await?;
    assert_eq!(back.status, OrderStatus::Pending);
    Ok(())
}

#[tokio::test]
async fn strict_policy_rejects_illegal_transitions() -> anyhow::Result<()> {
    let state = setup_state_with(OrderPolicy {
        strict_transitions: true,
        verify_totals: false,
    })
    .await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let workflow = OrderWorkflow::from_state(&state);
    let order = workflow.create(header("ORD-6", user.id, 0)).await?;

    let skipped = workflow.update_status(order.id, OrderStatus::Delivered).await;
    assert!(matches!(
        skipped,
        Err(AppError::InvalidTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Delivered
        })
    ));

    workflow.update_status(order.id, OrderStatus::Confirmed).await?;
    workflow.update_status(order.id, OrderStatus::Shipped).await?;
    let late_cancel = workflow.cancel(order.id).await;
    assert!(matches!(late_cancel, Err(AppError::InvalidTransition { .. })));
    Ok(())
}

#[tokio::test]
async fn verify_totals_rejects_mismatched_total() -> anyhow::Result<()> {
    let state = setup_state_with(OrderPolicy {
        strict_transitions: false,
        verify_totals: true,
    })
    .await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let product = create_product(&state, "ACE-001", 2999).await?;
    let caller = auth_user(&user);

    let wrong = order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-7", user.id, 1000),
            items: vec![line(product.id, 2, 2999)],
        },
    )
    .await;
    match wrong {
        Err(AppError::Validation(errors)) => {
            assert!(errors.field_errors().contains_key("total_amount"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    let lookup = OrderWorkflow::from_state(&state).find_by_number("ORD-7").await;
    assert!(matches!(lookup, Err(AppError::NotFound)));

    order_service::create_order_with_items(
        &state,
        &caller,
        CreateOrderWithItemsRequest {
            order: header("ORD-7", user.id, 5998),
            items: vec![line(product.id, 2, 2999)],
        },
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn verify_totals_rejects_overflowing_lines() -> anyhow::Result<()> {
    let state = setup_state_with(OrderPolicy {
        strict_transitions: false,
        verify_totals: true,
    })
    .await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let product = create_product(&state, "ACE-001", 2999).await?;

    let huge = order_service::create_order_with_items(
        &state,
        &auth_user(&user),
        CreateOrderWithItemsRequest {
            order: header("ORD-8", user.id, 1),
            items: vec![line(product.id, 2, i64::MAX)],
        },
    )
    .await;
    match huge {
        Err(AppError::Validation(errors)) => {
            assert!(errors.field_errors().contains_key("total_amount"))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn order_number_lookup_respects_ownership() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let other = create_user(&state, Role::User, "otra@test.local").await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let product = create_product(&state, "ACE-001", 2999).await?;

    order_service::create_order_with_items(
        &state,
        &auth_user(&cook),
        CreateOrderWithItemsRequest {
            order: header("ORD-N1", cook.id, 2999),
            items: vec![line(product.id, 1, 2999)],
        },
    )
    .await?;

    let own = order_service::get_order_by_number(&state, &auth_user(&cook), " ORD-N1 ")
        .await?
        .data
        .expect("order");
    assert_eq!(own.order.order_number, "ORD-N1");
    assert_eq!(own.items.len(), 1);

    assert!(order_service::get_order_by_number(&state, &auth_user(&admin), "ORD-N1").await.is_ok());

    let foreign = order_service::get_order_by_number(&state, &auth_user(&other), "ORD-N1").await;
    assert!(matches!(foreign, Err(AppError::Forbidden)));

    let missing = order_service::get_order_by_number(&state, &auth_user(&admin), "ORD-404").await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn empty_item_list_is_rejected_before_the_workflow() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;

    let result = order_service::create_order_with_items(
        &state,
        &auth_user(&user),
        CreateOrderWithItemsRequest {
            order: header("ORD-8", user.id, 100),
            items: vec![],
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    // The workflow itself accepts it.
    let (order, items) = OrderWorkflow::from_state(&state)
        .create_with_items(header("ORD-8", user.id, 100), vec![])
        .await?;
    assert!(items.is_empty());
    assert_eq!(order.order_number, "ORD-8");
    Ok(())
}

#[tokio::test]
async fn other_users_cannot_read_or_create_for_someone_else() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let owner = create_user(&state, Role::User, "owner@test.local").await?;
    let other = create_user(&state, Role::User, "other@test.local").await?;
    let product = create_product(&state, "HUE-012", 329).await?;

    let created = order_service::create_order_with_items(
        &state,
        &auth_user(&owner),
        CreateOrderWithItemsRequest {
            order: header("ORD-9", owner.id, 329),
            items: vec![line(product.id, 1, 329)],
        },
    )
    .await?
    .data
    .expect("order");

    let read = order_service::get_order(&state, &auth_user(&other), created.order.id).await;
    assert!(matches!(read, Err(AppError::Forbidden)));

    let on_behalf = order_service::create_order(
        &state,
        &auth_user(&other),
        header("ORD-10", owner.id, 0),
    )
    .await;
    assert!(matches!(on_behalf, Err(AppError::Forbidden)));

    let cancel = order_service::cancel_order(&state, &auth_user(&other), created.order.id).await;
    assert!(matches!(cancel, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn listings_paginate_and_filter_by_status() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let workflow = OrderWorkflow::from_state(&state);

    for n in 0..12 {
        let order = workflow
            .create(header(&format!("ORD-L{n}"), user.id, 100))
            .await?;
        if n % 3 == 0 {
            workflow.cancel(order.id).await?;
        }
    }

    let page = order_service::list_orders(
        &state,
        &auth_user(&admin),
        smart_economato::pagination::PageQuery::new(1, 5),
        Default::default(),
    )
    .await?;
    let meta = page.meta.expect("meta");
    assert_eq!(meta.total, Some(12));
    assert_eq!(meta.total_pages, Some(3));
    assert_eq!(page.data.expect("data").items.len(), 5);

    let cancelled = order_service::list_orders(
        &state,
        &auth_user(&admin),
        Default::default(),
        smart_economato::dto::orders::OrderFilter {
            status: Some(OrderStatus::Cancelled),
        },
    )
    .await?;
    let items = cancelled.data.expect("data").items;
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|o| o.status == OrderStatus::Cancelled));

    let denied = order_service::list_orders(
        &state,
        &auth_user(&user),
        Default::default(),
        Default::default(),
    )
    .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));

    let own = order_service::list_orders_by_user(&state, &auth_user(&user), user.id, Default::default())
        .await?;
    assert_eq!(own.meta.expect("meta").total, Some(12));
    Ok(())
}

#[tokio::test]
async fn deleting_an_order_removes_its_items() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let user = create_user(&state, Role::User, "cocina@test.local").await?;
    let admin = create_user(&state, Role::Admin, "admin@test.local").await?;
    let root = create_user(&state, Role::Superadmin, "root@test.local").await?;
    let product = create_product(&state, "ACE-001", 2999).await?;

    let created = order_service::create_order_with_items(
        &state,
        &auth_user(&user),
        CreateOrderWithItemsRequest {
            order: header("ORD-11", user.id, 2999),
            items: vec![line(product.id, 1, 2999)],
        },
    )
    .await?
    .data
    .expect("order");

    let by_admin = order_service::delete_order(&state, &auth_user(&admin), created.order.id).await;
    assert!(matches!(by_admin, Err(AppError::Forbidden)));

    order_service::delete_order(&state, &auth_user(&root), created.order.id).await?;

    let remaining = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(created.order.id))
        .count(&state.orm)
        .await?;
    assert_eq!(remaining, 0);

    let again = order_service::delete_order(&state, &auth_user(&root), created.order.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));
    Ok(())
}
