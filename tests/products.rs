mod common;

use common::{auth_user, create_user, header, line, setup_state};
use smart_economato::{
    dto::{
        orders::CreateOrderWithItemsRequest,
        products::{CreateProductRequest, UpdateProductRequest},
    },
    entity::users::Role,
    error::AppError,
    pagination::PageQuery,
    services::{inventory_service::InventoryLedger, order_service, product_service},
};

fn new_product(code: &str) -> CreateProductRequest {
    CreateProductRequest {
        name: "Aceite de oliva".into(),
        description: Some("Virgen extra, 1L".into()),
        code: code.to_string(),
        price: 899,
        category: Some("Aceites".into()),
    }
}

#[tokio::test]
async fn duplicate_code_conflicts() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = auth_user(&create_user(&state, Role::Admin, "admin@test.local").await?);

    let created = product_service::create_product(&state, &admin, new_product("ACE-001"))
        .await?
        .data
        .expect("product");
    assert!(created.active);

    let again = product_service::create_product(&state, &admin, new_product("ACE-001")).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));

    let other = product_service::create_product(&state, &admin, new_product("ACE-002"))
        .await?
        .data
        .expect("product");
    let clash = product_service::update_product(
        &state,
        &admin,
        other.id,
        UpdateProductRequest {
            code: Some("ACE-001".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));

    let by_code = product_service::get_product_by_code(&state, "ACE-002")
        .await?
        .data
        .expect("product");
    assert_eq!(by_code.id, other.id);
    Ok(())
}

#[tokio::test]
async fn writes_require_admin() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = auth_user(&create_user(&state, Role::User, "cocina@test.local").await?);

    let result = product_service::create_product(&state, &cook, new_product("ACE-001")).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn referenced_products_cannot_be_deleted() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin_model = create_user(&state, Role::Admin, "admin@test.local").await?;
    let admin = auth_user(&admin_model);

    let stocked = product_service::create_product(&state, &admin, new_product("ACE-001"))
        .await?
        .data
        .expect("product");
    InventoryLedger::new(&state.orm)
        .record_entry(stocked.id, 5, None, None)
        .await?;
    let blocked = product_service::delete_product(&state, &admin, stocked.id).await;
    assert!(matches!(blocked, Err(AppError::ConstraintViolation(_))));

    let ordered = product_service::create_product(&state, &admin, new_product("ARR-001"))
        .await?
        .data
        .expect("product");
    order_service::create_order_with_items(
        &state,
        &admin,
        CreateOrderWithItemsRequest {
            order: header("ORD-P1", admin_model.id, 899),
            items: vec![line(ordered.id, 1, 899)],
        },
    )
    .await?;
    let blocked = product_service::delete_product(&state, &admin, ordered.id).await;
    assert!(matches!(blocked, Err(AppError::ConstraintViolation(_))));

    let unused = product_service::create_product(&state, &admin, new_product("SAL-001"))
        .await?
        .data
        .expect("product");
    product_service::delete_product(&state, &admin, unused.id).await?;
    let gone = product_service::get_product(&state, unused.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn deactivated_products_leave_the_listing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = auth_user(&create_user(&state, Role::Admin, "admin@test.local").await?);

    let keep = product_service::create_product(&state, &admin, new_product("ACE-001"))
        .await?
        .data
        .expect("product");
    let retire = product_service::create_product(&state, &admin, new_product("ACE-002"))
        .await?
        .data
        .expect("product");

    let retired = product_service::deactivate_product(&state, &admin, retire.id)
        .await?
        .data
        .expect("product");
    assert!(!retired.active);

    let listing = product_service::list_products(&state, PageQuery::default()).await?;
    let items = listing.data.expect("data").items;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, keep.id);
    Ok(())
}
