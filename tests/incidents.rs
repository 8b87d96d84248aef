mod common;

use common::{auth_user, create_product, create_user, header, line, setup_state};
use sea_orm::{EntityTrait, PaginatorTrait};
use smart_economato::{
    dto::{
        incidents::{
            CreateIncidentRequest, IncidentFilter, ResolveIncidentRequest, UpdateIncidentRequest,
        },
        orders::CreateOrderWithItemsRequest,
    },
    entity::{
        Incidents,
        incidents::{IncidentPriority, IncidentStatus},
        users::{self, Role},
    },
    error::AppError,
    pagination::PageQuery,
    services::{incident_service, order_service},
    state::AppState,
};
use uuid::Uuid;

async fn place_order(state: &AppState, owner: &users::Model, number: &str) -> anyhow::Result<Uuid> {
    let product = create_product(state, &format!("P-{number}"), 500).await?;
    let order = order_service::create_order_with_items(
        state,
        &auth_user(owner),
        CreateOrderWithItemsRequest {
            order: header(number, owner.id, 1000),
            items: vec![line(product.id, 2, 500)],
        },
    )
    .await?
    .data
    .expect("order");
    Ok(order.order.id)
}

fn report(order_id: Uuid, title: &str) -> CreateIncidentRequest {
    CreateIncidentRequest {
        order_id,
        title: title.to_string(),
        description: "Dos cajas llegaron abiertas".into(),
        priority: None,
    }
}

#[tokio::test]
async fn report_list_and_resolve() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let admin = auth_user(&create_user(&state, Role::Admin, "admin@test.local").await?);
    let order_id = place_order(&state, &cook, "ORD-INC1").await?;

    let first = incident_service::create_incident(&state, &auth_user(&cook), report(order_id, "Cajas dañadas"))
        .await?
        .data
        .expect("incident");
    assert_eq!(first.status, IncidentStatus::Open);
    assert_eq!(first.priority, IncidentPriority::Medium);
    assert_eq!(first.user_id, cook.id);

    let second = incident_service::create_incident(
        &state,
        &auth_user(&cook),
        CreateIncidentRequest {
            priority: Some(IncidentPriority::High),
            ..report(order_id, "Falta una caja")
        },
    )
    .await?
    .data
    .expect("incident");

    let by_order = incident_service::list_incidents_by_order(&state, &auth_user(&cook), order_id)
        .await?
        .data
        .expect("list")
        .items;
    assert_eq!(by_order.len(), 2);

    let high = incident_service::list_incidents(
        &state,
        &admin,
        PageQuery::new(1, 10),
        IncidentFilter {
            priority: Some(IncidentPriority::High),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("list")
    .items;
    assert_eq!(high.len(), 1);
    assert_eq!(high[0].id, second.id);

    let by_cook = incident_service::resolve_incident(
        &state,
        &auth_user(&cook),
        first.id,
        ResolveIncidentRequest {
            resolution: "Repuesto".into(),
        },
    )
    .await;
    assert!(matches!(by_cook, Err(AppError::Forbidden)));

    let resolved = incident_service::resolve_incident(
        &state,
        &admin,
        first.id,
        ResolveIncidentRequest {
            resolution: "  Proveedor repone las cajas ".into(),
        },
    )
    .await?
    .data
    .expect("incident");
    assert_eq!(resolved.status, IncidentStatus::Resolved);
    assert_eq!(resolved.resolution.as_deref(), Some("Proveedor repone las cajas"));

    let blank = incident_service::resolve_incident(
        &state,
        &admin,
        second.id,
        ResolveIncidentRequest {
            resolution: " ".into(),
        },
    )
    .await;
    assert!(matches!(blank, Err(AppError::Validation(_))));
    Ok(())
}

#[tokio::test]
async fn access_follows_order_ownership() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let other = auth_user(&create_user(&state, Role::User, "otra@test.local").await?);
    let root = auth_user(&create_user(&state, Role::Superadmin, "root@test.local").await?);
    let order_id = place_order(&state, &cook, "ORD-INC2").await?;

    let foreign_report = incident_service::create_incident(&state, &other, report(order_id, "No es mío")).await;
    assert!(matches!(foreign_report, Err(AppError::Forbidden)));

    let missing_order = incident_service::create_incident(&state, &other, report(Uuid::new_v4(), "?")).await;
    assert!(matches!(missing_order, Err(AppError::NotFound)));

    let incident = incident_service::create_incident(&state, &auth_user(&cook), report(order_id, "Retraso"))
        .await?
        .data
        .expect("incident");

    let peek = incident_service::get_incident(&state, &other, incident.id).await;
    assert!(matches!(peek, Err(AppError::Forbidden)));
    let listing = incident_service::list_incidents(&state, &other, PageQuery::default(), IncidentFilter::default()).await;
    assert!(matches!(listing, Err(AppError::Forbidden)));

    // Reporters may reword but not close their own incidents.
    incident_service::update_incident(
        &state,
        &auth_user(&cook),
        incident.id,
        UpdateIncidentRequest {
            title: Some("Retraso de dos días".into()),
            ..Default::default()
        },
    )
    .await?;
    let close = incident_service::update_incident(
        &state,
        &auth_user(&cook),
        incident.id,
        UpdateIncidentRequest {
            status: Some(IncidentStatus::Closed),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(close, Err(AppError::Forbidden)));

    let by_owner = incident_service::delete_incident(&state, &auth_user(&cook), incident.id).await;
    assert!(matches!(by_owner, Err(AppError::Forbidden)));
    incident_service::delete_incident(&state, &root, incident.id).await?;
    let again = incident_service::delete_incident(&state, &root, incident.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn deleting_the_order_removes_its_incidents() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let cook = create_user(&state, Role::User, "cocina@test.local").await?;
    let root = auth_user(&create_user(&state, Role::Superadmin, "root@test.local").await?);
    let order_id = place_order(&state, &cook, "ORD-INC3").await?;

    incident_service::create_incident(&state, &auth_user(&cook), report(order_id, "Rotura")).await?;
    assert_eq!(Incidents::find().count(&state.orm).await?, 1);

    order_service::delete_order(&state, &root, order_id).await?;
    assert_eq!(Incidents::find().count(&state.orm).await?, 0);
    Ok(())
}
