mod common;

use common::{create_product, setup_state};
use sea_orm::{ActiveModelTrait, Set};
use smart_economato::{
    entity::products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
    pagination::{PageQuery, SortOrder, paginate},
    state::AppState,
};

async fn seed(state: &AppState, count: i64) -> anyhow::Result<()> {
    for n in 0..count {
        create_product(state, &format!("SKU-{n:03}"), 100 + (n * 7) % 50).await?;
    }
    Ok(())
}

#[tokio::test]
async fn twenty_five_rows_make_three_pages() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 25).await?;

    let first = paginate::<Products, _>(&state.orm, &PageQuery::new(1, 10), vec![]).await?;
    assert_eq!(first.data.len(), 10);
    assert_eq!(first.meta.total, Some(25));
    assert_eq!(first.meta.total_pages, Some(3));
    assert_eq!(first.meta.has_next, Some(true));
    assert_eq!(first.meta.has_prev, Some(false));

    let last = paginate::<Products, _>(&state.orm, &PageQuery::new(3, 10), vec![]).await?;
    assert_eq!(last.data.len(), 5);
    assert_eq!(last.meta.has_next, Some(false));
    assert_eq!(last.meta.has_prev, Some(true));
    Ok(())
}

#[tokio::test]
async fn oversized_limit_is_clamped() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 25).await?;

    let page = paginate::<Products, _>(&state.orm, &PageQuery::new(1, 500), vec![]).await?;
    assert_eq!(page.meta.limit, Some(100));
    assert_eq!(page.meta.total_pages, Some(1));
    assert_eq!(page.data.len(), 25);
    Ok(())
}

#[tokio::test]
async fn page_past_the_end_is_empty() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 3).await?;

    let page = paginate::<Products, _>(&state.orm, &PageQuery::new(9, 10), vec![]).await?;
    assert!(page.data.is_empty());
    assert_eq!(page.meta.total, Some(3));
    assert_eq!(page.meta.has_next, Some(false));
    Ok(())
}

#[tokio::test]
async fn absurd_page_numbers_return_an_empty_page() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 3).await?;

    for page in [i64::MAX, i64::MAX / 50] {
        let result = paginate::<Products, _>(&state.orm, &PageQuery::new(page, 100), vec![]).await?;
        assert!(result.data.is_empty());
        assert_eq!(result.meta.total, Some(3));
        assert_eq!(result.meta.has_next, Some(false));
        assert_eq!(result.meta.has_prev, Some(true));
    }
    Ok(())
}

#[tokio::test]
async fn equality_filters_apply_to_count_and_page() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 25).await?;

    // Deactivate five of them.
    for n in 0..5 {
        let product = create_product(&state, &format!("OLD-{n}"), 10).await?;
        let mut active: ProductActive = product.into();
        active.active = Set(false);
        active.update(&state.orm).await?;
    }

    let page = paginate::<Products, _>(
        &state.orm,
        &PageQuery::new(1, 10),
        vec![(ProductCol::Active, true.into())],
    )
    .await?;
    assert_eq!(page.meta.total, Some(25));
    assert!(page.data.iter().all(|p| p.active));

    let inactive = paginate::<Products, _>(
        &state.orm,
        &PageQuery::new(1, 10),
        vec![(ProductCol::Active, false.into())],
    )
    .await?;
    assert_eq!(inactive.meta.total, Some(5));
    Ok(())
}

#[tokio::test]
async fn sorts_by_requested_column() -> anyhow::Result<()> {
    let state = setup_state().await?;
    seed(&state, 12).await?;

    let query = PageQuery {
        page: Some(1),
        limit: Some(12),
        sort_by: Some("price".into()),
        sort_order: Some(SortOrder::Asc),
    };
    let page = paginate::<Products, _>(&state.orm, &query, vec![]).await?;
    let prices: Vec<i64> = page.data.iter().map(|p| p.price).collect();
    assert!(prices.windows(2).all(|w| w[0] <= w[1]), "{prices:?}");

    let query = PageQuery {
        sort_by: Some("code".into()),
        sort_order: Some(SortOrder::Desc),
        ..PageQuery::new(1, 12)
    };
    let page = paginate::<Products, _>(&state.orm, &query, vec![]).await?;
    assert_eq!(page.data.first().map(|p| p.code.as_str()), Some("SKU-011"));
    Ok(())
}
