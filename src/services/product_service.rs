use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::products::{CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{self, ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Product,
    pagination::{PageQuery, paginate},
    response::{ApiResponse, Meta},
    state::AppState,
};

async fn find_product(state: &AppState, id: Uuid) -> AppResult<products::Model> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn code_taken(state: &AppState, code: &str, except: Option<Uuid>) -> AppResult<bool> {
    let mut finder = Products::find().filter(Column::Code.eq(code));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(&state.orm).await?.is_some())
}

/// Active products only.
pub async fn list_products(
    state: &AppState,
    query: PageQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let page = paginate::<Products, _>(&state.orm, &query, vec![(Column::Active, true.into())])
        .await?
        .map(Product::from);

    Ok(ApiResponse::success(
        "Products",
        ProductList { items: page.data },
        Some(page.meta),
    ))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = find_product(state, id).await?;
    Ok(ApiResponse::success(
        "Product",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn get_product_by_code(state: &AppState, code: &str) -> AppResult<ApiResponse<Product>> {
    let product = Products::find()
        .filter(Column::Code.eq(code.trim()))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Product",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let code = payload.code.trim().to_string();
    if code_taken(state, &code, None).await? {
        return Err(AppError::Conflict("Product code already exists".into()));
    }

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        code: Set(code),
        price: Set(payload.price),
        category: Set(payload.category),
        active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(product_id = %product.id, code = %product.code, "product created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id, "code": product.code }),
    )
    .await;

    Ok(ApiResponse::success("Product created", Product::from(product), None))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_product(state, id).await?;
    let mut active: ActiveModel = existing.into();

    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(code) = payload.code {
        let code = code.trim().to_string();
        if code_taken(state, &code, Some(id)).await? {
            return Err(AppError::Conflict("Product code already exists".into()));
        }
        active.code = Set(code);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(category) = payload.category {
        active.category = Set(Some(category));
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    tracing::info!(product_id = %updated.id, "product updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success("Product updated", Product::from(updated), None))
}

/// Soft delete: the product disappears from listings but stays
/// referenceable by past orders and movements.
pub async fn deactivate_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    let existing = find_product(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.active = Set(false);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_deactivate",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Product deactivated", Product::from(updated), None))
}

/// Hard delete. Fails with a constraint violation while any order item or
/// inventory movement still references the product.
pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;

    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(product_id = %id, "product deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}
