use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
    sea_query::{Expr, Func},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    audit,
    dto::suppliers::{
        CreateSupplierRequest, DEFAULT_COUNTRY, SupplierFilter, SupplierList, UpdateSupplierRequest,
    },
    entity::suppliers::{self, ActiveModel, Column, Entity as Suppliers},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_superadmin},
    models::Supplier,
    pagination::{Filters, PageQuery, paginate},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Search results are capped; callers refine the query instead of paging.
pub const SEARCH_LIMIT: u64 = 20;

async fn find_supplier(state: &AppState, id: Uuid) -> AppResult<suppliers::Model> {
    Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn taken(state: &AppState, col: Column, value: &str, except: Option<Uuid>) -> AppResult<bool> {
    let mut finder = Suppliers::find().filter(col.eq(value));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    Ok(finder.one(&state.orm).await?.is_some())
}

async fn ensure_unique(
    state: &AppState,
    email: Option<&str>,
    tax_id: Option<&str>,
    except: Option<Uuid>,
) -> AppResult<()> {
    if let Some(email) = email {
        if taken(state, Column::Email, email, except).await? {
            return Err(AppError::Conflict(format!(
                "A supplier with email {email} already exists"
            )));
        }
    }
    if let Some(tax_id) = tax_id {
        if taken(state, Column::TaxId, tax_id, except).await? {
            return Err(AppError::Conflict(format!(
                "A supplier with tax id {tax_id} already exists"
            )));
        }
    }
    Ok(())
}

fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

fn normalize_tax_id(tax_id: String) -> String {
    tax_id.trim().to_uppercase()
}

pub async fn list_suppliers(
    state: &AppState,
    query: PageQuery,
    filter: SupplierFilter,
) -> AppResult<ApiResponse<SupplierList>> {
    let mut filters: Filters<Suppliers> = Vec::new();
    if let Some(active) = filter.active {
        filters.push((Column::Active, active.into()));
    }

    let page = paginate::<Suppliers, _>(&state.orm, &query, filters)
        .await?
        .map(Supplier::from);

    Ok(ApiResponse::success(
        "Suppliers",
        SupplierList { items: page.data },
        Some(page.meta),
    ))
}

/// Case-insensitive substring match over name, contact, email and city,
/// ordered by name. A blank query matches nothing.
pub async fn search_suppliers(
    state: &AppState,
    q: Option<&str>,
) -> AppResult<ApiResponse<SupplierList>> {
    let needle = q.map(str::trim).unwrap_or_default().to_lowercase();
    if needle.is_empty() {
        return Ok(ApiResponse::success(
            "Suppliers",
            SupplierList { items: Vec::new() },
            Some(Meta::empty()),
        ));
    }

    let pattern = format!("%{needle}%");
    let matches = [Column::Name, Column::Contact, Column::Email, Column::City]
        .into_iter()
        .fold(Condition::any(), |cond, col| {
            cond.add(Expr::expr(Func::lower(Expr::col(col))).like(pattern.as_str()))
        });

    let items = Suppliers::find()
        .filter(matches)
        .order_by_asc(Column::Name)
        .limit(SEARCH_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Supplier::from)
        .collect();

    Ok(ApiResponse::success(
        "Suppliers",
        SupplierList { items },
        Some(Meta::empty()),
    ))
}

pub async fn get_supplier(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Supplier>> {
    let supplier = find_supplier(state, id).await?;
    Ok(ApiResponse::success(
        "Supplier",
        Supplier::from(supplier),
        Some(Meta::empty()),
    ))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_admin(user)?;
    payload.validate()?;

    let email = payload.email.map(normalize_email);
    let tax_id = payload.tax_id.map(normalize_tax_id);
    ensure_unique(state, email.as_deref(), tax_id.as_deref(), None).await?;

    let now = Utc::now();
    let supplier = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        contact: Set(payload.contact),
        email: Set(email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        city: Set(payload.city),
        country: Set(Some(
            payload.country.unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        )),
        tax_id: Set(tax_id),
        supply_categories: Set(payload.supply_categories),
        notes: Set(payload.notes),
        active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "supplier created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_create",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier created",
        Supplier::from(supplier),
        None,
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_admin(user)?;
    payload.validate()?;

    let existing = find_supplier(state, id).await?;
    let email = payload.email.map(normalize_email);
    let tax_id = payload.tax_id.map(normalize_tax_id);
    ensure_unique(state, email.as_deref(), tax_id.as_deref(), Some(id)).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(contact) = payload.contact {
        active.contact = Set(Some(contact));
    }
    if email.is_some() {
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(address) = payload.address {
        active.address = Set(Some(address));
    }
    if let Some(city) = payload.city {
        active.city = Set(Some(city));
    }
    if let Some(country) = payload.country {
        active.country = Set(Some(country));
    }
    if tax_id.is_some() {
        active.tax_id = Set(tax_id);
    }
    if let Some(categories) = payload.supply_categories {
        active.supply_categories = Set(Some(categories));
    }
    if let Some(notes) = payload.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(flag) = payload.active {
        active.active = Set(flag);
    }
    active.updated_at = Set(Utc::now().into());

    let updated = active.update(&state.orm).await?;

    tracing::info!(supplier_id = %updated.id, "supplier updated");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_update",
        "suppliers",
        serde_json::json!({ "supplier_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier updated",
        Supplier::from(updated),
        None,
    ))
}

/// Soft delete: the row stays, flagged inactive.
pub async fn deactivate_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_admin(user)?;

    let existing = find_supplier(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.active = Set(false);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_deactivate",
        "suppliers",
        serde_json::json!({ "supplier_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier deactivated",
        Supplier::from(updated),
        None,
    ))
}

pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_superadmin(user)?;

    let result = Suppliers::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(supplier_id = %id, "supplier deleted");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_delete",
        "suppliers",
        serde_json::json!({ "supplier_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier deleted",
        serde_json::json!({ "id": id }),
        None,
    ))
}
