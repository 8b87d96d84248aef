use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{models::Supplier, validation::not_blank};

pub const DEFAULT_COUNTRY: &str = "España";

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateSupplierRequest {
    #[validate(
        custom(function = "not_blank"),
        length(min = 2, max = 255, message = "must be 2 to 255 characters")
    )]
    pub name: String,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub contact: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub city: Option<String>,
    /// Defaults to Spain when omitted.
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub country: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub tax_id: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub supply_categories: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; only the present fields change.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 2, max = 255, message = "must be 2 to 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub contact: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 100, message = "must be at most 100 characters"))]
    pub country: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub tax_id: Option<String>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub supply_categories: Option<String>,
    pub notes: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierFilter {
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SupplierSearch {
    /// Matched case-insensitively against name, contact, email and city.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierList {
    pub items: Vec<Supplier>,
}
