use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{models::Product, validation::not_blank};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 200, message = "must be at most 200 characters")
    )]
    pub name: String,
    pub description: Option<String>,
    #[validate(
        custom(function = "not_blank"),
        length(max = 30, message = "must be at most 30 characters")
    )]
    pub code: String,
    /// Minor currency units.
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: i64,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1 to 200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 30, message = "must be 1 to 30 characters"))]
    pub code: Option<String>,
    #[validate(range(min = 0, message = "must not be negative"))]
    pub price: Option<i64>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub category: Option<String>,
    pub active: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}
