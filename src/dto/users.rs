use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{entity::users::Role, models::User};

/// Partial profile update; only the present fields change.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 120, message = "must be 2 to 120 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 120, message = "must be 2 to 120 characters"))]
    pub last_name: Option<String>,
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub second_last_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}
