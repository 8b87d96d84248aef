use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{entity::users::Role, validation::not_blank};

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 120, message = "must be at most 120 characters")
    )]
    pub first_name: String,
    #[validate(
        custom(function = "not_blank"),
        length(max = 120, message = "must be at most 120 characters")
    )]
    pub last_name: String,
    #[validate(length(max = 120, message = "must be at most 120 characters"))]
    pub second_last_name: Option<String>,
}

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
pub struct RecoverRequest {
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
}

#[derive(Deserialize, Debug, Clone, ToSchema, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 128, message = "must be 1 to 128 characters"))]
    pub token: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}
