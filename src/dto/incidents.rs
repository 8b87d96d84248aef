use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    entity::incidents::{IncidentPriority, IncidentStatus},
    models::Incident,
    validation::not_blank,
};

/// The reporter is always the caller.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateIncidentRequest {
    pub order_id: Uuid,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub description: String,
    /// Defaults to `MEDIUM`.
    pub priority: Option<IncidentPriority>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateIncidentRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub description: Option<String>,
    pub priority: Option<IncidentPriority>,
    pub status: Option<IncidentStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct ResolveIncidentRequest {
    #[validate(custom(function = "not_blank"))]
    pub resolution: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub priority: Option<IncidentPriority>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IncidentList {
    pub items: Vec<Incident>,
}
