use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{entity::delivery_notes::DeliveryStatus, models::DeliveryNote, validation::not_blank};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateDeliveryNoteRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub note_number: String,
    pub order_id: Uuid,
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "must be at most 255 characters")
    )]
    pub carrier: String,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub tracking_number: Option<String>,
    /// Defaults to `PENDING`.
    pub status: Option<DeliveryStatus>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateDeliveryNoteRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub carrier: Option<String>,
    #[validate(length(max = 50, message = "must be at most 50 characters"))]
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateDeliveryStatusRequest {
    pub status: DeliveryStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeliveryNoteFilter {
    pub status: Option<DeliveryStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryNoteList {
    pub items: Vec<DeliveryNote>,
}
