use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    entity::inventory_movements::MovementType, models::InventoryMovement, validation::invalid,
};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct RecordMovementRequest {
    pub product_id: Uuid,
    /// Always positive for entries, exits and losses; adjustments may be
    /// negative but never zero.
    pub quantity: i32,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub reason: Option<String>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl RecordMovementRequest {
    /// Field rules plus the quantity rule, which depends on the movement type.
    pub fn validate_for(&self, kind: MovementType) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        let quantity_error = match kind {
            MovementType::Adjustment if self.quantity == 0 => Some("must not be zero"),
            MovementType::Adjustment => None,
            _ if self.quantity < 1 => Some("must be at least 1"),
            _ => None,
        };
        if let Some(message) = quantity_error {
            errors.add("quantity", invalid("range", message));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovementFilter {
    pub movement_type: Option<MovementType>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementList {
    pub items: Vec<InventoryMovement>,
}
