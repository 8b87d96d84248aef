use std::{borrow::Cow, collections::BTreeMap};

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::{
    entity::orders::OrderStatus,
    models::{Order, OrderItem},
    validation::{invalid, not_blank},
};

/// Order header fields supplied by the caller.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 50, message = "must be at most 50 characters")
    )]
    pub order_number: String,
    pub user_id: Uuid,
    /// Minor currency units.
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_amount: i64,
    pub notes: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "must be positive"))]
    pub quantity: i32,
    /// Minor currency units.
    #[validate(range(min = 1, message = "must be positive"))]
    pub unit_price: i64,
}

impl OrderItemInput {
    /// `quantity * unit_price`, or `None` when it does not fit in an i64.
    pub fn line_total(&self) -> Option<i64> {
        i64::from(self.quantity).checked_mul(self.unit_price)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateOrderWithItemsRequest {
    #[serde(flatten)]
    pub order: CreateOrderRequest,
    pub items: Vec<OrderItemInput>,
}

/// Header errors stay at the top level since the header is flattened into
/// the same JSON object; line errors are keyed `items[i].field`.
impl Validate for CreateOrderWithItemsRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.order.validate().err().unwrap_or_else(ValidationErrors::new);
        if self.order.total_amount == 0 {
            errors.add("total_amount", invalid("range", "must be positive"));
        }

        if self.items.is_empty() {
            errors.add("items", invalid("length", "must contain at least one item"));
        }
        let lines: BTreeMap<usize, Box<ValidationErrors>> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| item.validate().err().map(|e| (idx, Box::new(e))))
            .collect();
        if !lines.is_empty() {
            errors
                .errors_mut()
                .insert(Cow::Borrowed("items"), ValidationErrorsKind::List(lines));
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderRequest {
    #[validate(range(min = 0, message = "must not be negative"))]
    pub total_amount: Option<i64>,
    pub notes: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub delivery_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateOrderItemRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "must be positive"))]
    pub quantity: i32,
    #[validate(range(min = 1, message = "must be positive"))]
    pub unit_price: i64,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateOrderItemRequest {
    #[validate(range(min = 1, message = "must be positive"))]
    pub quantity: Option<i32>,
    #[validate(range(min = 1, message = "must be positive"))]
    pub unit_price: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemList {
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::field_messages;

    fn header(total: i64) -> CreateOrderRequest {
        CreateOrderRequest {
            order_number: "ORD-1".into(),
            user_id: Uuid::new_v4(),
            total_amount: total,
            notes: None,
            delivery_address: None,
        }
    }

    #[test]
    fn with_items_requires_at_least_one_item() {
        let req = CreateOrderWithItemsRequest {
            order: header(100),
            items: vec![],
        };
        let fields = field_messages(&req.validate().unwrap_err());
        assert!(fields.contains_key("items"));
    }

    #[test]
    fn with_items_flags_each_bad_line() {
        let req = CreateOrderWithItemsRequest {
            order: header(100),
            items: vec![
                OrderItemInput {
                    product_id: Uuid::new_v4(),
                    quantity: 0,
                    unit_price: 10,
                },
                OrderItemInput {
                    product_id: Uuid::new_v4(),
                    quantity: 1,
                    unit_price: -1,
                },
            ],
        };
        let fields = field_messages(&req.validate().unwrap_err());
        assert!(fields.contains_key("items[0].quantity"));
        assert!(fields.contains_key("items[1].unit_price"));
        assert!(!fields.contains_key("items[0].unit_price"));
    }

    #[test]
    fn header_only_order_accepts_zero_total() {
        assert!(header(0).validate().is_ok());
        let fields = field_messages(&header(-1).validate().unwrap_err());
        assert!(fields.contains_key("total_amount"));
    }

    #[test]
    fn with_items_needs_a_positive_total() {
        let req = CreateOrderWithItemsRequest {
            order: header(0),
            items: vec![OrderItemInput {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_price: 10,
            }],
        };
        let fields = field_messages(&req.validate().unwrap_err());
        assert_eq!(fields["total_amount"], vec!["must be positive".to_string()]);
    }

    #[test]
    fn line_total_reports_overflow() {
        let line = OrderItemInput {
            product_id: Uuid::new_v4(),
            quantity: 2,
            unit_price: i64::MAX,
        };
        assert_eq!(line.line_total(), None);
    }

    #[test]
    fn flattened_header_deserialises() {
        let json = serde_json::json!({
            "order_number": "ORD-1",
            "user_id": Uuid::nil(),
            "total_amount": 5998,
            "items": [{ "product_id": Uuid::nil(), "quantity": 2, "unit_price": 2999 }]
        });
        let req: CreateOrderWithItemsRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.order.order_number, "ORD-1");
        assert_eq!(req.items[0].line_total(), Some(5998));
    }
}
