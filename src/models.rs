use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    delivery_notes::{self, DeliveryStatus},
    incidents::{self, IncidentPriority, IncidentStatus},
    inventory_movements::{self, MovementType},
    order_items,
    orders::{self, OrderStatus},
    products, suppliers,
    users::{self, Role},
};

/// Public view of a user; the password hash never leaves the service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub code: String,
    pub price: i64,
    pub category: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub user_id: Uuid,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub notes: Option<String>,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub reason: Option<String>,
    pub user_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductStock {
    pub product_id: Uuid,
    pub stock: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub tax_id: Option<String>,
    pub supply_categories: Option<String>,
    pub notes: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Incident {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: IncidentPriority,
    pub status: IncidentStatus,
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub resolution: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeliveryNote {
    pub id: Uuid,
    pub note_number: String,
    pub order_id: Uuid,
    pub status: DeliveryStatus,
    pub carrier: String,
    pub tracking_number: Option<String>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            first_name: model.first_name,
            last_name: model.last_name,
            second_last_name: model.second_last_name,
            is_active: model.is_active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            code: model.code,
            price: model.price,
            category: model.category,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            user_id: model.user_id,
            status: model.status,
            total_amount: model.total_amount,
            notes: model.notes,
            delivery_address: model.delivery_address,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<order_items::Model> for OrderItem {
    fn from(model: order_items::Model) -> Self {
        Self {
            id: model.id,
            order_id: model.order_id,
            product_id: model.product_id,
            quantity: model.quantity,
            unit_price: model.unit_price,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<inventory_movements::Model> for InventoryMovement {
    fn from(model: inventory_movements::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            movement_type: model.movement_type,
            quantity: model.quantity,
            reason: model.reason,
            user_id: model.user_id,
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<suppliers::Model> for Supplier {
    fn from(model: suppliers::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact: model.contact,
            email: model.email,
            phone: model.phone,
            address: model.address,
            city: model.city,
            country: model.country,
            tax_id: model.tax_id,
            supply_categories: model.supply_categories,
            notes: model.notes,
            active: model.active,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<incidents::Model> for Incident {
    fn from(model: incidents::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            priority: model.priority,
            status: model.status,
            order_id: model.order_id,
            user_id: model.user_id,
            resolution: model.resolution,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<delivery_notes::Model> for DeliveryNote {
    fn from(model: delivery_notes::Model) -> Self {
        Self {
            id: model.id,
            note_number: model.note_number,
            order_id: model.order_id,
            status: model.status,
            carrier: model.carrier,
            tracking_number: model.tracking_number,
            delivered_at: model.delivered_at.map(|at| at.with_timezone(&Utc)),
            notes: model.notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
