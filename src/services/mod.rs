pub mod auth_service;
pub mod delivery_note_service;
pub mod incident_service;
pub mod inventory_service;
pub mod order_item_service;
pub mod order_service;
pub mod product_service;
pub mod supplier_service;
pub mod user_service;
