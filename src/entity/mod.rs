pub mod audit_logs;
pub mod delivery_notes;
pub mod incidents;
pub mod inventory_movements;
pub mod order_items;
pub mod orders;
pub mod password_reset_tokens;
pub mod products;
pub mod suppliers;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use delivery_notes::Entity as DeliveryNotes;
pub use incidents::Entity as Incidents;
pub use inventory_movements::Entity as InventoryMovements;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use password_reset_tokens::Entity as PasswordResetTokens;
pub use products::Entity as Products;
pub use suppliers::Entity as Suppliers;
pub use users::Entity as Users;
