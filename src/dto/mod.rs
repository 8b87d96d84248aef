pub mod auth;
pub mod delivery_notes;
pub mod incidents;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;
