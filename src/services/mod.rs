// Inventory core
pub mod ledger;
pub mod requests;
pub mod statistics;

// Catalog administration
pub mod supplies;

// Service factory for dependency injection
pub mod factory;

pub use factory::{ServiceContainer, ServiceFactory};
