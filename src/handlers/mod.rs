pub mod common;
pub mod requests;
pub mod statistics;
pub mod supplies;
pub mod usage;
