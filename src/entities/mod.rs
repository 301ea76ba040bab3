pub mod supply_item;
pub mod supply_request;
pub mod usage_record;

pub use supply_request::RequestStatus;
