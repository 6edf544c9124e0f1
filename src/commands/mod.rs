pub mod auth;
pub mod crm;
pub mod drying;
pub mod records;
pub mod stats;
