// handlers/public/mod.rs - Public handlers (no authentication required)

pub mod auth;
pub mod farms;
pub mod iot;
pub mod readings;
pub mod sensors;
