pub mod auth;
pub mod debug;
pub mod offer;
