// src/api/handlers/mod.rs
pub mod account_handler;
pub mod catalog_handler;
pub mod payment_handler;
pub mod system_handler;
pub mod user_subscription_handler;
