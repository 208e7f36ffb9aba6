// src/service/mod.rs
pub mod account_service;
pub mod catalog_service;
pub mod expiry_sweeper;
pub mod payment_service;
pub mod subscription_lifecycle_service;
pub mod user_subscription_service;
