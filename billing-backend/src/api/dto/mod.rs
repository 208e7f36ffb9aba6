// src/api/dto/mod.rs
pub mod account_dto;
pub mod catalog_dto;
pub mod payment_dto;
pub mod user_subscription_dto;
