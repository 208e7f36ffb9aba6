// src/repository/mod.rs
pub mod account_repository;
pub mod catalog_repository;
pub mod document_repository;
pub mod payment_repository;
pub mod user_repository;
pub mod user_subscription_repository;
