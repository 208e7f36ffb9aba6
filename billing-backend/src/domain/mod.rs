// src/domain/mod.rs
pub mod access_code_model;
pub mod account_model;
pub mod cashback_applied_model;
pub mod category_model;
pub mod document_model;
pub mod payment_model;
pub mod service_model;
pub mod subscription_plan_model;
pub mod user_model;
pub mod user_subscription_model;
