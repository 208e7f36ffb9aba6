// src/extractors/mod.rs
pub mod id;
pub mod json;

pub use id::{IdPath, ValidatedMultiPath};
pub use json::ValidatedJson;
