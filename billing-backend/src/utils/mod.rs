// src/utils/mod.rs
pub mod clock;
pub mod numbering;
pub mod period;
