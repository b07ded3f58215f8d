// src/domain/mod.rs
pub mod organization_unit_model;
pub mod organization_unit_user_model;
pub mod user_model;
