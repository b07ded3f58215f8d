// src/repository/mod.rs
pub mod organization_unit_repository;
pub mod user_repository;
