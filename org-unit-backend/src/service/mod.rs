// src/service/mod.rs
pub mod access_control;
pub mod organization_unit_service;
