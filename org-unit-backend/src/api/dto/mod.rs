pub mod organization_unit_dto;
