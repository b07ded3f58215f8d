pub mod dto;
pub mod outcome;
