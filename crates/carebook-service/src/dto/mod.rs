//! Data Transfer Objects (DTOs).

mod address_dto;
mod patient_dto;

pub use address_dto::*;
pub use patient_dto::*;
