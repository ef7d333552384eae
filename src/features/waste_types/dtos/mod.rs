mod waste_type_dto;

pub use waste_type_dto::*;
