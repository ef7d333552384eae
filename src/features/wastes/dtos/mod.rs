mod waste_dto;

pub use waste_dto::*;
