mod waste_type_handler;

pub use waste_type_handler::*;
