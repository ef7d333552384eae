mod waste_handler;

pub use waste_handler::*;
