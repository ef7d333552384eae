mod waste_type_repository;

pub use waste_type_repository::{PgWasteTypeRepository, WasteTypeRepository};
