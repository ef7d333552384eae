mod waste_type_service;

pub use waste_type_service::WasteTypeService;
