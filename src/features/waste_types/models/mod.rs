mod waste_type;

pub use waste_type::{WasteType, WasteTypeFields};
