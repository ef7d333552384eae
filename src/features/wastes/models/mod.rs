mod waste;

pub use waste::{Waste, WasteDetails, WasteResource, WasteStatus};
