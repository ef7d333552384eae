mod report;

pub use report::{Report, ReportDetails, ReportResource, ReportStatus};
