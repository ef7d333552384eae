//! Role-based access control.
//!
//! `policy` decides, `scope` narrows list queries, `service` binds both to
//! stored profiles.

pub mod policy;
pub mod scope;
mod service;

pub use policy::{classify_patch, Action, Principal, ResourceKind, Target};
pub use scope::{ListFilters, Ordering, QuerySpec, SortField, Visibility};
pub use service::AccessService;
