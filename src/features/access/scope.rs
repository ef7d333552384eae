use std::str::FromStr;

use uuid::Uuid;

use super::policy::{Principal, ResourceKind};
use crate::core::error::AppError;
use crate::shared::types::PaginationQuery;

/// Which records of a kind a principal may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Nothing,
    Everything,
    OwnedBy(Uuid),
}

impl Visibility {
    /// Whether a record with the given owner falls inside this visibility
    #[cfg(test)]
    pub fn permits(&self, owner_id: Option<Uuid>) -> bool {
        match self {
            Visibility::Nothing => false,
            Visibility::Everything => true,
            Visibility::OwnedBy(id) => owner_id == Some(*id),
        }
    }
}

/// Resolve the visible set of `kind` for `principal`
pub fn scope(principal: &Principal, kind: ResourceKind) -> Visibility {
    if !kind.is_owned() {
        return Visibility::Everything;
    }

    let Some(subject) = principal.subject() else {
        return Visibility::Nothing;
    };

    let sees_everything = match kind {
        ResourceKind::Profile => subject.is_admin(),
        _ => subject.is_elevated(),
    };

    if sees_everything {
        Visibility::Everything
    } else {
        Visibility::OwnedBy(subject.identity_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Status,
}

/// Requested ordering, e.g. `created_at` or `-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordering {
    pub field: SortField,
    pub descending: bool,
}

impl Default for Ordering {
    /// Newest first
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl FromStr for Ordering {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        let (descending, name) = match value.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, value),
        };

        let field = match name {
            "created_at" | "time_created" => SortField::CreatedAt,
            "status" => SortField::Status,
            _ => {
                return Err(AppError::field(
                    "ordering",
                    format!("Cannot order by '{}'. Choices are: created_at, status.", name),
                ))
            }
        };

        Ok(Self { field, descending })
    }
}

/// Caller-supplied narrowing of a list query
#[derive(Debug, Clone)]
pub struct ListFilters<S> {
    /// Case-insensitive substring matched against waste type and location
    pub search: Option<String>,
    pub status: Option<S>,
    pub ordering: Ordering,
    pub pagination: PaginationQuery,
}

impl<S> Default for ListFilters<S> {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            ordering: Ordering::default(),
            pagination: PaginationQuery::default(),
        }
    }
}

/// A fully resolved list query: visibility plus filters.
///
/// Repositories compile this into their own query language; the visibility
/// is always part of the query and never applied afterwards.
#[derive(Debug, Clone)]
pub struct QuerySpec<S> {
    pub visibility: Visibility,
    pub filters: ListFilters<S>,
}

impl<S> QuerySpec<S> {
    pub fn for_principal(principal: &Principal, kind: ResourceKind, filters: ListFilters<S>) -> Self {
        Self {
            visibility: scope(principal, kind),
            filters,
        }
    }

    /// Search term with surrounding whitespace removed, if any is left
    pub fn search_term(&self) -> Option<&str> {
        self.filters
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
