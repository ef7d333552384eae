use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::shared::constants::{ROLE_ADMIN, ROLE_CITIZEN, ROLE_OFFICER};

/// Domain role carried by a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Officer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Citizen, Role::Officer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => ROLE_CITIZEN,
            Role::Officer => ROLE_OFFICER,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Parse a request-supplied role, reporting failures against the `role` field
    pub fn parse_choice(value: &str) -> Result<Self, AppError> {
        value
            .parse()
            .map_err(|_| AppError::field("role", format!("\"{}\" is not a valid choice.", value)))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UnknownRole(value.to_string()))
    }
}

/// Database model for profile
///
/// `role` is stored as free text; values outside [`Role`] are tolerated on read
/// and treated as unrecognised by the access policy.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub identity_id: Uuid,
    pub role: String,
    pub phone_number: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Attributes for a profile that is about to be created
#[derive(Debug, Clone)]
pub struct ProfileSeed {
    pub role: Role,
    pub phone_number: String,
    pub location: Option<String>,
}

impl ProfileSeed {
    /// Profile created when an identity turns out to have none
    pub fn default_for(role: Role) -> Self {
        Self {
            role,
            phone_number: String::new(),
            location: None,
        }
    }
}

/// Partial profile update (None leaves the column untouched)
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub role: Option<Role>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_text() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
        }
        assert_eq!(
            "superhero".parse::<Role>(),
            Err(UnknownRole("superhero".to_string()))
        );
        assert!("Citizen".parse::<Role>().is_err());
    }

    #[test]
    fn test_parse_choice_reports_role_field() {
        assert_eq!(Role::parse_choice("officer").unwrap(), Role::Officer);
        match Role::parse_choice("mayor") {
            Err(AppError::FieldValidation(fields)) => {
                assert_eq!(
                    fields.get("role"),
                    Some(&vec!["\"mayor\" is not a valid choice.".to_string()])
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_profile_with_unknown_role_reads_as_none() {
        let profile = Profile {
            id: Uuid::new_v4(),
            identity_id: Uuid::new_v4(),
            role: "inspector".to_string(),
            phone_number: String::new(),
            location: None,
            created_at: Utc::now(),
        };
        assert_eq!(profile.role(), None);
    }
}
