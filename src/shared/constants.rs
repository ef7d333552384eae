/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Citizen role - submits waste reports and tracks their own
pub const ROLE_CITIZEN: &str = "citizen";

/// Officer role - triages every report and advances its status
pub const ROLE_OFFICER: &str = "officer";

/// Admin role - unrestricted, manages the waste type catalog and profiles
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// ACCOUNT CONSTANTS
// =============================================================================

/// Maximum username length
pub const USERNAME_MAX_LENGTH: u64 = 150;

/// Minimum password length accepted at registration
pub const PASSWORD_MIN_LENGTH: u64 = 8;

/// Generic login failure message (never reveals whether the username exists)
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
