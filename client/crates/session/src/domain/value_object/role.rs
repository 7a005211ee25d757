use serde::{Deserialize, Serialize};
use std::fmt;

/// Resolved identity kind of the current visitor
///
/// Only the role resolver produces `Student` or `Institute`; UI code never
/// sets a role directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Anonymous,
    Student,
    Institute,
}

impl Role {
    /// Roles probed during resolution, in probe order
    pub const PROBE_ORDER: [Role; 2] = [Role::Student, Role::Institute];

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::Student => "student",
            Role::Institute => "institute",
        }
    }

    /// Parse a persisted `userType` value
    ///
    /// Accepts the bare code or its JSON-quoted form. `Anonymous` is never
    /// persisted, so it does not parse.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().trim_matches('"') {
            "student" => Some(Role::Student),
            "institute" => Some(Role::Institute),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_authenticated(&self) -> bool {
        !matches!(self, Role::Anonymous)
    }

    /// Endpoint returning this role's profile
    pub const fn profile_path(&self) -> Option<&'static str> {
        match self {
            Role::Anonymous => None,
            Role::Student => Some("/api/students/profile"),
            Role::Institute => Some("/api/institutes/profile"),
        }
    }

    /// Endpoint tearing down this role's server-side session
    pub const fn logout_path(&self) -> Option<&'static str> {
        match self {
            Role::Anonymous => None,
            Role::Student => Some("/api/students/logout"),
            Role::Institute => Some("/api/institutes/logout"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
