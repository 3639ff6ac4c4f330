//! Actor roles.

use crate::error::HmsError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The role an identity acts under for its whole session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Patient,
    Staff,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Patient, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Patient => "patient",
            Role::Staff => "staff",
        }
    }

    /// Upper-cased label shown in the session header.
    pub fn badge(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HmsError;

    /// Parses the lowercase role id. Anything else is rejected; callers that must cope with an
    /// unknown role use [`crate::access::resolve_view_for`], which falls back to the
    /// restricted view rather than guessing.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "admin" => Ok(Role::Admin),
            "patient" => Ok(Role::Patient),
            "staff" => Ok(Role::Staff),
            other => Err(HmsError::InvalidInput(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lowercase_ids_only() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" staff ".parse::<Role>().unwrap(), Role::Staff);
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn badge_is_upper_case() {
        assert_eq!(Role::Patient.badge(), "PATIENT");
    }
}
