use crate::access::{Action, Module};
use crate::role::Role;
use medicore_uuid::RecordId;

/// Login failure. Deliberately carries no detail about which half of the credentials was wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. Use: admin/password, patient/password, or doctor/password")]
    InvalidCredentials,
}

/// Signup failures, reported one at a time in the order the checks run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Please select a role")]
    RoleNotSelected,
    #[error("role '{0}' cannot be chosen at signup")]
    RoleNotAllowed(String),
    #[error("{0} is required")]
    MissingRequiredField(&'static str),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Form submission failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequiredField(&'static str),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("{field} '{id}' does not match any record")]
    UnknownReference { field: &'static str, id: String },
    #[error("form has no field named '{0}'")]
    UnknownField(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HmsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{role} may not {action} in {module}")]
    PermissionDenied {
        role: Role,
        module: Module,
        action: Action,
    },
    #[error("no form is open")]
    NoFormOpen,
    #[error("duplicate {module} record id {id} in seed data")]
    DuplicateRecordId { module: Module, id: RecordId },
    #[error("failed to read seed file {path}: {source}", path = path.display())]
    SeedRead {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed data schema mismatch at {path}: {message}")]
    SeedParse { path: String, message: String },
    #[error("failed to serialize: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("identifier error: {0}")]
    Id(#[from] medicore_uuid::UuidError),
}

pub type HmsResult<T> = std::result::Result<T, HmsError>;
