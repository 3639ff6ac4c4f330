//! Login, signup and the session identity.
//!
//! Authentication is deliberately minimal: a static credential table and one shared demo
//! password. There is no hashing, rate limiting or lockout. Passwords are never logged.

use crate::constants::{APP_NAME, DEMO_PASSWORD, MIN_PASSWORD_LEN};
use crate::error::{AuthError, SignupError};
use crate::role::Role;
use medicore_types::{EmailAddress, NonEmptyText, TextError};
use medicore_uuid::OpaqueId;
use serde::{Deserialize, Serialize};

/// Who is signed in. The role is fixed for the whole session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    /// Opaque id. Seed accounts reuse the id of their patient or doctor record.
    pub id: String,
    pub username: NonEmptyText,
    pub role: Role,
    pub display_name: NonEmptyText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailAddress>,
}

/// The accounts that can log in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CredentialTable {
    accounts: Vec<Identity>,
}

impl CredentialTable {
    pub fn new(accounts: Vec<Identity>) -> Self {
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.accounts.iter().map(|a| a.username.as_str())
    }

    /// Checks a username/password pair.
    ///
    /// Usernames match exactly. Every account shares the same demo password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown username or a wrong password,
    /// without saying which.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        self.accounts
            .iter()
            .find(|account| account.username.as_str() == username)
            .filter(|_| password == DEMO_PASSWORD)
            .cloned()
            .ok_or(AuthError::InvalidCredentials)
    }
}

/// Raw signup form input.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Validates a signup form and creates a new identity.
///
/// Checks run in a fixed order and only the first failure is reported: password confirmation,
/// password length, role presence, role eligibility, then the remaining required fields and the
/// email shape. Only patients and staff may sign up.
pub fn signup(form: &SignupForm) -> Result<Identity, SignupError> {
    if form.password != form.confirm_password {
        return Err(SignupError::PasswordMismatch);
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SignupError::PasswordTooShort);
    }

    let role = match form.role.trim() {
        "" => return Err(SignupError::RoleNotSelected),
        "patient" => Role::Patient,
        "staff" => Role::Staff,
        other => return Err(SignupError::RoleNotAllowed(other.to_owned())),
    };

    let display_name =
        NonEmptyText::new(&form.name).map_err(|_| SignupError::MissingRequiredField("name"))?;
    if form.email.trim().is_empty() {
        return Err(SignupError::MissingRequiredField("email"));
    }
    let username = NonEmptyText::new(&form.username)
        .map_err(|_| SignupError::MissingRequiredField("username"))?;
    let email = EmailAddress::parse(&form.email).map_err(|err| match err {
        TextError::Empty => SignupError::MissingRequiredField("email"),
        TextError::InvalidEmail(raw) => SignupError::InvalidEmail(raw),
    })?;

    Ok(Identity {
        id: OpaqueId::new().to_string(),
        username,
        role,
        display_name,
        email: Some(email),
    })
}

/// What the header bar shows for the signed-in identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SessionHeader {
    pub app_name: &'static str,
    pub badge: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// An authenticated session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
}

impl Session {
    pub fn login(
        credentials: &CredentialTable,
        username: &str,
        password: &str,
    ) -> Result<Self, AuthError> {
        match credentials.authenticate(username, password) {
            Ok(identity) => {
                tracing::info!(username, role = %identity.role, "login succeeded");
                Ok(Self { identity })
            }
            Err(err) => {
                tracing::warn!(username, "login failed");
                Err(err)
            }
        }
    }

    /// Starts a session for a freshly signed-up identity.
    ///
    /// The new account is not added to any credential table; it lasts for this session only.
    pub fn from_signup(form: &SignupForm) -> Result<Self, SignupError> {
        let identity = signup(form).inspect_err(|err| {
            tracing::debug!(error = %err, "signup rejected");
        })?;
        tracing::info!(username = identity.username.as_str(), role = %identity.role, "signed up");
        Ok(Self { identity })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn header(&self) -> SessionHeader {
        SessionHeader {
            app_name: APP_NAME,
            badge: self.identity.role.badge(),
            display_name: self.identity.display_name.to_string(),
            email: self.identity.email.as_ref().map(|e| e.to_string()),
        }
    }

    /// Ends the session.
    pub fn logout(self) {
        tracing::info!(username = self.identity.username.as_str(), "logged out");
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::SeedData;

    pub(crate) fn credentials() -> CredentialTable {
        SeedData::bundled()
            .and_then(SeedData::into_parts)
            .map(|(credentials, _)| credentials)
            .expect("bundled seed is valid")
    }

    /// The seed account for `role`.
    pub(crate) fn identity(role: Role) -> Identity {
        let username = match role {
            Role::Admin => "admin",
            Role::Patient => "patient",
            Role::Staff => "doctor",
        };
        credentials()
            .authenticate(username, DEMO_PASSWORD)
            .expect("seed account exists")
    }

    fn form(password: &str, confirm: &str, role: &str) -> SignupForm {
        SignupForm {
            username: "newuser".into(),
            password: password.into(),
            confirm_password: confirm.into(),
            name: "New User".into(),
            email: "new.user@example.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn seed_accounts_authenticate() {
        let table = credentials();
        let admin = table.authenticate("admin", "password").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.id, "1");
        assert_eq!(admin.display_name.as_str(), "System Administrator");

        let doctor = table.authenticate("doctor", "password").unwrap();
        assert_eq!(doctor.role, Role::Staff);
        assert_eq!(doctor.display_name.as_str(), "Dr. Ayesha Khan");
    }

    #[test]
    fn wrong_password_or_unknown_user_fails() {
        let table = credentials();
        assert_eq!(
            table.authenticate("admin", "wrong"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            table.authenticate("nobody", "password"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            table.authenticate("Admin", "password"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn signup_checks_run_in_priority_order() {
        assert_eq!(
            signup(&form("abc12", "abc12", "patient")),
            Err(SignupError::PasswordTooShort)
        );
        assert_eq!(
            signup(&form("abcdef", "abcxyz", "patient")),
            Err(SignupError::PasswordMismatch)
        );
        // Mismatch wins over length.
        assert_eq!(signup(&form("abc", "xyz", "")), Err(SignupError::PasswordMismatch));
        assert_eq!(
            signup(&form("abcdef", "abcdef", "")),
            Err(SignupError::RoleNotSelected)
        );
        assert_eq!(
            signup(&form("abcdef", "abcdef", "admin")),
            Err(SignupError::RoleNotAllowed("admin".into()))
        );
    }

    #[test]
    fn signup_requires_name_email_and_username() {
        let mut input = form("abcdef", "abcdef", "staff");
        input.name = " ".into();
        assert_eq!(signup(&input), Err(SignupError::MissingRequiredField("name")));

        let mut input = form("abcdef", "abcdef", "staff");
        input.email = String::new();
        assert_eq!(signup(&input), Err(SignupError::MissingRequiredField("email")));

        let mut input = form("abcdef", "abcdef", "staff");
        input.username = String::new();
        assert_eq!(
            signup(&input),
            Err(SignupError::MissingRequiredField("username"))
        );

        let mut input = form("abcdef", "abcdef", "staff");
        input.email = "nope".into();
        assert_eq!(signup(&input), Err(SignupError::InvalidEmail("nope".into())));
    }

    #[test]
    fn signup_issues_fresh_canonical_ids() {
        let first = signup(&form("abcdef", "abcdef", "patient")).unwrap();
        let second = signup(&form("abcdef", "abcdef", "patient")).unwrap();
        assert_eq!(first.role, Role::Patient);
        assert!(OpaqueId::is_canonical(&first.id));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn header_shows_badge_and_contact() {
        let session = Session::login(&credentials(), "patient", "password").unwrap();
        let header = session.header();
        assert_eq!(header.app_name, "MEDICORE HMS");
        assert_eq!(header.badge, "PATIENT");
        assert_eq!(header.display_name, "Ali Raza");
        assert_eq!(header.email.as_deref(), Some("ali.raza@example.com"));
        session.logout();
    }

    #[test]
    fn signup_session_is_not_a_login() {
        let input = form("abcdef", "abcdef", "staff");
        let session = Session::from_signup(&input).unwrap();
        assert_eq!(session.role(), Role::Staff);
        assert!(credentials().authenticate("newuser", "abcdef").is_err());
    }
}
