//! # MEDICORE Core
//!
//! Core logic for the MEDICORE hospital management system.
//!
//! This crate contains everything behind the presentation layer:
//! - Role-scoped view resolution (titles, columns, actions and menus per role)
//! - Login against a static credential table, and signup validation
//! - Entity records, their collections and the session-scoped [`HospitalStore`]
//! - Management screens (list, search, create) and the dashboard shell
//! - Seed snapshot loading and runtime configuration
//!
//! **No I/O front end**: reading the environment, terminals and argument parsing belong in the
//! `medicore` CLI and the `medicore-run` binary.

pub mod access;
pub mod auth;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod money;
pub mod records;
pub mod role;
pub mod screen;
pub mod store;
mod text;

pub use access::{
    can_open, menu_for, resolve_view, resolve_view_for, Action, ActionSet, Column, MenuItem,
    Module, RoleView,
};
pub use auth::{signup, CredentialTable, Identity, Session, SessionHeader, SignupForm};
pub use config::CoreConfig;
pub use dashboard::{Dashboard, DashboardHome, Page};
pub use error::{AuthError, HmsError, HmsResult, SignupError, ValidationError};
pub use money::Money;
pub use role::Role;
pub use screen::{Screen, StatCard, ViewModel};
pub use store::{HospitalStore, SeedData};

pub use medicore_types::{EmailAddress, NonEmptyText};
pub use medicore_uuid::RecordId;
