//! The dashboard shell.
//!
//! A [`Dashboard`] is the whole signed-in experience: it owns the session, the configuration and
//! the session's [`HospitalStore`], tracks the active module, and forwards screen operations to
//! the active [`Screen`]. Changing module always lands somewhere valid: unknown ids and modules
//! outside the role's menu fall back to the dashboard home.

use crate::access::{can_open, menu_for, resolve_view, Action, MenuItem, Module};
use crate::auth::{Identity, Session, SessionHeader};
use crate::config::CoreConfig;
use crate::constants::INITIAL_MODULE;
use crate::error::{HmsError, HmsResult, ValidationError};
use crate::records::{lookup, BillStatus, Doctor, Record, RoomSummary, StaffRole};
use crate::role::Role;
use crate::screen::{Screen, StatCard, ViewModel};
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_uuid::RecordId;
use serde::Serialize;
use std::collections::BTreeSet;

/// The dashboard home page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardHome {
    pub header: SessionHeader,
    pub title: &'static str,
    pub greeting: String,
    pub subtitle: &'static str,
    pub menu: &'static [MenuItem],
    pub cards: Vec<StatCard>,
}

/// What the presentation layer should draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    Home(DashboardHome),
    Screen(ViewModel),
}

#[derive(Debug)]
pub struct Dashboard {
    cfg: CoreConfig,
    session: Session,
    store: HospitalStore,
    active: Module,
    screen: Option<Screen>,
}

impl Dashboard {
    pub fn new(cfg: CoreConfig, session: Session, store: HospitalStore) -> Self {
        Self {
            cfg,
            session,
            store,
            active: INITIAL_MODULE,
            screen: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &HospitalStore {
        &self.store
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn active_module(&self) -> Module {
        self.active
    }

    pub fn menu(&self) -> &'static [MenuItem] {
        menu_for(self.session.role())
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    /// Switches to the module with navigation id `id` and returns where it landed.
    ///
    /// The previous screen's search and form state are dropped, even when `id` names the module
    /// already active.
    pub fn change_module(&mut self, id: &str) -> Module {
        let role = self.session.role();
        let target = match Module::from_id(id) {
            Some(module) if can_open(role, module) => module,
            _ => {
                tracing::debug!(id, %role, "module not available, showing dashboard");
                Module::Dashboard
            }
        };

        self.active = target;
        self.screen = match target {
            Module::Dashboard => None,
            module => Some(Screen::new(role, module)),
        };
        tracing::info!(module = %target, "module changed");
        target
    }

    pub fn page(&self) -> Page {
        match &self.screen {
            Some(screen) => Page::Screen(screen.view_model(
                &self.store,
                self.session.identity(),
                &self.cfg,
            )),
            None => Page::Home(self.home()),
        }
    }

    pub fn home(&self) -> DashboardHome {
        let role = self.session.role();
        let identity = self.session.identity();
        let subtitle = match role {
            Role::Admin => "Manage your hospital operations efficiently",
            Role::Patient => "Track your health journey with us",
            Role::Staff => "Provide excellent healthcare services",
        };

        DashboardHome {
            header: self.session.header(),
            title: resolve_view(role, Module::Dashboard).title,
            greeting: format!("Welcome back, {}", identity.display_name),
            subtitle,
            menu: self.menu(),
            cards: home_cards(&self.store, identity, self.cfg.today()),
        }
    }

    fn screen_mut(&mut self) -> HmsResult<&mut Screen> {
        self.screen
            .as_mut()
            .ok_or_else(|| HmsError::InvalidInput("the dashboard home has no list".into()))
    }

    pub fn set_search(&mut self, term: &str) -> HmsResult<()> {
        self.screen_mut()?.set_search(term);
        Ok(())
    }

    pub fn set_staff_role_filter(&mut self, role: Option<StaffRole>) -> HmsResult<()> {
        self.screen_mut()?.set_staff_role_filter(role);
        Ok(())
    }

    pub fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> HmsResult<()> {
        self.screen_mut()?.set_date_range(from, to)
    }

    pub fn open_form(&mut self) -> HmsResult<()> {
        self.screen_mut()?.open_form()
    }

    pub fn open_allocation_form(&mut self) -> HmsResult<()> {
        self.screen_mut()?.open_allocation_form()
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> HmsResult<()> {
        self.screen_mut()?.set_field(name, value)
    }

    pub fn cancel(&mut self) {
        if let Some(screen) = self.screen.as_mut() {
            screen.cancel();
        }
    }

    pub fn submit(&mut self) -> HmsResult<RecordId> {
        let today = self.cfg.today();
        let screen = self.screen.as_mut().ok_or(HmsError::NoFormOpen)?;
        screen.submit(&mut self.store, self.session.identity(), today)
    }

    pub fn export(&self) -> HmsResult<String> {
        match &self.screen {
            Some(screen) => screen.export(&self.store, self.session.identity()),
            None => Err(HmsError::PermissionDenied {
                role: self.session.role(),
                module: Module::Dashboard,
                action: Action::Export,
            }),
        }
    }

    /// The doctors screen's booking shortcut: switches to appointments with the booking form
    /// open and the doctor filled in.
    pub fn book_doctor(&mut self, doctor_id: &str) -> HmsResult<()> {
        let role = self.session.role();
        let allowed = self
            .screen
            .as_ref()
            .is_some_and(|s| s.module() == Module::Doctors && s.view().allows(Action::Book));
        let denied = || HmsError::PermissionDenied {
            role,
            module: Module::Doctors,
            action: Action::Book,
        };
        if !allowed {
            return Err(denied());
        }

        let doctor: &Doctor = lookup(&self.store, "doctorId", doctor_id)?;
        if !doctor.is_available() {
            return Err(ValidationError::InvalidField {
                field: "doctorId",
                reason: format!("{} is not available", doctor.name),
            }
            .into());
        }
        let doctor_id = doctor.id().to_string();

        if self.change_module(Module::Appointments.id()) != Module::Appointments {
            return Err(denied());
        }
        self.open_form()?;
        self.set_field("doctorId", &doctor_id)
    }

    /// Ends the session. Every change made during the session is discarded with the store.
    pub fn logout(self) {
        self.session.logout();
    }
}

fn home_cards(store: &HospitalStore, identity: &Identity, today: NaiveDate) -> Vec<StatCard> {
    let name = identity.display_name.as_str();
    let appointments = store.appointments();
    let available_doctors = store.doctors().iter().filter(|d| d.is_available()).count();
    let todays = || appointments.iter().filter(move |a| a.date == today);

    match identity.role {
        Role::Admin => vec![
            StatCard::new("Total Patients", store.patients().len()),
            StatCard::new("Today's Appointments", todays().count()),
            StatCard::new("Available Doctors", available_doctors),
            StatCard::new("Available Rooms", RoomSummary::of(store.rooms()).available),
            StatCard::new(
                "Pending Bills",
                store
                    .bills()
                    .iter()
                    .filter(|b| b.status == BillStatus::Pending)
                    .count(),
            ),
            StatCard::new("Active Staff", store.staff().len()),
        ],
        Role::Patient => {
            let next = appointments
                .iter()
                .filter(|a| a.patient_name == name && a.is_scheduled() && a.date >= today)
                .min_by_key(|a| (a.date, a.time))
                .map(|a| {
                    format!(
                        "{} {} with {}",
                        a.date.format("%Y-%m-%d"),
                        a.time.format("%H:%M"),
                        a.doctor_name
                    )
                })
                .unwrap_or_else(|| "None scheduled".to_owned());

            vec![
                StatCard::new(
                    "My Appointments",
                    appointments.iter().filter(|a| a.patient_name == name).count(),
                ),
                StatCard::new(
                    "Pending Bills",
                    store
                        .bills()
                        .iter()
                        .filter(|b| b.patient_name == name && b.status == BillStatus::Pending)
                        .count(),
                ),
                StatCard::new(
                    "Medical Reports",
                    store.reports().iter().filter(|r| r.patient_name == name).count(),
                ),
                StatCard::new("Next Appointment", next),
            ]
        }
        Role::Staff => {
            let my_patients_today: BTreeSet<&str> = todays()
                .filter(|a| a.doctor_name == name)
                .map(|a| a.patient_name.as_str())
                .collect();

            vec![
                StatCard::new("My Patients Today", my_patients_today.len()),
                StatCard::new("Today's Appointments", todays().count()),
                StatCard::new("Available Doctors", available_doctors),
                StatCard::new(
                    "Treatments Done",
                    store
                        .treatments()
                        .iter()
                        .filter(|t| t.doctor_name == name)
                        .count(),
                ),
            ]
        }
    }
}
