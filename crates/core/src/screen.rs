//! Management screens.
//!
//! A [`Screen`] is one module's list-and-form page for one role. It is either listing
//! (optionally filtered by a search) or composing a creation form. Every decision about what the
//! role may see or do comes from the resolved [`RoleView`]; the screen itself never branches on
//! the role.
//!
//! Screens own no records. The [`HospitalStore`] is lent in for each operation.

use crate::access::{resolve_view, Action, ActionSet, Column, Module, RoleView};
use crate::auth::Identity;
use crate::config::CoreConfig;
use crate::error::{HmsError, HmsResult};
use crate::forms::{FormDraft, FormField};
use crate::records::{
    allocate_room, Appointment, Bill, BillingSummary, Creatable, CreateContext, Department,
    Doctor, Filter, MedicalReport, Patient, Record, Room, RoomSummary, SearchTerm, StaffMember,
    StaffRole, Treatment, ALLOCATION_FIELDS,
};
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_uuid::RecordId;
use serde::Serialize;

/// Which form a screen is composing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Create,
    AllocateRoom,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composer {
    kind: FormKind,
    draft: FormDraft,
}

impl Composer {
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Listing,
    Composing(Composer),
}

/// One module's screen for one role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    role: Role,
    view: RoleView,
    filter: Filter,
    mode: Mode,
}

impl Screen {
    pub fn new(role: Role, module: Module) -> Self {
        Self {
            role,
            view: resolve_view(role, module),
            filter: Filter::default(),
            mode: Mode::Listing,
        }
    }

    pub fn module(&self) -> Module {
        self.view.module
    }

    pub fn view(&self) -> &RoleView {
        &self.view
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_composing(&self) -> bool {
        matches!(self.mode, Mode::Composing(_))
    }

    /// Replaces the search term. An empty term lists every row.
    pub fn set_search(&mut self, term: &str) {
        self.filter.term = SearchTerm::new(term);
    }

    pub fn set_staff_role_filter(&mut self, role: Option<StaffRole>) {
        self.filter.staff_role = role;
    }

    /// Sets inclusive date bounds; either side may be open.
    pub fn set_date_range(
        &mut self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> HmsResult<()> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(HmsError::InvalidInput(format!(
                    "date range starts after it ends ({from} > {to})"
                )));
            }
        }
        self.filter.date_from = from;
        self.filter.date_to = to;
        Ok(())
    }

    /// Opens the creation form with every field blank.
    ///
    /// # Errors
    ///
    /// Returns [`HmsError::PermissionDenied`] when the role may not create records here.
    pub fn open_form(&mut self) -> HmsResult<()> {
        let fields = match form_fields(self.view.module, self.role) {
            Some(fields) if self.view.allows(Action::Create) => fields,
            _ => return Err(self.denied(Action::Create)),
        };
        self.compose(FormKind::Create, fields);
        Ok(())
    }

    /// Opens the room allocation form.
    pub fn open_allocation_form(&mut self) -> HmsResult<()> {
        if self.view.module != Module::Rooms || !self.view.allows(Action::Allocate) {
            return Err(self.denied(Action::Allocate));
        }
        self.compose(FormKind::AllocateRoom, ALLOCATION_FIELDS);
        Ok(())
    }

    fn compose(&mut self, kind: FormKind, fields: &'static [FormField]) {
        tracing::debug!(module = %self.view.module, ?kind, "form opened");
        self.mode = Mode::Composing(Composer {
            kind,
            draft: FormDraft::new(fields),
        });
    }

    pub fn set_field(&mut self, name: &str, value: &str) -> HmsResult<()> {
        match &mut self.mode {
            Mode::Composing(composer) => Ok(composer.draft.set(name, value)?),
            Mode::Listing => Err(HmsError::NoFormOpen),
        }
    }

    /// Closes the form and discards its values. Nothing is written.
    pub fn cancel(&mut self) {
        if self.is_composing() {
            tracing::debug!(module = %self.view.module, "form cancelled");
        }
        self.mode = Mode::Listing;
    }

    /// Submits the open form.
    ///
    /// On success the record is written to `store` and the screen returns to listing. On failure
    /// the form stays open with its values intact and `store` is unchanged.
    pub fn submit(
        &mut self,
        store: &mut HospitalStore,
        identity: &Identity,
        today: NaiveDate,
    ) -> HmsResult<RecordId> {
        let Mode::Composing(composer) = &self.mode else {
            return Err(HmsError::NoFormOpen);
        };

        let module = self.view.module;
        let result = composer
            .draft
            .check_required()
            .map_err(HmsError::from)
            .and_then(|()| match composer.kind {
                FormKind::Create => create_in(module, store, &composer.draft, identity, today),
                FormKind::AllocateRoom => {
                    let id = allocate_room(store, &composer.draft, today)?;
                    tracing::info!(room = %id, "room allocated");
                    Ok(id)
                }
            });

        match result {
            Ok(id) => {
                self.mode = Mode::Listing;
                Ok(id)
            }
            Err(err) => {
                tracing::debug!(%module, error = %err, "submission rejected");
                Err(err)
            }
        }
    }

    /// Serialises the currently visible reports as pretty JSON.
    pub fn export(&self, store: &HospitalStore, identity: &Identity) -> HmsResult<String> {
        if self.view.module != Module::Reports || !self.view.allows(Action::Export) {
            return Err(self.denied(Action::Export));
        }
        let reports = self.visible::<MedicalReport>(store, identity);
        tracing::info!(count = reports.len(), "reports exported");
        Ok(serde_json::to_string_pretty(&reports)?)
    }

    /// Builds what the presentation layer renders.
    pub fn view_model(
        &self,
        store: &HospitalStore,
        identity: &Identity,
        cfg: &CoreConfig,
    ) -> ViewModel {
        let rows = match self.view.module {
            Module::Appointments => self.rows::<Appointment>(store, identity, cfg),
            Module::Billing => self.rows::<Bill>(store, identity, cfg),
            Module::Patients => self.rows::<Patient>(store, identity, cfg),
            Module::Doctors => self.rows::<Doctor>(store, identity, cfg),
            Module::Departments => self.rows::<Department>(store, identity, cfg),
            Module::Rooms => self.rows::<Room>(store, identity, cfg),
            Module::Staff => self.rows::<StaffMember>(store, identity, cfg),
            Module::Treatments => self.rows::<Treatment>(store, identity, cfg),
            Module::Reports => self.rows::<MedicalReport>(store, identity, cfg),
            Module::Dashboard => Vec::new(),
        };

        ViewModel {
            module: self.view.module,
            title: self.view.title,
            columns: self.view.columns.clone(),
            rows,
            actions: self.view.actions.clone(),
            create_label: self.view.create_label(),
            search: self.filter.term.as_str().to_owned(),
            summary: self.summary(store, cfg),
            form: self.form_view(),
        }
    }

    fn summary(&self, store: &HospitalStore, cfg: &CoreConfig) -> Vec<StatCard> {
        match (self.view.module, self.role) {
            (Module::Billing, Role::Admin) => {
                let summary = BillingSummary::of(&store.bills);
                vec![
                    StatCard::new("Total Revenue", cfg.format_amount(summary.total_revenue)),
                    StatCard::new("Paid Bills", summary.paid_bills),
                    StatCard::new("Pending Bills", summary.pending_bills),
                ]
            }
            (Module::Rooms, _) => {
                let summary = RoomSummary::of(&store.rooms);
                vec![
                    StatCard::new("Available Rooms", summary.available),
                    StatCard::new("Occupied Rooms", summary.occupied),
                    StatCard::new("Total Rooms", summary.total),
                ]
            }
            _ => Vec::new(),
        }
    }

    fn form_view(&self) -> Option<FormView> {
        let Mode::Composing(composer) = &self.mode else {
            return None;
        };
        let title = match composer.kind {
            FormKind::Create => self.view.create_label().unwrap_or("New Record"),
            FormKind::AllocateRoom => "Allocate Room",
        };
        let fields = composer
            .draft
            .entries()
            .into_iter()
            .map(|(field, value)| FormFieldView {
                name: field.name,
                label: field.label,
                required: field.required,
                value,
            })
            .collect();
        Some(FormView {
            kind: composer.kind,
            title,
            fields,
        })
    }

    /// Records of type `T` this identity may see that match the current filter.
    fn visible<'s, T: Record>(&self, store: &'s HospitalStore, identity: &Identity) -> Vec<&'s T> {
        // Patients only ever see their own rows.
        let own_rows_only = self.role == Role::Patient;
        T::collection(store)
            .iter()
            .filter(|record| {
                !own_rows_only
                    || record
                        .patient_name()
                        .is_none_or(|name| name == identity.display_name.as_str())
            })
            .filter(|record| record.matches(&self.filter))
            .collect()
    }

    fn rows<T: Record>(
        &self,
        store: &HospitalStore,
        identity: &Identity,
        cfg: &CoreConfig,
    ) -> Vec<ViewRow> {
        let row_actions: ActionSet = self
            .view
            .actions
            .iter()
            .copied()
            .filter(|action| !matches!(action, Action::Create | Action::Export))
            .collect();

        self.visible::<T>(store, identity)
            .into_iter()
            .map(|record| ViewRow {
                id: record.id(),
                cells: self
                    .view
                    .columns
                    .iter()
                    .map(|column| record.cell(*column, cfg))
                    .collect(),
                actions: record.row_actions(&row_actions),
            })
            .collect()
    }

    fn denied(&self, action: Action) -> HmsError {
        HmsError::PermissionDenied {
            role: self.role,
            module: self.view.module,
            action,
        }
    }
}

fn form_fields(module: Module, role: Role) -> Option<&'static [FormField]> {
    let fields = match module {
        Module::Appointments => Appointment::form_fields(role),
        Module::Billing => Bill::form_fields(role),
        Module::Patients => Patient::form_fields(role),
        Module::Doctors => Doctor::form_fields(role),
        Module::Departments => Department::form_fields(role),
        Module::Rooms => Room::form_fields(role),
        Module::Staff => StaffMember::form_fields(role),
        Module::Treatments => Treatment::form_fields(role),
        Module::Reports | Module::Dashboard => return None,
    };
    Some(fields)
}

fn create_in(
    module: Module,
    store: &mut HospitalStore,
    draft: &FormDraft,
    identity: &Identity,
    today: NaiveDate,
) -> HmsResult<RecordId> {
    match module {
        Module::Appointments => create::<Appointment>(store, draft, identity, today),
        Module::Billing => create::<Bill>(store, draft, identity, today),
        Module::Patients => create::<Patient>(store, draft, identity, today),
        Module::Doctors => create::<Doctor>(store, draft, identity, today),
        Module::Departments => create::<Department>(store, draft, identity, today),
        Module::Rooms => create::<Room>(store, draft, identity, today),
        Module::Staff => create::<StaffMember>(store, draft, identity, today),
        Module::Treatments => create::<Treatment>(store, draft, identity, today),
        Module::Reports | Module::Dashboard => Err(HmsError::PermissionDenied {
            role: identity.role,
            module,
            action: Action::Create,
        }),
    }
}

/// Builds a record from `draft` under the collection's next id and appends it.
fn create<T: Creatable>(
    store: &mut HospitalStore,
    draft: &FormDraft,
    identity: &Identity,
    today: NaiveDate,
) -> HmsResult<RecordId> {
    let id = T::collection(store).peek_next_id()?;
    let record = {
        let ctx = CreateContext {
            identity,
            store,
            today,
        };
        T::from_form(id, draft, &ctx)?
    };
    let id = T::collection_mut(store).append(record)?;
    tracing::info!(module = %T::MODULE, %id, "record created");
    Ok(id)
}

/// A headline number shown above a list or on the dashboard home.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

impl StatCard {
    pub fn new(title: &'static str, value: impl ToString) -> Self {
        Self {
            title,
            value: value.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewRow {
    pub id: RecordId,
    pub cells: Vec<String>,
    pub actions: ActionSet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormFieldView {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FormView {
    pub kind: FormKind,
    pub title: &'static str,
    pub fields: Vec<FormFieldView>,
}

/// Everything one screen renders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub module: Module,
    pub title: &'static str,
    pub columns: Vec<Column>,
    pub rows: Vec<ViewRow>,
    /// Screen-level actions.
    pub actions: ActionSet,
    pub create_label: Option<&'static str>,
    pub search: String,
    pub summary: Vec<StatCard>,
    pub form: Option<FormView>,
}
