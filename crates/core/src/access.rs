//! Role-scoped view resolution.
//!
//! Every management screen asks this module, and only this module, what a role may see and do:
//! the page title, the ordered columns, the screen-level actions, and the navigation menu.
//! Screens never branch on the role themselves.
//!
//! Unknown roles are denied by default: [`resolve_view_for`] maps an unparseable role string to
//! the restricted view (`View` only, patient-identity columns removed). It never falls back to
//! the administrator view.

use crate::role::Role;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// A functional area selectable from the navigation menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Dashboard,
    Patients,
    Doctors,
    Departments,
    Appointments,
    Treatments,
    Billing,
    Rooms,
    Staff,
    Reports,
}

impl Module {
    pub const ALL: [Module; 10] = [
        Module::Dashboard,
        Module::Patients,
        Module::Doctors,
        Module::Departments,
        Module::Appointments,
        Module::Treatments,
        Module::Billing,
        Module::Rooms,
        Module::Staff,
        Module::Reports,
    ];

    /// The navigation id used by the presentation layer.
    pub fn id(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Patients => "patients",
            Module::Doctors => "doctors",
            Module::Departments => "departments",
            Module::Appointments => "appointments",
            Module::Treatments => "treatments",
            Module::Billing => "billing",
            Module::Rooms => "rooms",
            Module::Staff => "staff",
            Module::Reports => "reports",
        }
    }

    /// Looks up a module by navigation id. Ids are matched exactly.
    pub fn from_id(id: &str) -> Option<Module> {
        Module::ALL.into_iter().find(|m| m.id() == id)
    }

    /// Role-neutral label.
    pub fn label(&self) -> &'static str {
        match self {
            Module::Dashboard => "Dashboard",
            Module::Patients => "Patients",
            Module::Doctors => "Doctors",
            Module::Departments => "Departments",
            Module::Appointments => "Appointments",
            Module::Treatments => "Treatments",
            Module::Billing => "Billing",
            Module::Rooms => "Rooms",
            Module::Staff => "Staff",
            Module::Reports => "Reports",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Something a role can do on a screen or a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Edit,
    Delete,
    Cancel,
    Reschedule,
    Complete,
    Pay,
    View,
    Export,
    Book,
    Allocate,
    Discharge,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Edit => "Edit",
            Action::Delete => "Delete",
            Action::Cancel => "Cancel",
            Action::Reschedule => "Reschedule",
            Action::Complete => "Complete",
            Action::Pay => "Pay Now",
            Action::View => "View",
            Action::Export => "Export",
            Action::Book => "Book Appointment",
            Action::Allocate => "Allocate",
            Action::Discharge => "Discharge",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_lowercase())
    }
}

pub type ActionSet = BTreeSet<Action>;

/// A column a screen can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    BillId,
    ReportId,
    Name,
    Patient,
    Doctor,
    Date,
    Time,
    Status,
    Notes,
    TreatmentId,
    Amount,
    PaymentMethod,
    Gender,
    Age,
    Contact,
    Email,
    BloodGroup,
    Registration,
    Specialization,
    Department,
    Availability,
    Description,
    HeadOfDepartment,
    DoctorCount,
    RoomNumber,
    RoomType,
    Capacity,
    AllocationDate,
    StaffRole,
    Salary,
    Diagnosis,
    Medications,
    FollowUp,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Id => "ID",
            Column::BillId => "Bill ID",
            Column::ReportId => "Report ID",
            Column::Name => "Name",
            Column::Patient => "Patient",
            Column::Doctor => "Doctor",
            Column::Date => "Date",
            Column::Time => "Time",
            Column::Status => "Status",
            Column::Notes => "Notes",
            Column::TreatmentId => "Treatment ID",
            Column::Amount => "Amount",
            Column::PaymentMethod => "Payment Method",
            Column::Gender => "Gender",
            Column::Age => "Age",
            Column::Contact => "Contact",
            Column::Email => "Email",
            Column::BloodGroup => "Blood Group",
            Column::Registration => "Registration",
            Column::Specialization => "Specialization",
            Column::Department => "Department",
            Column::Availability => "Availability",
            Column::Description => "Description",
            Column::HeadOfDepartment => "Head of Department",
            Column::DoctorCount => "Total Doctors",
            Column::RoomNumber => "Room Number",
            Column::RoomType => "Type",
            Column::Capacity => "Capacity",
            Column::AllocationDate => "Allocation Date",
            Column::StaffRole => "Role",
            Column::Salary => "Salary",
            Column::Diagnosis => "Diagnosis",
            Column::Medications => "Medications",
            Column::FollowUp => "Follow-up",
        }
    }
}

/// The resolved title, columns and screen-level actions for one (role, module) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoleView {
    pub module: Module,
    /// `None` when the view was resolved for an unrecognised role.
    pub role: Option<Role>,
    pub title: &'static str,
    pub columns: Vec<Column>,
    pub actions: ActionSet,
}

impl RoleView {
    pub fn allows(&self, action: Action) -> bool {
        self.actions.contains(&action)
    }

    /// Label of the button that opens the creation form, if the role may create here.
    pub fn create_label(&self) -> Option<&'static str> {
        if !self.allows(Action::Create) {
            return None;
        }
        let label = match (self.module, self.role) {
            (Module::Appointments, Some(Role::Patient)) => "Book Appointment",
            (Module::Appointments, _) => "Add Appointment",
            (Module::Billing, _) => "Generate Bill",
            (Module::Patients, _) => "Add New Patient",
            (Module::Doctors, _) => "Add New Doctor",
            (Module::Departments, _) => "Add New Department",
            (Module::Rooms, _) => "Add Room",
            (Module::Staff, _) => "Add New Staff",
            (Module::Treatments, _) => "Add Treatment Record",
            (Module::Reports | Module::Dashboard, _) => return None,
        };
        Some(label)
    }
}

/// Resolves the view for a known role.
pub fn resolve_view(role: Role, module: Module) -> RoleView {
    resolve(Some(role), module)
}

/// Resolves the view for a role given as free text.
///
/// Unrecognised roles get the restricted view.
pub fn resolve_view_for(role: &str, module: Module) -> RoleView {
    match role.parse::<Role>() {
        Ok(role) => resolve(Some(role), module),
        Err(_) => {
            tracing::debug!(role, %module, "unrecognised role, using restricted view");
            resolve(None, module)
        }
    }
}

fn resolve(role: Option<Role>, module: Module) -> RoleView {
    RoleView {
        module,
        role,
        title: title_for(role, module),
        columns: columns_for(role, module),
        actions: actions_for(role, module),
    }
}

fn title_for(role: Option<Role>, module: Module) -> &'static str {
    let Some(role) = role else {
        return module.label();
    };

    match (module, role) {
        (Module::Dashboard, _) => "Welcome to MEDICORE HMS",
        (Module::Appointments, Role::Admin) => "Appointment Management",
        (Module::Appointments, _) => "My Appointments",
        (Module::Billing, Role::Patient) => "My Bills",
        (Module::Billing, _) => "Billing Management",
        (Module::Patients, Role::Staff) => "Patient History",
        (Module::Patients, _) => "Patient Management",
        (Module::Doctors, Role::Admin) => "Doctor Management",
        (Module::Doctors, Role::Patient) => "Available Doctors",
        (Module::Doctors, Role::Staff) => "Department Doctors",
        (Module::Reports, Role::Patient) => "My Medical Reports",
        (Module::Reports, _) => "Medical Report History",
        (Module::Departments, _) => "Department Management",
        (Module::Rooms, _) => "Room Management",
        (Module::Staff, _) => "Staff Management",
        (Module::Treatments, _) => "Treatment Management",
    }
}

fn columns_for(role: Option<Role>, module: Module) -> Vec<Column> {
    use Column::*;

    let all: &[Column] = match module {
        Module::Dashboard => &[],
        Module::Appointments => &[Id, Patient, Doctor, Date, Time, Status, Notes],
        Module::Billing => &[
            BillId,
            Patient,
            TreatmentId,
            Amount,
            Date,
            PaymentMethod,
            Status,
        ],
        Module::Patients => &[Id, Name, Gender, Age, Contact, BloodGroup, Registration],
        Module::Doctors => &[Name, Specialization, Department, Contact, Email, Availability],
        Module::Departments => &[Name, Description, HeadOfDepartment, DoctorCount],
        Module::Rooms => &[
            RoomNumber,
            RoomType,
            Capacity,
            Status,
            Patient,
            AllocationDate,
        ],
        Module::Staff => &[Id, Name, StaffRole, Gender, Contact, Salary],
        Module::Treatments => &[
            Id,
            Patient,
            Doctor,
            Diagnosis,
            Date,
            Medications,
            FollowUp,
        ],
        Module::Reports => &[
            ReportId,
            Date,
            Patient,
            Diagnosis,
            Medications,
            Doctor,
            TreatmentId,
        ],
    };

    // A patient's rows are their own, so the patient column is redundant for them.
    let hide_patient = !matches!(role, Some(Role::Admin | Role::Staff));
    all.iter()
        .copied()
        .filter(|column| !(hide_patient && *column == Patient))
        .collect()
}

fn actions_for(role: Option<Role>, module: Module) -> ActionSet {
    use Action::*;

    let granted: &[Action] = match (role, module) {
        (_, Module::Dashboard) => &[],
        (None, _) => &[View],

        (Some(Role::Admin), Module::Appointments) => &[Create, Edit, Cancel, Reschedule],
        (Some(Role::Patient), Module::Appointments) => &[Create, Cancel, Reschedule],
        (Some(Role::Staff), Module::Appointments) => &[Complete, Cancel, Reschedule],

        (Some(Role::Admin), Module::Billing) => &[Create, Edit, View],
        (Some(Role::Patient), Module::Billing) => &[Pay, View],
        (Some(Role::Staff), Module::Billing) => &[View],

        (Some(Role::Admin), Module::Patients) => &[Create, Edit, Delete],
        (Some(Role::Staff), Module::Patients) => &[View],

        (Some(Role::Admin), Module::Doctors) => &[Create, Edit, Delete],
        (Some(Role::Patient), Module::Doctors) => &[Book],
        (Some(Role::Staff), Module::Doctors) => &[View],

        (Some(Role::Admin), Module::Departments) => &[Create, Edit, Delete],
        (Some(Role::Admin), Module::Rooms) => &[Create, Edit, Allocate, Discharge],
        (Some(Role::Admin), Module::Staff) => &[Create, Edit, Delete],

        (Some(Role::Admin), Module::Reports) => &[Export, View],
        (Some(Role::Patient), Module::Reports) => &[View],

        (Some(Role::Admin), Module::Treatments) => &[View],
        (Some(Role::Staff), Module::Treatments) => &[Create, Edit, View],

        _ => &[],
    };

    granted.iter().copied().collect()
}

/// One entry of a role's navigation menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub module: Module,
    pub label: &'static str,
}

const fn item(module: Module, label: &'static str) -> MenuItem {
    MenuItem { module, label }
}

const ADMIN_MENU: [MenuItem; 10] = [
    item(Module::Dashboard, "Dashboard"),
    item(Module::Patients, "Patients"),
    item(Module::Doctors, "Doctors"),
    item(Module::Departments, "Departments"),
    item(Module::Appointments, "Appointments"),
    item(Module::Treatments, "Treatments"),
    item(Module::Billing, "Billing"),
    item(Module::Rooms, "Rooms"),
    item(Module::Staff, "Staff"),
    item(Module::Reports, "Reports"),
];

const PATIENT_MENU: [MenuItem; 5] = [
    item(Module::Dashboard, "Dashboard"),
    item(Module::Appointments, "My Appointments"),
    item(Module::Doctors, "Doctors"),
    item(Module::Billing, "My Bills"),
    item(Module::Reports, "Medical Reports"),
];

const STAFF_MENU: [MenuItem; 5] = [
    item(Module::Dashboard, "Dashboard"),
    item(Module::Appointments, "My Appointments"),
    item(Module::Patients, "Patient History"),
    item(Module::Doctors, "Department Doctors"),
    item(Module::Treatments, "Treatments"),
];

/// The fixed, ordered navigation menu for a role.
pub fn menu_for(role: Role) -> &'static [MenuItem] {
    match role {
        Role::Admin => &ADMIN_MENU,
        Role::Patient => &PATIENT_MENU,
        Role::Staff => &STAFF_MENU,
    }
}

/// Whether `module` appears in the role's menu.
pub fn can_open(role: Role, module: Module) -> bool {
    menu_for(role).iter().any(|entry| entry.module == module)
}
