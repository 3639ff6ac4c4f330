use super::{
    cells, parse_labelled, Collection, CreateContext, Creatable, Filter, Labelled, Record,
};
use crate::access::{Action, ActionSet, Column, Module};
use crate::config::CoreConfig;
use crate::error::ValidationError;
use crate::forms::{invalid, FormDraft, FormField};
use crate::money::Money;
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_types::{EmailAddress, NonEmptyText};
use medicore_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Labelled for Gender {
    const ALL: &'static [Self] = &[Self::Male, Self::Female, Self::Other];

    fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    Available,
    Unavailable,
}

impl Labelled for Availability {
    const ALL: &'static [Self] = &[Self::Available, Self::Unavailable];

    fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Unavailable => "Unavailable",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    Nurse,
    Receptionist,
    Technician,
    Pharmacist,
    Cleaner,
}

impl Labelled for StaffRole {
    const ALL: &'static [Self] = &[
        Self::Nurse,
        Self::Receptionist,
        Self::Technician,
        Self::Pharmacist,
        Self::Cleaner,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::Nurse => "Nurse",
            Self::Receptionist => "Receptionist",
            Self::Technician => "Technician",
            Self::Pharmacist => "Pharmacist",
            Self::Cleaner => "Cleaner",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for StaffRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_labelled("role", s)
    }
}

/// A registered patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Patient {
    pub id: RecordId,
    pub name: NonEmptyText,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age: Option<u32>,
    pub contact: String,
    #[serde(default)]
    pub email: Option<EmailAddress>,
    #[serde(default)]
    pub blood_group: Option<String>,
    pub registration_date: NaiveDate,
}

const PATIENT_FIELDS: &[FormField] = &[
    FormField::required("name", "Full Name"),
    FormField::optional("gender", "Gender"),
    FormField::optional("age", "Age"),
    FormField::required("contact", "Contact Number"),
    FormField::required("email", "Email"),
    FormField::optional("bloodGroup", "Blood Group"),
];

impl Record for Patient {
    const MODULE: Module = Module::Patients;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Name => self.name.to_string(),
            Column::Gender => cells::optional(self.gender),
            Column::Age => cells::optional(self.age),
            Column::Contact => cells::text(&self.contact),
            Column::Email => cells::optional(self.email.as_ref()),
            Column::BloodGroup => cells::optional(self.blood_group.as_deref()),
            Column::Registration => cells::date(self.registration_date),
            _ => cells::empty(),
        }
    }

    /// Name matches ignoring case; contact numbers match as typed.
    fn matches(&self, filter: &Filter) -> bool {
        filter.term.is_empty()
            || filter.term.matches(self.name.as_str())
            || filter.term.matches_exact(&self.contact)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.patients
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.patients
    }
}

impl Creatable for Patient {
    fn form_fields(_role: Role) -> &'static [FormField] {
        PATIENT_FIELDS
    }

    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: text(draft, "name")?,
            gender: draft
                .optional("gender")
                .map(|raw| parse_labelled("gender", raw))
                .transpose()?,
            age: draft.parse_optional("age")?,
            contact: draft.required("contact")?.to_owned(),
            email: Some(email(draft, "email")?),
            blood_group: draft.optional("bloodGroup").map(str::to_owned),
            registration_date: ctx.today,
        })
    }
}

/// A doctor. The department is a name copy, not a reference.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Doctor {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub specialization: String,
    #[serde(default)]
    pub department: Option<String>,
    pub contact: String,
    #[serde(default)]
    pub email: Option<EmailAddress>,
    pub availability: Availability,
}

impl Doctor {
    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }
}

const DOCTOR_FIELDS: &[FormField] = &[
    FormField::required("name", "Full Name"),
    FormField::required("specialization", "Specialization"),
    FormField::optional("department", "Department"),
    FormField::required("contact", "Contact Number"),
    FormField::required("email", "Email"),
];

impl Record for Doctor {
    const MODULE: Module = Module::Doctors;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Name => self.name.to_string(),
            Column::Specialization => cells::text(&self.specialization),
            Column::Department => cells::optional(self.department.as_deref()),
            Column::Contact => cells::text(&self.contact),
            Column::Email => cells::optional(self.email.as_ref()),
            Column::Availability => self.availability.to_string(),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.term.matches_any([
            self.name.as_str(),
            self.specialization.as_str(),
            self.department.as_deref().unwrap_or_default(),
        ])
    }

    fn row_actions(&self, granted: &ActionSet) -> ActionSet {
        granted
            .iter()
            .copied()
            .filter(|action| *action != Action::Book || self.is_available())
            .collect()
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.doctors
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.doctors
    }
}

impl Creatable for Doctor {
    fn form_fields(_role: Role) -> &'static [FormField] {
        DOCTOR_FIELDS
    }

    /// New doctors start `Available`.
    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        _ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: text(draft, "name")?,
            specialization: draft.required("specialization")?.to_owned(),
            department: draft.optional("department").map(str::to_owned),
            contact: draft.required("contact")?.to_owned(),
            email: Some(email(draft, "email")?),
            availability: Availability::Available,
        })
    }
}

/// A non-clinical or nursing staff member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaffMember {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub role: StaffRole,
    pub gender: Gender,
    pub contact: String,
    pub salary: Money,
}

const STAFF_FIELDS: &[FormField] = &[
    FormField::required("name", "Full Name"),
    FormField::required("role", "Role"),
    FormField::required("gender", "Gender"),
    FormField::required("contact", "Contact Number"),
    FormField::required("salary", "Salary"),
];

impl Record for StaffMember {
    const MODULE: Module = Module::Staff;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Name => self.name.to_string(),
            Column::StaffRole => self.role.to_string(),
            Column::Gender => self.gender.to_string(),
            Column::Contact => cells::text(&self.contact),
            Column::Salary => cfg.format_amount(self.salary),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        let term_matches = filter.term.is_empty()
            || filter.term.matches(self.name.as_str())
            || filter.term.matches_exact(&self.contact);
        term_matches && filter.staff_role.is_none_or(|role| role == self.role)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.staff
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.staff
    }
}

impl Creatable for StaffMember {
    fn form_fields(_role: Role) -> &'static [FormField] {
        STAFF_FIELDS
    }

    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        _ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: text(draft, "name")?,
            role: parse_labelled("role", draft.required("role")?)?,
            gender: parse_labelled("gender", draft.required("gender")?)?,
            contact: draft.required("contact")?.to_owned(),
            salary: draft.money("salary")?,
        })
    }
}

pub(super) fn text(draft: &FormDraft, field: &'static str) -> Result<NonEmptyText, ValidationError> {
    NonEmptyText::new(draft.required(field)?).map_err(|e| invalid(field, e.to_string()))
}

fn email(draft: &FormDraft, field: &'static str) -> Result<EmailAddress, ValidationError> {
    EmailAddress::parse(draft.required(field)?).map_err(|e| invalid(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::identity;
    use crate::records::SearchTerm;
    use crate::store::tests::demo_store;

    fn search(term: &str) -> Filter {
        Filter {
            term: SearchTerm::new(term),
            ..Filter::default()
        }
    }

    fn names<T: Record>(store: &HospitalStore, filter: &Filter) -> Vec<String> {
        T::collection(store)
            .iter()
            .filter(|record| record.matches(filter))
            .map(|record| record.cell(Column::Name, &CoreConfig::default()))
            .collect()
    }

    #[test]
    fn patient_search_matches_name_ignoring_case() {
        let store = demo_store();
        assert_eq!(names::<Patient>(&store, &search("ali")), vec!["Ali Raza", "Zainab Ali"]);
        assert_eq!(names::<Patient>(&store, &search("raza")), vec!["Ali Raza"]);
        assert_eq!(names::<Patient>(&store, &search("")).len(), store.patients.len());
    }

    #[test]
    fn search_over_two_patients_keeps_only_the_match() {
        let patient = |id: u32, name: &str, contact: &str| Patient {
            id: RecordId::new(id).unwrap(),
            name: NonEmptyText::new(name).unwrap(),
            gender: None,
            age: None,
            contact: contact.into(),
            email: None,
            blood_group: None,
            registration_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        };
        let patients = [
            patient(1, "Ali Raza", "03211234567"),
            patient(2, "Fatima Noor", "03121234567"),
        ];

        let hits: Vec<_> = patients.iter().filter(|p| p.matches(&search("ali"))).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_str(), "Ali Raza");

        let all: Vec<_> = patients.iter().filter(|p| p.matches(&search(""))).collect();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn patient_search_matches_contact_substring() {
        let store = demo_store();
        assert_eq!(names::<Patient>(&store, &search("0312")), vec!["Fatima Noor"]);
    }

    #[test]
    fn doctor_search_covers_specialization_and_department() {
        let store = demo_store();
        assert_eq!(
            names::<Doctor>(&store, &search("neuro")),
            vec!["Dr. Imran Malik"]
        );
        assert_eq!(
            names::<Doctor>(&store, &search("orthopedics")),
            vec!["Dr. Sana Shah"]
        );
    }

    #[test]
    fn staff_role_filter_is_exact() {
        let store = demo_store();
        let filter = Filter {
            staff_role: Some(StaffRole::Receptionist),
            ..Filter::default()
        };
        assert_eq!(
            names::<StaffMember>(&store, &filter),
            vec!["Bilal Hussain", "Hina Qureshi"]
        );

        let filter = Filter {
            staff_role: Some(StaffRole::Receptionist),
            ..search("hina")
        };
        assert_eq!(names::<StaffMember>(&store, &filter), vec!["Hina Qureshi"]);
    }

    #[test]
    fn book_is_offered_only_for_available_doctors() {
        let store = demo_store();
        let granted = ActionSet::from([Action::Book]);
        let available = store.doctors.get(RecordId::new(101).unwrap()).unwrap();
        let unavailable = store.doctors.get(RecordId::new(103).unwrap()).unwrap();
        assert_eq!(available.row_actions(&granted), granted);
        assert!(unavailable.row_actions(&granted).is_empty());
    }

    #[test]
    fn new_patient_requires_valid_email_and_age() {
        let store = demo_store();
        let admin = identity(Role::Admin);
        let today = NaiveDate::from_ymd_opt(2025, 5, 23).unwrap();
        let ctx = CreateContext {
            identity: &admin,
            store: &store,
            today,
        };
        let mut draft = FormDraft::new(Patient::form_fields(Role::Admin));
        draft.set("name", "Usman Tariq").unwrap();
        draft.set("contact", "03001234567").unwrap();
        draft.set("email", "not-an-email").unwrap();

        let id = RecordId::new(204).unwrap();
        assert!(matches!(
            Patient::from_form(id, &draft, &ctx),
            Err(ValidationError::InvalidField { field: "email", .. })
        ));

        draft.set("email", "usman@example.com").unwrap();
        draft.set("age", "forty").unwrap();
        assert!(matches!(
            Patient::from_form(id, &draft, &ctx),
            Err(ValidationError::InvalidField { field: "age", .. })
        ));

        draft.set("age", "40").unwrap();
        draft.set("gender", "male").unwrap();
        let patient = Patient::from_form(id, &draft, &ctx).unwrap();
        assert_eq!(patient.registration_date, today);
        assert_eq!(patient.gender, Some(Gender::Male));
        assert_eq!(patient.blood_group, None);
    }

    #[test]
    fn new_doctor_starts_available() {
        let store = demo_store();
        let admin = identity(Role::Admin);
        let ctx = CreateContext {
            identity: &admin,
            store: &store,
            today: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
        };
        let mut draft = FormDraft::new(Doctor::form_fields(Role::Admin));
        draft.set("name", "Dr. Maria Siddiqui").unwrap();
        draft.set("specialization", "Dermatologist").unwrap();
        draft.set("contact", "03009876543").unwrap();
        draft.set("email", "maria.siddiqui@hospital.com").unwrap();

        let doctor = Doctor::from_form(RecordId::new(105).unwrap(), &draft, &ctx).unwrap();
        assert!(doctor.is_available());
        assert_eq!(doctor.department, None);
        assert_eq!(doctor.cell(Column::Department, &CoreConfig::default()), "-");
    }
}
