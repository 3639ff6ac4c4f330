use super::{cells, lookup, Collection, CreateContext, Creatable, Filter, Labelled, Record};
use crate::access::{Action, ActionSet, Column, Module};
use crate::config::CoreConfig;
use crate::error::ValidationError;
use crate::forms::{FormDraft, FormField};
use crate::records::{Doctor, Patient};
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::{NaiveDate, NaiveTime};
use medicore_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl Labelled for AppointmentStatus {
    const ALL: &'static [Self] = &[Self::Scheduled, Self::Completed, Self::Cancelled];

    fn label(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Appointment {
    pub id: RecordId,
    pub patient_name: String,
    pub doctor_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: String,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }
}

const STAFF_FIELDS: &[FormField] = &[
    FormField::required("patientId", "Patient"),
    FormField::required("doctorId", "Doctor"),
    FormField::required("date", "Date"),
    FormField::required("time", "Time"),
    FormField::optional("notes", "Notes"),
];

// Patients always book for themselves.
const PATIENT_FIELDS: &[FormField] = &[
    FormField::required("doctorId", "Doctor"),
    FormField::required("date", "Date"),
    FormField::required("time", "Time"),
    FormField::optional("notes", "Notes"),
];

impl Record for Appointment {
    const MODULE: Module = Module::Appointments;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Patient => self.patient_name.clone(),
            Column::Doctor => self.doctor_name.clone(),
            Column::Department => cells::optional(self.department.as_deref()),
            Column::Date => cells::date(self.date),
            Column::Time => cells::time(self.time),
            Column::Status => self.status.to_string(),
            Column::Notes => cells::text(&self.notes),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        let department = self.department.as_deref().unwrap_or_default();
        filter.in_date_range(self.date)
            && filter
                .term
                .matches_any([self.patient_name.as_str(), self.doctor_name.as_str(), department])
    }

    fn row_actions(&self, granted: &ActionSet) -> ActionSet {
        granted
            .iter()
            .copied()
            .filter(|action| match action {
                Action::Cancel | Action::Reschedule | Action::Complete => self.is_scheduled(),
                _ => true,
            })
            .collect()
    }

    fn patient_name(&self) -> Option<&str> {
        Some(&self.patient_name)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.appointments
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.appointments
    }
}

impl Creatable for Appointment {
    fn form_fields(role: Role) -> &'static [FormField] {
        match role {
            Role::Patient => PATIENT_FIELDS,
            Role::Admin | Role::Staff => STAFF_FIELDS,
        }
    }

    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        let patient_name = match ctx.role() {
            Role::Patient => own_patient_name(ctx),
            Role::Admin | Role::Staff => {
                let patient: &Patient = lookup(ctx.store, "patientId", draft.required("patientId")?)?;
                patient.name.to_string()
            }
        };
        let doctor: &Doctor = lookup(ctx.store, "doctorId", draft.required("doctorId")?)?;

        Ok(Self {
            id,
            patient_name,
            doctor_name: doctor.name.to_string(),
            department: doctor.department.clone(),
            date: draft.date("date")?,
            time: draft.time("time")?,
            status: AppointmentStatus::Scheduled,
            notes: draft.optional("notes").unwrap_or_default().to_owned(),
        })
    }
}

/// The booking patient's registered name, or the session display name when the identity has no
/// patient record.
fn own_patient_name(ctx: &CreateContext<'_>) -> String {
    ctx.identity
        .id
        .parse::<RecordId>()
        .ok()
        .and_then(|id| ctx.store.patients.get(id))
        .map(|patient| patient.name.to_string())
        .unwrap_or_else(|| ctx.identity.display_name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::identity;
    use crate::store::tests::demo_store;

    fn draft(role: Role, values: &[(&str, &str)]) -> FormDraft {
        let mut draft = FormDraft::new(Appointment::form_fields(role));
        for (name, value) in values {
            draft.set(name, *value).unwrap();
        }
        draft
    }

    #[test]
    fn booking_copies_names_and_department() {
        let store = demo_store();
        let admin = identity(Role::Admin);
        let ctx = CreateContext {
            identity: &admin,
            store: &store,
            today: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
        };
        let draft = draft(
            Role::Admin,
            &[
                ("patientId", "201"),
                ("doctorId", "101"),
                ("date", "2025-06-01"),
                ("time", "09:00"),
            ],
        );

        let id = RecordId::new(304).unwrap();
        let appointment = Appointment::from_form(id, &draft, &ctx).unwrap();
        assert_eq!(appointment.patient_name, "Ali Raza");
        assert_eq!(appointment.doctor_name, "Dr. Ayesha Khan");
        assert_eq!(appointment.department.as_deref(), Some("Cardiology"));
        assert_eq!(appointment.status, AppointmentStatus::Scheduled);
        assert_eq!(appointment.notes, "");
    }

    #[test]
    fn patient_books_for_themselves() {
        let store = demo_store();
        let patient = identity(Role::Patient);
        let ctx = CreateContext {
            identity: &patient,
            store: &store,
            today: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
        };
        assert!(Appointment::form_fields(Role::Patient)
            .iter()
            .all(|f| f.name != "patientId"));

        let draft = draft(
            Role::Patient,
            &[("doctorId", "102"), ("date", "2025-06-02"), ("time", "11:30")],
        );
        let appointment = Appointment::from_form(RecordId::new(400).unwrap(), &draft, &ctx).unwrap();
        assert_eq!(appointment.patient_name, "Ali Raza");
        assert_eq!(appointment.doctor_name, "Dr. Imran Malik");
    }

    #[test]
    fn unknown_doctor_is_reported() {
        let store = demo_store();
        let admin = identity(Role::Admin);
        let ctx = CreateContext {
            identity: &admin,
            store: &store,
            today: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
        };
        let draft = draft(
            Role::Admin,
            &[
                ("patientId", "201"),
                ("doctorId", "999"),
                ("date", "2025-06-01"),
                ("time", "09:00"),
            ],
        );
        assert_eq!(
            Appointment::from_form(RecordId::new(304).unwrap(), &draft, &ctx),
            Err(ValidationError::UnknownReference {
                field: "doctorId",
                id: "999".into()
            })
        );
    }

    #[test]
    fn only_scheduled_rows_can_change_state() {
        let store = demo_store();
        let granted: ActionSet = [Action::Complete, Action::Cancel, Action::Reschedule]
            .into_iter()
            .collect();

        let scheduled = store.appointments.get(RecordId::new(301).unwrap()).unwrap();
        assert_eq!(scheduled.row_actions(&granted), granted);

        let completed = store.appointments.get(RecordId::new(303).unwrap()).unwrap();
        assert!(completed.row_actions(&granted).is_empty());
    }
}
