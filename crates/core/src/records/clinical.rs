use super::{cells, lookup, Collection, CreateContext, Creatable, Filter, Patient, Record};
use crate::access::{Column, Module};
use crate::config::CoreConfig;
use crate::error::ValidationError;
use crate::forms::{FormDraft, FormField};
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_uuid::RecordId;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Treatment {
    pub id: RecordId,
    pub patient_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date: NaiveDate,
    pub medications: String,
    #[serde(default)]
    pub follow_up: bool,
}

const TREATMENT_FIELDS: &[FormField] = &[
    FormField::required("patientId", "Patient"),
    FormField::required("diagnosis", "Diagnosis"),
    FormField::optional("description", "Treatment Description"),
    FormField::required("medications", "Medications"),
    FormField::required("date", "Treatment Date"),
    FormField::optional("followUp", "Follow-up Required"),
];

impl Record for Treatment {
    const MODULE: Module = Module::Treatments;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Patient => self.patient_name.clone(),
            Column::Doctor => self.doctor_name.clone(),
            Column::Diagnosis => self.diagnosis.clone(),
            Column::Description => cells::optional(self.description.as_deref()),
            Column::Date => cells::date(self.date),
            Column::Medications => cells::text(&self.medications),
            Column::FollowUp if self.follow_up => "Yes".to_owned(),
            Column::FollowUp => "No".to_owned(),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.in_date_range(self.date)
            && filter.term.matches_any([
                self.patient_name.as_str(),
                self.doctor_name.as_str(),
                self.diagnosis.as_str(),
            ])
    }

    fn patient_name(&self) -> Option<&str> {
        Some(&self.patient_name)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.treatments
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.treatments
    }
}

impl Creatable for Treatment {
    fn form_fields(_role: Role) -> &'static [FormField] {
        TREATMENT_FIELDS
    }

    /// The treating doctor is whoever is signed in.
    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        let patient: &Patient = lookup(ctx.store, "patientId", draft.required("patientId")?)?;

        Ok(Self {
            id,
            patient_name: patient.name.to_string(),
            doctor_name: ctx.identity.display_name.to_string(),
            diagnosis: draft.required("diagnosis")?.to_owned(),
            description: draft.optional("description").map(str::to_owned),
            date: draft.date("date")?,
            medications: draft.required("medications")?.to_owned(),
            follow_up: draft.flag("followUp")?,
        })
    }
}

/// A medical report. Reports are read-only: there is no creation form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MedicalReport {
    pub id: RecordId,
    pub patient_name: String,
    pub treatment_id: RecordId,
    pub diagnosis: String,
    pub date: NaiveDate,
    pub medications: String,
    pub doctor_name: String,
}

impl Record for MedicalReport {
    const MODULE: Module = Module::Reports;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::ReportId | Column::Id => self.id.to_string(),
            Column::Date => cells::date(self.date),
            Column::Patient => self.patient_name.clone(),
            Column::Diagnosis => self.diagnosis.clone(),
            Column::Medications => cells::text(&self.medications),
            Column::Doctor => self.doctor_name.clone(),
            Column::TreatmentId => self.treatment_id.to_string(),
            _ => cells::empty(),
        }
    }

    /// Patient name or diagnosis, within the inclusive date range.
    fn matches(&self, filter: &Filter) -> bool {
        filter.in_date_range(self.date)
            && filter
                .term
                .matches_any([self.patient_name.as_str(), self.diagnosis.as_str()])
    }

    fn patient_name(&self) -> Option<&str> {
        Some(&self.patient_name)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.reports
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::identity;
    use crate::records::SearchTerm;
    use crate::store::tests::demo_store;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn report_ids(store: &HospitalStore, filter: &Filter) -> Vec<u32> {
        store
            .reports
            .iter()
            .filter(|r| r.matches(filter))
            .map(|r| r.id.get())
            .collect()
    }

    #[test]
    fn report_search_combines_term_and_dates() {
        let store = demo_store();
        let by_diagnosis = Filter {
            term: SearchTerm::new("MIGRAINE"),
            ..Filter::default()
        };
        assert_eq!(report_ids(&store, &by_diagnosis), vec![802]);

        let in_window = Filter {
            date_from: Some(day(11)),
            date_to: Some(day(20)),
            ..Filter::default()
        };
        assert_eq!(report_ids(&store, &in_window), vec![802, 803]);

        let both = Filter {
            term: SearchTerm::new("ali"),
            ..in_window
        };
        assert_eq!(report_ids(&store, &both), vec![803]);
    }

    #[test]
    fn treatment_doctor_is_the_signed_in_identity() {
        let store = demo_store();
        let doctor = identity(Role::Staff);
        let ctx = CreateContext {
            identity: &doctor,
            store: &store,
            today: day(23),
        };
        let mut draft = FormDraft::new(Treatment::form_fields(Role::Staff));
        draft.set("patientId", "203").unwrap();
        draft.set("diagnosis", "Fever").unwrap();
        draft.set("medications", "Paracetamol").unwrap();
        draft.set("date", "2025-05-23").unwrap();
        draft.set("followUp", "yes").unwrap();

        let treatment = Treatment::from_form(RecordId::new(404).unwrap(), &draft, &ctx).unwrap();
        assert_eq!(treatment.patient_name, "Zainab Ali");
        assert_eq!(treatment.doctor_name, "Dr. Ayesha Khan");
        assert!(treatment.follow_up);
        assert_eq!(treatment.cell(Column::FollowUp, &CoreConfig::default()), "Yes");
    }
}
