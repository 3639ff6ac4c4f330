//! Session-scoped hospital data.
//!
//! [`SeedData`] is the wire form of a snapshot: a YAML document with one list per collection
//! plus the credential table. It is parsed strictly (unknown keys are rejected and the failing
//! path is reported) and then split into a [`CredentialTable`] and a [`HospitalStore`].

use crate::auth::{CredentialTable, Identity};
use crate::constants::BUNDLED_SEED;
use crate::error::{HmsError, HmsResult};
use crate::records::{
    Appointment, Bill, Collection, Department, Doctor, MedicalReport, Patient, Room, StaffMember,
    Treatment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every entity collection of one session.
///
/// Owned by the dashboard and lent to the active screen, so records created on one screen are
/// visible on every other screen of the same session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HospitalStore {
    pub(crate) patients: Collection<Patient>,
    pub(crate) doctors: Collection<Doctor>,
    pub(crate) departments: Collection<Department>,
    pub(crate) appointments: Collection<Appointment>,
    pub(crate) treatments: Collection<Treatment>,
    pub(crate) bills: Collection<Bill>,
    pub(crate) rooms: Collection<Room>,
    pub(crate) staff: Collection<StaffMember>,
    pub(crate) reports: Collection<MedicalReport>,
}

impl HospitalStore {
    pub fn patients(&self) -> &Collection<Patient> {
        &self.patients
    }

    pub fn doctors(&self) -> &Collection<Doctor> {
        &self.doctors
    }

    pub fn departments(&self) -> &Collection<Department> {
        &self.departments
    }

    pub fn appointments(&self) -> &Collection<Appointment> {
        &self.appointments
    }

    pub fn treatments(&self) -> &Collection<Treatment> {
        &self.treatments
    }

    pub fn bills(&self) -> &Collection<Bill> {
        &self.bills
    }

    pub fn rooms(&self) -> &Collection<Room> {
        &self.rooms
    }

    pub fn staff(&self) -> &Collection<StaffMember> {
        &self.staff
    }

    pub fn reports(&self) -> &Collection<MedicalReport> {
        &self.reports
    }
}

/// A seed snapshot as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub accounts: Vec<Identity>,
    #[serde(default)]
    pub patients: Vec<Patient>,
    #[serde(default)]
    pub doctors: Vec<Doctor>,
    #[serde(default)]
    pub departments: Vec<Department>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub treatments: Vec<Treatment>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
    #[serde(default)]
    pub reports: Vec<MedicalReport>,
}

impl SeedData {
    /// Parses a YAML snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HmsError::SeedParse`] naming the path to the first field that does not match
    /// the schema (`<root>` when the document itself is malformed).
    pub fn parse(yaml_text: &str) -> HmsResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        serde_path_to_error::deserialize::<_, SeedData>(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() || path == "." {
                "<root>".to_owned()
            } else {
                path
            };
            HmsError::SeedParse {
                path,
                message: source.to_string(),
            }
        })
    }

    /// Reads and parses a YAML snapshot from disk.
    pub fn load(path: &Path) -> HmsResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| HmsError::SeedRead {
            path: path.to_path_buf(),
            source,
        })?;
        let seed = Self::parse(&text)?;
        tracing::info!(path = %path.display(), "loaded seed file");
        Ok(seed)
    }

    /// The snapshot compiled into the binary.
    pub fn bundled() -> HmsResult<Self> {
        let seed = Self::parse(BUNDLED_SEED)?;
        tracing::debug!("loaded bundled seed");
        Ok(seed)
    }

    /// Splits the snapshot into the credential table and a fresh store.
    ///
    /// # Errors
    ///
    /// Returns [`HmsError::DuplicateRecordId`] if any collection repeats an id.
    pub fn into_parts(self) -> HmsResult<(CredentialTable, HospitalStore)> {
        let credentials = CredentialTable::new(self.accounts);
        let store = HospitalStore {
            patients: Collection::from_records(self.patients)?,
            doctors: Collection::from_records(self.doctors)?,
            departments: Collection::from_records(self.departments)?,
            appointments: Collection::from_records(self.appointments)?,
            treatments: Collection::from_records(self.treatments)?,
            bills: Collection::from_records(self.bills)?,
            rooms: Collection::from_records(self.rooms)?,
            staff: Collection::from_records(self.staff)?,
            reports: Collection::from_records(self.reports)?,
        };

        tracing::info!(
            accounts = credentials.len(),
            patients = store.patients.len(),
            doctors = store.doctors.len(),
            appointments = store.appointments.len(),
            "seed snapshot ready"
        );
        Ok((credentials, store))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::access::Module;
    use medicore_uuid::RecordId;

    pub(crate) fn demo_store() -> HospitalStore {
        SeedData::bundled()
            .and_then(SeedData::into_parts)
            .map(|(_, store)| store)
            .expect("bundled seed is valid")
    }

    #[test]
    fn bundled_seed_populates_every_collection() {
        let store = demo_store();
        assert_eq!(store.patients().len(), 3);
        assert_eq!(store.doctors().len(), 4);
        assert_eq!(store.departments().len(), 5);
        assert_eq!(store.appointments().len(), 3);
        assert_eq!(store.treatments().len(), 3);
        assert_eq!(store.bills().len(), 3);
        assert_eq!(store.rooms().len(), 5);
        assert_eq!(store.staff().len(), 5);
        assert_eq!(store.reports().len(), 3);
    }

    #[test]
    fn next_id_follows_largest_seed_id() {
        let store = demo_store();
        assert_eq!(store.appointments().peek_next_id().unwrap(), RecordId::new(304).unwrap());
        assert_eq!(store.patients().peek_next_id().unwrap(), RecordId::new(204).unwrap());
        assert_eq!(store.departments().peek_next_id().unwrap(), RecordId::new(6).unwrap());
    }

    #[test]
    fn unknown_keys_are_rejected_with_their_path() {
        let yaml = "patients:\n  - id: 1\n    name: A\n    contact: '1'\n    registration_date: '2025-01-01'\n    ward: 3\n";
        let err = SeedData::parse(yaml).unwrap_err();
        match err {
            HmsError::SeedParse { path, message } => {
                assert!(path.starts_with("patients[0]"), "{path}");
                assert!(message.contains("ward"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unknown_collections_are_rejected() {
        let err = SeedData::parse("pharmacy: []\n").unwrap_err();
        assert!(matches!(err, HmsError::SeedParse { .. }));
    }

    #[test]
    fn empty_document_is_an_empty_snapshot() {
        let (credentials, store) = SeedData::parse("{}").unwrap().into_parts().unwrap();
        assert!(credentials.is_empty());
        assert_eq!(store, HospitalStore::default());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = "departments:\n  - {id: 1, name: A, description: x, head_of_department: y}\n  - {id: 1, name: B, description: x, head_of_department: y}\n";
        let err = SeedData::parse(yaml).unwrap().into_parts().unwrap_err();
        assert!(matches!(
            err,
            HmsError::DuplicateRecordId {
                module: Module::Departments,
                ..
            }
        ));
    }

    #[test]
    fn seed_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.yaml");
        std::fs::write(&path, "staff: []\n").unwrap();
        assert!(SeedData::load(&path).unwrap().staff.is_empty());

        let missing = dir.path().join("missing.yaml");
        assert!(matches!(
            SeedData::load(&missing),
            Err(HmsError::SeedRead { .. })
        ));
    }
}
