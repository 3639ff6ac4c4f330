use super::people::text;
use super::{
    cells, lookup, parse_labelled, Collection, CreateContext, Creatable, Filter, Labelled,
    Patient, Record,
};
use crate::access::{Action, ActionSet, Column, Module};
use crate::config::CoreConfig;
use crate::error::ValidationError;
use crate::forms::{invalid, parse_date, FormDraft, FormField};
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_types::NonEmptyText;
use medicore_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A clinical department. The head and doctor count are recorded values, not derived.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Department {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub description: String,
    pub head_of_department: String,
    #[serde(default)]
    pub doctor_count: u32,
}

const DEPARTMENT_FIELDS: &[FormField] = &[
    FormField::required("name", "Department Name"),
    FormField::required("description", "Description"),
    FormField::required("headOfDepartment", "Head of Department"),
];

impl Record for Department {
    const MODULE: Module = Module::Departments;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::Name => self.name.to_string(),
            Column::Description => cells::text(&self.description),
            Column::HeadOfDepartment => cells::text(&self.head_of_department),
            Column::DoctorCount => self.doctor_count.to_string(),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.term.matches_any([
            self.name.as_str(),
            self.head_of_department.as_str(),
            self.description.as_str(),
        ])
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.departments
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.departments
    }
}

impl Creatable for Department {
    fn form_fields(_role: Role) -> &'static [FormField] {
        DEPARTMENT_FIELDS
    }

    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        _ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            id,
            name: text(draft, "name")?,
            description: draft.required("description")?.to_owned(),
            head_of_department: draft.required("headOfDepartment")?.to_owned(),
            doctor_count: 0,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    General,
    Private,
    #[serde(rename = "ICU")]
    Icu,
}

impl Labelled for RoomType {
    const ALL: &'static [Self] = &[Self::General, Self::Private, Self::Icu];

    fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Private => "Private",
            Self::Icu => "ICU",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Who holds an occupied room, and since when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Occupant {
    pub patient_name: String,
    pub allocation_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Room {
    pub id: RecordId,
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
    /// `None` while the room is vacant.
    #[serde(default)]
    pub occupant: Option<Occupant>,
}

impl Room {
    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }
}

const ROOM_FIELDS: &[FormField] = &[
    FormField::required("roomNumber", "Room Number"),
    FormField::required("type", "Room Type"),
    FormField::required("capacity", "Capacity"),
];

/// Fields of the room allocation form.
pub const ALLOCATION_FIELDS: &[FormField] = &[
    FormField::required("patientId", "Patient"),
    FormField::required("roomId", "Room"),
    FormField::optional("allocationDate", "Allocation Date"),
];

impl Record for Room {
    const MODULE: Module = Module::Rooms;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, _cfg: &CoreConfig) -> String {
        match column {
            Column::Id => self.id.to_string(),
            Column::RoomNumber => self.room_number.clone(),
            Column::RoomType => self.room_type.to_string(),
            Column::Capacity => self.capacity.to_string(),
            Column::Status if self.is_occupied() => "Occupied".to_owned(),
            Column::Status => "Available".to_owned(),
            Column::Patient => cells::optional(self.occupant.as_ref().map(|o| &o.patient_name)),
            Column::AllocationDate => {
                cells::optional(self.occupant.as_ref().map(|o| cells::date(o.allocation_date)))
            }
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        let occupant = self
            .occupant
            .as_ref()
            .map(|o| o.patient_name.as_str())
            .unwrap_or_default();
        filter
            .term
            .matches_any([self.room_number.as_str(), self.room_type.label(), occupant])
    }

    fn row_actions(&self, granted: &ActionSet) -> ActionSet {
        granted
            .iter()
            .copied()
            .filter(|action| match action {
                Action::Discharge => self.is_occupied(),
                Action::Allocate => !self.is_occupied(),
                _ => true,
            })
            .collect()
    }

    fn patient_name(&self) -> Option<&str> {
        self.occupant.as_ref().map(|o| o.patient_name.as_str())
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.rooms
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.rooms
    }
}

impl Creatable for Room {
    fn form_fields(_role: Role) -> &'static [FormField] {
        ROOM_FIELDS
    }

    /// New rooms start vacant.
    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        _ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        let capacity: u32 = draft.parse_required("capacity")?;
        if capacity == 0 {
            return Err(invalid("capacity", "capacity must be at least 1"));
        }

        Ok(Self {
            id,
            room_number: draft.required("roomNumber")?.to_owned(),
            room_type: parse_labelled("type", draft.required("type")?)?,
            capacity,
            occupant: None,
        })
    }
}

/// Room occupancy counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RoomSummary {
    pub available: usize,
    pub occupied: usize,
    pub total: usize,
}

impl RoomSummary {
    pub fn of<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Self {
        rooms.into_iter().fold(Self::default(), |mut summary, room| {
            summary.total += 1;
            if room.is_occupied() {
                summary.occupied += 1;
            } else {
                summary.available += 1;
            }
            summary
        })
    }
}

/// Applies a submitted allocation form: the named room must exist and be vacant.
///
/// The allocation date defaults to `today`.
pub(crate) fn allocate_room(
    store: &mut HospitalStore,
    draft: &FormDraft,
    today: NaiveDate,
) -> Result<RecordId, ValidationError> {
    let patient: &Patient = lookup(store, "patientId", draft.required("patientId")?)?;
    let patient_name = patient.name.to_string();

    let room: &Room = lookup(store, "roomId", draft.required("roomId")?)?;
    let room_id = room.id;
    if let Some(occupant) = &room.occupant {
        return Err(invalid(
            "roomId",
            format!("room {} is occupied by {}", room.room_number, occupant.patient_name),
        ));
    }

    let allocation_date = match draft.optional("allocationDate") {
        Some(raw) => parse_date("allocationDate", raw)?,
        None => today,
    };

    let room = store
        .rooms
        .get_mut(room_id)
        .ok_or_else(|| ValidationError::UnknownReference {
            field: "roomId",
            id: room_id.to_string(),
        })?;
    room.occupant = Some(Occupant {
        patient_name,
        allocation_date,
    });
    Ok(room_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::demo_store;

    fn allocation(values: &[(&str, &str)]) -> FormDraft {
        let mut draft = FormDraft::new(ALLOCATION_FIELDS);
        for (name, value) in values {
            draft.set(name, *value).unwrap();
        }
        draft
    }

    #[test]
    fn summary_counts_occupancy() {
        let store = demo_store();
        assert_eq!(
            RoomSummary::of(&store.rooms),
            RoomSummary {
                available: 3,
                occupied: 2,
                total: 5
            }
        );
        assert_eq!(RoomSummary::of(std::iter::empty::<&Room>()), RoomSummary::default());
    }

    #[test]
    fn vacant_room_can_be_allocated() {
        let mut store = demo_store();
        let today = NaiveDate::from_ymd_opt(2025, 5, 23).unwrap();
        let draft = allocation(&[("patientId", "202"), ("roomId", "602")]);

        let id = allocate_room(&mut store, &draft, today).unwrap();
        let room = store.rooms.get(id).unwrap();
        assert_eq!(
            room.occupant,
            Some(Occupant {
                patient_name: "Fatima Noor".into(),
                allocation_date: today
            })
        );
        assert_eq!(room.cell(Column::Status, &CoreConfig::default()), "Occupied");
    }

    #[test]
    fn occupied_room_is_rejected() {
        let mut store = demo_store();
        let before = store.rooms.clone();
        let draft = allocation(&[("patientId", "202"), ("roomId", "601")]);

        let err = allocate_room(&mut store, &draft, NaiveDate::from_ymd_opt(2025, 5, 23).unwrap())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidField { field: "roomId", .. }));
        assert_eq!(store.rooms, before);
    }

    #[test]
    fn room_actions_follow_occupancy() {
        let store = demo_store();
        let granted = ActionSet::from([Action::Edit, Action::Allocate, Action::Discharge]);
        let occupied = store.rooms.get(RecordId::new(601).unwrap()).unwrap();
        let vacant = store.rooms.get(RecordId::new(602).unwrap()).unwrap();
        assert_eq!(
            occupied.row_actions(&granted),
            ActionSet::from([Action::Edit, Action::Discharge])
        );
        assert_eq!(
            vacant.row_actions(&granted),
            ActionSet::from([Action::Edit, Action::Allocate])
        );
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let store = demo_store();
        let admin = crate::auth::tests::identity(Role::Admin);
        let ctx = CreateContext {
            identity: &admin,
            store: &store,
            today: NaiveDate::from_ymd_opt(2025, 5, 23).unwrap(),
        };
        let mut draft = FormDraft::new(Room::form_fields(Role::Admin));
        draft.set("roomNumber", "R106").unwrap();
        draft.set("type", "icu").unwrap();
        draft.set("capacity", "0").unwrap();
        assert!(Room::from_form(RecordId::new(606).unwrap(), &draft, &ctx).is_err());

        draft.set("capacity", "2").unwrap();
        let room = Room::from_form(RecordId::new(606).unwrap(), &draft, &ctx).unwrap();
        assert_eq!(room.room_type, RoomType::Icu);
        assert!(!room.is_occupied());
    }
}
