//! Entity records and their in-memory collections.
//!
//! Every entity type implements [`Record`], which is everything a management screen needs to
//! list, search, and render it. Types that can be created from a form also implement
//! [`Creatable`]. Relationships between records are denormalised name/id copies; the only
//! lookups are the ones creation forms perform to fill those copies in.

mod appointment;
mod billing;
mod clinical;
mod facilities;
mod people;

pub use appointment::{Appointment, AppointmentStatus};
pub use billing::{Bill, BillStatus, BillingSummary, PaymentMethod};
pub use clinical::{MedicalReport, Treatment};
pub use facilities::{Department, Occupant, Room, RoomSummary, RoomType, ALLOCATION_FIELDS};
pub use people::{Availability, Doctor, Gender, Patient, StaffMember, StaffRole};

pub(crate) use facilities::allocate_room;

use crate::access::{ActionSet, Column, Module};
use crate::auth::Identity;
use crate::config::CoreConfig;
use crate::error::{HmsError, HmsResult, ValidationError};
use crate::forms::{invalid, FormDraft, FormField};
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_uuid::{IdSequence, RecordId};
use serde::Serialize;

/// A closed set of values with fixed display labels.
pub trait Labelled: Copy + 'static {
    const ALL: &'static [Self];

    fn label(&self) -> &'static str;
}

/// Parses a form value against a [`Labelled`] set, ignoring case.
pub fn parse_labelled<T: Labelled>(field: &'static str, raw: &str) -> Result<T, ValidationError> {
    let raw = raw.trim();
    T::ALL
        .iter()
        .copied()
        .find(|value| value.label().eq_ignore_ascii_case(raw))
        .ok_or_else(|| {
            let allowed = T::ALL
                .iter()
                .map(Labelled::label)
                .collect::<Vec<_>>()
                .join(", ");
            invalid(field, format!("'{raw}' is not one of {allowed}"))
        })
}

/// A search term, kept both as typed and case-folded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Case-insensitive substring match.
    pub fn matches(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }

    /// Substring match on the text exactly as typed.
    pub fn matches_exact(&self, haystack: &str) -> bool {
        haystack.contains(&self.raw)
    }

    /// True when the term is empty or any of `fields` matches case-insensitively.
    pub fn matches_any<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.is_empty() || fields.into_iter().any(|field| self.matches(field))
    }
}

/// The current search state of a screen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    pub term: SearchTerm,
    /// Exact staff-role filter, honoured by the staff screen.
    pub staff_role: Option<StaffRole>,
    /// Inclusive date bounds, honoured by records that carry a date.
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl Filter {
    pub fn in_date_range(&self, date: NaiveDate) -> bool {
        self.date_from.is_none_or(|from| date >= from) && self.date_to.is_none_or(|to| date <= to)
    }
}

/// Everything a screen needs to list one entity type.
pub trait Record: Clone + Serialize + 'static {
    const MODULE: Module;

    fn id(&self) -> RecordId;

    /// The rendered text of one column. Columns the record does not carry render as `-`.
    fn cell(&self, column: Column, cfg: &CoreConfig) -> String;

    fn matches(&self, filter: &Filter) -> bool;

    /// Narrows the screen-level actions to those that apply to this row.
    fn row_actions(&self, granted: &ActionSet) -> ActionSet {
        granted.clone()
    }

    /// The patient this row belongs to, for records a patient sees only their own of.
    fn patient_name(&self) -> Option<&str> {
        None
    }

    fn collection(store: &HospitalStore) -> &Collection<Self>;

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self>;
}

/// Inputs a form builder may consult besides the draft itself.
#[derive(Clone, Copy, Debug)]
pub struct CreateContext<'a> {
    pub identity: &'a Identity,
    pub store: &'a HospitalStore,
    pub today: NaiveDate,
}

impl CreateContext<'_> {
    pub fn role(&self) -> Role {
        self.identity.role
    }
}

/// A record that has a creation form.
pub trait Creatable: Record {
    /// The ordered form fields shown to `role`.
    fn form_fields(role: Role) -> &'static [FormField];

    /// Builds the record from a draft whose required fields are already known to be present.
    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError>;
}

/// Resolves an id typed into a form against a collection.
pub(crate) fn lookup<'s, T: Record>(
    store: &'s HospitalStore,
    field: &'static str,
    raw: &str,
) -> Result<&'s T, ValidationError> {
    let id = raw
        .parse::<RecordId>()
        .map_err(|_| invalid(field, format!("'{}' is not a record id", raw.trim())))?;
    T::collection(store)
        .get(id)
        .ok_or_else(|| ValidationError::UnknownReference {
            field,
            id: id.to_string(),
        })
}

/// The records of one type held for a session, with their id allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection<T> {
    records: Vec<T>,
    ids: IdSequence,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            ids: IdSequence::default(),
        }
    }
}

impl<T: Record> Collection<T> {
    /// Builds a collection from seed records, rejecting duplicate ids.
    ///
    /// The id sequence starts one past the largest seed id.
    pub fn from_records(records: Vec<T>) -> HmsResult<Self> {
        let mut collection = Self::default();
        for record in records {
            collection.append(record)?;
        }
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.records.iter_mut().find(|record| record.id() == id)
    }

    /// The id the next created record will receive.
    pub fn peek_next_id(&self) -> HmsResult<RecordId> {
        Ok(self.ids.peek()?)
    }

    /// Appends a record, advancing the id sequence past its id.
    pub(crate) fn append(&mut self, record: T) -> HmsResult<RecordId> {
        let id = record.id();
        if self.get(id).is_some() {
            return Err(HmsError::DuplicateRecordId {
                module: T::MODULE,
                id,
            });
        }
        self.ids.observe(id);
        self.records.push(record);
        Ok(id)
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Shared cell formatting helpers.
pub(crate) mod cells {
    use crate::constants::EMPTY_CELL;
    use chrono::{NaiveDate, NaiveTime};

    pub fn date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub fn time(time: NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    pub fn text(value: &str) -> String {
        if value.trim().is_empty() {
            EMPTY_CELL.to_owned()
        } else {
            value.to_owned()
        }
    }

    pub fn optional(value: Option<impl ToString>) -> String {
        value.map_or_else(|| EMPTY_CELL.to_owned(), |v| v.to_string())
    }

    pub fn empty() -> String {
        EMPTY_CELL.to_owned()
    }
}
