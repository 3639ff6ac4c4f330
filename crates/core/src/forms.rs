//! Creation form drafts.
//!
//! A draft holds the raw text the presentation layer typed into a form. Submitting checks only
//! that required fields are present; record builders then do the minimum parsing needed to get
//! typed values (numbers, dates, enum labels).

use crate::error::ValidationError;
use crate::money::Money;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Static description of one form input.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
}

impl FormField {
    pub const fn required(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            required: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormDraft {
    fields: &'static [FormField],
    values: BTreeMap<&'static str, String>,
}

impl FormDraft {
    pub fn new(fields: &'static [FormField]) -> Self {
        Self {
            fields,
            values: BTreeMap::new(),
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        self.fields
    }

    /// Sets a field value. Only fields declared for this form are accepted.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> Result<(), ValidationError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ValidationError::UnknownField(name.to_owned()))?;
        self.values.insert(field.name, value.into());
        Ok(())
    }

    /// The raw value as typed, or `""` if never set.
    pub fn raw(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    /// The trimmed value, or `None` when absent or blank.
    pub fn optional(&self, name: &str) -> Option<&str> {
        Some(self.raw(name).trim()).filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &'static str) -> Result<&str, ValidationError> {
        self.optional(name)
            .ok_or(ValidationError::MissingRequiredField(name))
    }

    /// Fails on the first required field (in form order) that is blank.
    pub fn check_required(&self) -> Result<(), ValidationError> {
        match self
            .fields
            .iter()
            .find(|f| f.required && self.optional(f.name).is_none())
        {
            Some(field) => Err(ValidationError::MissingRequiredField(field.name)),
            None => Ok(()),
        }
    }

    pub fn parse_required<T>(&self, name: &'static str) -> Result<T, ValidationError>
    where
        T: FromStr,
        T::Err: Display,
    {
        parse_value(name, self.required(name)?)
    }

    pub fn parse_optional<T>(&self, name: &'static str) -> Result<Option<T>, ValidationError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.optional(name).map(|v| parse_value(name, v)).transpose()
    }

    pub fn date(&self, name: &'static str) -> Result<NaiveDate, ValidationError> {
        parse_date(name, self.required(name)?)
    }

    pub fn time(&self, name: &'static str) -> Result<NaiveTime, ValidationError> {
        let raw = self.required(name)?;
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map_err(|_| invalid(name, format!("'{raw}' is not a time (HH:MM)")))
    }

    pub fn money(&self, name: &'static str) -> Result<Money, ValidationError> {
        Money::parse(self.required(name)?).map_err(|reason| invalid(name, reason))
    }

    /// Reads a checkbox-style value; absent means unchecked.
    pub fn flag(&self, name: &'static str) -> Result<bool, ValidationError> {
        match self.optional(name).map(str::to_ascii_lowercase).as_deref() {
            None | Some("false" | "no" | "off" | "0") => Ok(false),
            Some("true" | "yes" | "on" | "1") => Ok(true),
            Some(other) => Err(invalid(name, format!("'{other}' is not yes/no"))),
        }
    }

    /// Field/value pairs in form order, for rendering.
    pub fn entries(&self) -> Vec<(FormField, String)> {
        self.fields
            .iter()
            .map(|f| (*f, self.raw(f.name).to_owned()))
            .collect()
    }
}

pub(crate) fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| invalid(field, format!("'{}' is not a date (YYYY-MM-DD)", raw.trim())))
}

fn parse_value<T>(field: &'static str, raw: &str) -> Result<T, ValidationError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse::<T>().map_err(|e| invalid(field, e.to_string()))
}

pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FormField] = &[
        FormField::required("name", "Full Name"),
        FormField::required("contact", "Contact Number"),
        FormField::optional("age", "Age"),
    ];

    #[test]
    fn rejects_undeclared_fields() {
        let mut draft = FormDraft::new(FIELDS);
        assert_eq!(
            draft.set("salary", "100"),
            Err(ValidationError::UnknownField("salary".into()))
        );
    }

    #[test]
    fn reports_first_missing_field_in_form_order() {
        let mut draft = FormDraft::new(FIELDS);
        draft.set("contact", "0321").unwrap();
        assert_eq!(
            draft.check_required(),
            Err(ValidationError::MissingRequiredField("name"))
        );

        draft.set("name", "   ").unwrap();
        assert_eq!(
            draft.check_required(),
            Err(ValidationError::MissingRequiredField("name"))
        );

        draft.set("name", "Ali").unwrap();
        assert_eq!(draft.check_required(), Ok(()));
    }

    #[test]
    fn parses_optional_numbers() {
        let mut draft = FormDraft::new(FIELDS);
        assert_eq!(draft.parse_optional::<u32>("age"), Ok(None));

        draft.set("age", "34").unwrap();
        assert_eq!(draft.parse_optional::<u32>("age"), Ok(Some(34)));

        draft.set("age", "old").unwrap();
        assert!(matches!(
            draft.parse_optional::<u32>("age"),
            Err(ValidationError::InvalidField { field: "age", .. })
        ));
    }

    #[test]
    fn accepts_short_and_long_times() {
        const TIME: &[FormField] = &[FormField::required("time", "Time")];
        let mut draft = FormDraft::new(TIME);

        draft.set("time", "09:00").unwrap();
        assert_eq!(draft.time("time").unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        draft.set("time", "11:30:00").unwrap();
        assert_eq!(draft.time("time").unwrap(), NaiveTime::from_hms_opt(11, 30, 0).unwrap());

        draft.set("time", "noon").unwrap();
        assert!(draft.time("time").is_err());
    }

    #[test]
    fn flags_default_to_unchecked() {
        const FLAG: &[FormField] = &[FormField::optional("followUp", "Follow-up required")];
        let mut draft = FormDraft::new(FLAG);
        assert_eq!(draft.flag("followUp"), Ok(false));

        draft.set("followUp", "Yes").unwrap();
        assert_eq!(draft.flag("followUp"), Ok(true));

        draft.set("followUp", "maybe").unwrap();
        assert!(draft.flag("followUp").is_err());
    }
}
