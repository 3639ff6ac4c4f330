use super::{
    cells, lookup, parse_labelled, Collection, CreateContext, Creatable, Filter, Labelled,
    Patient, Record,
};
use crate::access::{Action, ActionSet, Column, Module};
use crate::config::CoreConfig;
use crate::error::ValidationError;
use crate::forms::{FormDraft, FormField};
use crate::money::Money;
use crate::role::Role;
use crate::store::HospitalStore;
use chrono::NaiveDate;
use medicore_uuid::RecordId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl Labelled for PaymentMethod {
    const ALL: &'static [Self] = &[Self::Cash, Self::Card, Self::Online];

    fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Card",
            Self::Online => "Online",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillStatus {
    Paid,
    Pending,
    Unpaid,
}

impl Labelled for BillStatus {
    const ALL: &'static [Self] = &[Self::Paid, Self::Pending, Self::Unpaid];

    fn label(&self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bill {
    pub id: RecordId,
    pub patient_name: String,
    /// Weak reference; never checked against the treatments collection.
    pub treatment_id: RecordId,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub status: BillStatus,
}

const FIELDS: &[FormField] = &[
    FormField::required("patientId", "Patient"),
    FormField::required("treatmentId", "Treatment ID"),
    FormField::required("amount", "Amount"),
    FormField::required("paymentMethod", "Payment Method"),
];

impl Record for Bill {
    const MODULE: Module = Module::Billing;

    fn id(&self) -> RecordId {
        self.id
    }

    fn cell(&self, column: Column, cfg: &CoreConfig) -> String {
        match column {
            Column::BillId | Column::Id => self.id.to_string(),
            Column::Patient => self.patient_name.clone(),
            Column::TreatmentId => self.treatment_id.to_string(),
            Column::Amount => cfg.format_amount(self.amount),
            Column::Date => cells::date(self.date),
            Column::PaymentMethod => self.payment_method.to_string(),
            Column::Status => self.status.to_string(),
            _ => cells::empty(),
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        filter.in_date_range(self.date)
            && filter.term.matches_any([
                self.patient_name.as_str(),
                self.payment_method.label(),
                self.status.label(),
            ])
    }

    fn row_actions(&self, granted: &ActionSet) -> ActionSet {
        granted
            .iter()
            .copied()
            .filter(|action| *action != Action::Pay || self.status == BillStatus::Pending)
            .collect()
    }

    fn patient_name(&self) -> Option<&str> {
        Some(&self.patient_name)
    }

    fn collection(store: &HospitalStore) -> &Collection<Self> {
        &store.bills
    }

    fn collection_mut(store: &mut HospitalStore) -> &mut Collection<Self> {
        &mut store.bills
    }
}

impl Creatable for Bill {
    fn form_fields(_role: Role) -> &'static [FormField] {
        FIELDS
    }

    /// New bills are `Pending` and dated today.
    fn from_form(
        id: RecordId,
        draft: &FormDraft,
        ctx: &CreateContext<'_>,
    ) -> Result<Self, ValidationError> {
        let patient: &Patient = lookup(ctx.store, "patientId", draft.required("patientId")?)?;

        Ok(Self {
            id,
            patient_name: patient.name.to_string(),
            treatment_id: draft.parse_required("treatmentId")?,
            amount: draft.money("amount")?,
            date: ctx.today,
            payment_method: parse_labelled("paymentMethod", draft.required("paymentMethod")?)?,
            status: BillStatus::Pending,
        })
    }
}

/// Revenue and status counts over a set of bills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    pub total_revenue: Money,
    pub paid_bills: usize,
    pub pending_bills: usize,
}

impl BillingSummary {
    pub fn of<'a>(bills: impl IntoIterator<Item = &'a Bill>) -> Self {
        bills
            .into_iter()
            .fold(Self::default(), |mut summary, bill| {
                summary.total_revenue = summary.total_revenue + bill.amount;
                match bill.status {
                    BillStatus::Paid => summary.paid_bills += 1,
                    BillStatus::Pending => summary.pending_bills += 1,
                    BillStatus::Unpaid => {}
                }
                summary
            })
    }
}
