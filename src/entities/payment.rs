//! Payments made to or by users, optionally settling an invoice

use crate::core::entity::{Data, Record, Reference};
use crate::core::field::FieldValue;
use crate::export::{CsvRecord, number_cell};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

wire_enum! {
    pub enum PaymentType {
        Cash => "cash",
        BankTransfer => "bank_transfer",
        Cheque => "cheque",
        Card => "card",
        Upi => "upi",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub payment_type: PaymentType,
    pub amount: f64,
    pub invoice_id: Option<Uuid>,
    pub reference: Option<String>,
    pub paid_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_entity!(Payment, "payment", "payments");

impl Data for Payment {
    fn belongs_to(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(FieldValue::Uuid(self.id)),
            "userId" => Some(FieldValue::Uuid(self.user_id)),
            "paymentType" => Some(FieldValue::String(self.payment_type.to_string())),
            "amount" => Some(FieldValue::Float(self.amount)),
            "invoiceId" => Some(self.invoice_id.into()),
            "reference" => Some(self.reference.clone().into()),
            "paidOn" => Some(FieldValue::Date(self.paid_on)),
            "createdAt" => Some(FieldValue::DateTime(self.created_at)),
            "updatedAt" => Some(FieldValue::DateTime(self.updated_at)),
            _ => None,
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = vec![Reference::to_one("userId", "user", self.user_id)];
        if let Some(invoice_id) = self.invoice_id {
            refs.push(Reference::to_one("invoiceId", "invoice", invoice_id));
        }
        refs
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayment {
    /// Defaults to the caller
    pub user_id: Option<Uuid>,
    pub payment_type: PaymentType,
    #[validate(range(min = 0.0))]
    pub amount: f64,
    pub invoice_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    /// Defaults to today (UTC)
    pub paid_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayment {
    pub payment_type: Option<PaymentType>,
    #[validate(range(min = 0.0))]
    pub amount: Option<f64>,
    pub invoice_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    pub paid_on: Option<NaiveDate>,
}

impl Record for Payment {
    type Create = CreatePayment;
    type Update = UpdatePayment;

    fn from_create(input: CreatePayment, author: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id.unwrap_or(author),
            payment_type: input.payment_type,
            amount: input.amount,
            invoice_id: input.invoice_id,
            reference: input.reference,
            paid_on: input.paid_on.unwrap_or_else(|| now.date_naive()),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_update(&mut self, input: UpdatePayment) {
        if let Some(payment_type) = input.payment_type {
            self.payment_type = payment_type;
        }
        if let Some(amount) = input.amount {
            self.amount = amount;
        }
        if input.invoice_id.is_some() {
            self.invoice_id = input.invoice_id;
        }
        if input.reference.is_some() {
            self.reference = input.reference;
        }
        if let Some(paid_on) = input.paid_on {
            self.paid_on = paid_on;
        }
    }
}

impl CsvRecord for Payment {
    fn csv_header() -> &'static [&'static str] {
        &["Date", "Type", "Amount", "Reference", "Invoice ID", "User ID"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.paid_on.to_string(),
            self.payment_type.to_string(),
            number_cell(self.amount),
            self.reference.clone().unwrap_or_default(),
            self.invoice_id.map(|id| id.to_string()).unwrap_or_default(),
            self.user_id.to_string(),
        ]
    }
}
