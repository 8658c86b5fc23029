use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{customers::http::reps::Customer, payments::domain};

#[derive(Clone, Debug, Serialize)]
pub struct Payment {
    pub id: Uuid,
    pub payment_reference: String,
    pub customer_id: Uuid,
    pub account_number: String,
    pub payment_date: DateTime<Utc>,
    pub payment_amount: String,
    pub status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&domain::Payment> for Payment {
    fn from(payment: &domain::Payment) -> Self {
        Self {
            id: payment.id,
            payment_reference: payment.payment_reference.clone(),
            customer_id: payment.customer_id,
            account_number: payment.account_number.clone(),
            payment_date: payment.payment_date,
            payment_amount: payment.payment_amount.format_value(),
            status: payment.status.to_string(),
            payment_method: payment.payment_method.to_string(),
            transaction_id: payment.transaction_id.clone(),
            remarks: payment.remarks.clone(),
            created_at: payment.created_at,
        }
    }
}

/// A freshly posted payment along with the customer's updated balance.
#[derive(Clone, Debug, Serialize)]
pub struct PostedPayment {
    pub payment: Payment,
    pub customer: Customer,
}

impl From<&domain::PostedPayment> for PostedPayment {
    fn from(posted: &domain::PostedPayment) -> Self {
        Self {
            payment: (&posted.payment).into(),
            customer: (&posted.customer).into(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub due_date: NaiveDate,
    pub due_amount: String,
    pub paid_amount: String,
    pub status: String,
}

impl From<&domain::schedule::ScheduleEntry> for ScheduleEntry {
    fn from(entry: &domain::schedule::ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            due_date: entry.due_date,
            due_amount: entry.due_amount.format_value(),
            paid_amount: entry.paid_amount.format_value(),
            status: entry.status.to_string(),
        }
    }
}
