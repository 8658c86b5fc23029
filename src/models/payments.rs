use std::convert::TryFrom;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    money::Amount,
    payments::domain::{self, schedule},
};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub payment_reference: String,
    pub customer_id: Uuid,
    pub account_number: String,
    pub payment_date: DateTime<Utc>,
    pub payment_amount: Decimal,
    pub status: String,
    pub payment_method: String,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<Payment> for domain::Payment {
    type Error = anyhow::Error;

    fn try_from(model: Payment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            payment_reference: model.payment_reference,
            customer_id: model.customer_id,
            account_number: model.account_number,
            payment_date: model.payment_date,
            payment_amount: Amount::from_decimal(model.payment_amount)
                .context("Invalid payment amount.")?,
            status: model.status.parse()?,
            payment_method: model.payment_method.parse()?,
            transaction_id: model.transaction_id,
            remarks: model.remarks,
            created_at: model.created_at,
        })
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ScheduleEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub due_date: NaiveDate,
    pub due_amount: Decimal,
    pub paid_amount: Decimal,
    pub status: String,
}

impl TryFrom<ScheduleEntry> for schedule::ScheduleEntry {
    type Error = anyhow::Error;

    fn try_from(model: ScheduleEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            customer_id: model.customer_id,
            due_date: model.due_date,
            due_amount: Amount::from_decimal(model.due_amount).context("Invalid due amount.")?,
            paid_amount: Amount::from_decimal(model.paid_amount)
                .context("Invalid paid amount.")?,
            status: model.status.parse()?,
        })
    }
}
