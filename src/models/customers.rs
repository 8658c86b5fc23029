use std::convert::TryFrom;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{customers::domain, money::Amount};

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub account_number: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub issue_date: NaiveDate,
    pub interest_rate: Decimal,
    pub tenure_months: i32,
    pub emi_due: Decimal,
    pub loan_amount: Decimal,
    pub outstanding_balance: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Customer> for domain::Customer {
    type Error = anyhow::Error;

    fn try_from(model: Customer) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            account_number: model.account_number,
            customer_name: model.customer_name,
            phone: model.phone,
            email: model.email,
            address: model.address,
            issue_date: model.issue_date,
            interest_rate: model.interest_rate,
            tenure_months: model.tenure_months,
            emi_due: Amount::from_decimal(model.emi_due).context("Invalid EMI due.")?,
            loan_amount: Amount::from_decimal(model.loan_amount)
                .context("Invalid loan amount.")?,
            outstanding_balance: Amount::from_decimal(model.outstanding_balance)
                .context("Invalid outstanding balance.")?,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
