use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::customers::domain;

#[derive(Clone, Debug, Serialize)]
pub struct Customer {
    pub id: Uuid,
    pub account_number: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub issue_date: NaiveDate,
    pub interest_rate: String,
    pub tenure_months: i32,
    pub emi_due: String,
    pub loan_amount: String,
    pub outstanding_balance: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&domain::Customer> for Customer {
    fn from(customer: &domain::Customer) -> Self {
        Self {
            id: customer.id,
            account_number: customer.account_number.clone(),
            customer_name: customer.customer_name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            address: customer.address.clone(),
            issue_date: customer.issue_date,
            interest_rate: format!("{:.2}", customer.interest_rate),
            tenure_months: customer.tenure_months,
            emi_due: customer.emi_due.format_value(),
            loan_amount: customer.loan_amount.format_value(),
            outstanding_balance: customer.outstanding_balance.format_value(),
            status: customer.status.to_string(),
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}
