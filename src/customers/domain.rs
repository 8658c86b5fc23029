use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    money::{Amount, AmountInput},
    pagination::PageParams,
    validation::{
        field_error, validate_interest_rate, validate_non_negative_amount,
        validate_positive_amount,
    },
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CustomerStatus {
    Active,
    Closed,
    Default,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown customer status: {0:?}")]
pub struct UnknownCustomerStatus(pub String);

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Closed => "CLOSED",
            Self::Default => "DEFAULT",
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = UnknownCustomerStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "CLOSED" => Ok(Self::Closed),
            "DEFAULT" => Ok(Self::Default),
            other => Err(UnknownCustomerStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    status
        .parse::<CustomerStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_status"))
}

/// A borrower with a loan being collected on.
#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub id: Uuid,
    pub account_number: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub issue_date: NaiveDate,
    /// Annual interest rate as a percentage.
    pub interest_rate: Decimal,
    pub tenure_months: i32,
    pub emi_due: Amount,
    pub loan_amount: Amount,
    /// The remaining amount owed. Only payment posting and administrative
    /// updates change it, and it never goes negative.
    pub outstanding_balance: Amount,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new customer provided by an administrator.
#[derive(Debug, Deserialize, Validate)]
pub struct NewCustomerData {
    #[validate(length(min = 1, max = 50))]
    pub account_number: String,

    #[validate(length(min = 1, max = 200))]
    pub customer_name: String,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    pub issue_date: NaiveDate,

    #[validate(custom = "validate_interest_rate")]
    pub interest_rate: AmountInput,

    #[validate(range(min = 1, max = 600))]
    pub tenure_months: i32,

    #[validate(custom = "validate_non_negative_amount")]
    pub emi_due: AmountInput,

    #[validate(custom = "validate_positive_amount")]
    pub loan_amount: AmountInput,

    /// Defaults to the loan amount when omitted.
    #[validate(custom = "validate_non_negative_amount")]
    pub outstanding_balance: Option<AmountInput>,

    #[validate(custom = "validate_status")]
    pub status: Option<String>,
}

/// A validated customer that has not been persisted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewCustomer {
    pub id: Uuid,
    pub account_number: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub issue_date: NaiveDate,
    pub interest_rate: Decimal,
    pub tenure_months: i32,
    pub emi_due: Amount,
    pub loan_amount: Amount,
    pub outstanding_balance: Amount,
    pub status: CustomerStatus,
}

impl NewCustomer {
    /// Construct a new customer from a set of input data.
    ///
    /// # Returns
    /// The new customer if the data is valid, or a set of
    /// [`ValidationErrors`] otherwise.
    pub fn from_data(mut data: NewCustomerData) -> Result<Self, ValidationErrors> {
        data.account_number = data.account_number.trim().to_owned();

        if let Err(validation_error) = data.validate() {
            debug!(?validation_error, "New customer failed validation.");

            return Err(validation_error);
        }

        let loan_amount = data
            .loan_amount
            .parse()
            .map_err(|_| field_error("loan_amount", "invalid_number"))?;
        let outstanding_balance = match data.outstanding_balance {
            Some(ref balance) => balance
                .parse()
                .map_err(|_| field_error("outstanding_balance", "invalid_number"))?,
            None => loan_amount,
        };

        if outstanding_balance > loan_amount {
            return Err(field_error("outstanding_balance", "exceeds_loan_amount"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            account_number: data.account_number,
            customer_name: data.customer_name,
            phone: data.phone,
            email: data.email,
            address: data.address,
            issue_date: data.issue_date,
            interest_rate: data
                .interest_rate
                .parse()
                .map_err(|_| field_error("interest_rate", "invalid_number"))?
                .value(),
            tenure_months: data.tenure_months,
            emi_due: data
                .emi_due
                .parse()
                .map_err(|_| field_error("emi_due", "invalid_number"))?,
            loan_amount,
            outstanding_balance,
            status: match data.status {
                Some(ref status) => status
                    .parse()
                    .map_err(|_| field_error("status", "invalid_status"))?,
                None => CustomerStatus::Active,
            },
        })
    }
}

/// Administrative changes to a customer. Omitted fields are left as they are.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CustomerUpdateData {
    #[validate(length(min = 1, max = 200))]
    pub customer_name: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(custom = "validate_non_negative_amount")]
    pub emi_due: Option<AmountInput>,

    #[validate(custom = "validate_status")]
    pub status: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomerUpdate {
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emi_due: Option<Amount>,
    pub status: Option<CustomerStatus>,
}

impl CustomerUpdate {
    pub fn from_data(data: CustomerUpdateData) -> Result<Self, ValidationErrors> {
        if let Err(validation_error) = data.validate() {
            debug!(?validation_error, "Customer update failed validation.");

            return Err(validation_error);
        }

        Ok(Self {
            emi_due: data
                .emi_due
                .as_ref()
                .map(AmountInput::parse)
                .transpose()
                .map_err(|_| field_error("emi_due", "invalid_number"))?,
            status: data
                .status
                .as_deref()
                .map(str::parse::<CustomerStatus>)
                .transpose()
                .map_err(|_| field_error("status", "invalid_status"))?,
            customer_name: data.customer_name,
            phone: data.phone,
            email: data.email,
            address: data.address,
        })
    }
}

/// Query parameters for listing customers.
#[derive(Clone, Debug, Default)]
pub struct CustomerQuery {
    /// Only list customers in this lifecycle state.
    pub status: Option<CustomerStatus>,
    /// Case-insensitive match against the account number or name.
    pub search: Option<String>,
    pub page: PageParams,
}
