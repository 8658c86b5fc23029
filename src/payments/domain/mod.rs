pub mod reference;
pub mod schedule;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, trace};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    customers::domain::Customer,
    money::{Amount, AmountInput},
    validation::{field_error, validate_positive_amount},
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Reversed,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown payment status: {0:?}")]
pub struct UnknownPaymentStatus(pub String);

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Reversed => "REVERSED",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownPaymentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "REVERSED" => Ok(Self::Reversed),
            other => Err(UnknownPaymentStatus(other.to_owned())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum PaymentMethod {
    #[default]
    Upi,
    Card,
    NetBanking,
    Cheque,
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("unknown payment method: {0:?}")]
pub struct UnknownPaymentMethod(pub String);

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upi => "UPI",
            Self::Card => "CARD",
            Self::NetBanking => "NET_BANKING",
            Self::Cheque => "CHEQUE",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPI" => Ok(Self::Upi),
            "CARD" => Ok(Self::Card),
            "NET_BANKING" => Ok(Self::NetBanking),
            "CHEQUE" => Ok(Self::Cheque),
            other => Err(UnknownPaymentMethod(other.to_owned())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_payment_method(method: &str) -> Result<(), ValidationError> {
    method
        .parse::<PaymentMethod>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_method"))
}

/// A persisted payment. Payments are immutable once created.
#[derive(Clone, Debug, PartialEq)]
pub struct Payment {
    pub id: Uuid,
    pub payment_reference: String,
    pub customer_id: Uuid,
    pub account_number: String,
    pub payment_date: DateTime<Utc>,
    pub payment_amount: Amount,
    pub status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub transaction_id: Option<String>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The outcome of a successful posting: the new payment along with the
/// customer's state after their balance was decremented.
#[derive(Clone, Debug, PartialEq)]
pub struct PostedPayment {
    pub payment: Payment,
    pub customer: Customer,
}

/// Data for a payment submitted by a collector.
#[derive(Debug, Deserialize, Validate)]
pub struct NewPaymentData {
    /// The account being paid against.
    #[validate(length(min = 1, max = 50))]
    pub account_number: String,

    /// The amount paid. Must be positive with at most two decimal places.
    #[validate(custom = "validate_positive_amount")]
    pub payment_amount: AmountInput,

    /// One of `UPI`, `CARD`, `NET_BANKING`, or `CHEQUE`. Defaults to `UPI`.
    #[validate(custom = "validate_payment_method")]
    pub payment_method: Option<String>,

    /// An identifier assigned by the external payment processor.
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,

    /// Free-text notes, at most 500 characters.
    #[validate(length(max = 500))]
    pub remarks: Option<String>,
}

/// A validated payment that has not been posted yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewPayment {
    account_number: String,
    amount: Amount,
    method: PaymentMethod,
    transaction_id: Option<String>,
    remarks: Option<String>,
}

impl NewPayment {
    /// Construct a new payment from a set of input data.
    ///
    /// The payment will only be constructed if the input data meets all the
    /// validation rules. Whether the amount fits within the customer's
    /// outstanding balance is checked when the payment is posted.
    pub fn from_data(mut data: NewPaymentData) -> Result<Self, ValidationErrors> {
        data.account_number = data.account_number.trim().to_owned();

        if let Err(validation_error) = data.validate() {
            debug!(?validation_error, "New payment failed validation.");

            return Err(validation_error);
        }

        trace!("New payment passed validation.");

        let amount = data
            .payment_amount
            .parse()
            .map_err(|_| field_error("payment_amount", "invalid_number"))?;
        let method = match data.payment_method.as_deref() {
            Some(raw) => raw
                .parse()
                .map_err(|_| field_error("payment_method", "invalid_method"))?,
            None => PaymentMethod::default(),
        };

        Ok(Self {
            account_number: data.account_number,
            amount,
            method,
            transaction_id: data.transaction_id.filter(|id| !id.trim().is_empty()),
            remarks: data.remarks.filter(|remarks| !remarks.trim().is_empty()),
        })
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }
}
