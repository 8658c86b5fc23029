//! Validators shared by request data types.

use std::borrow::Cow;

use rust_decimal::Decimal;
use validator::{ValidationError, ValidationErrors};

use crate::money::{Amount, AmountInput, AmountParseError};

/// The largest value a money column (`NUMERIC(12,2)`) can store.
pub fn max_money() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// The largest interest rate percentage (`NUMERIC(5,2)`) that can be stored.
pub fn max_rate() -> Decimal {
    Decimal::new(99_999, 2)
}

/// Build a set of validation errors containing a single field error.
pub fn field_error(field: &'static str, code: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(field, ValidationError::new(code));

    errors
}

fn parse_error(error: AmountParseError) -> ValidationError {
    match error {
        AmountParseError::InvalidNumber(_) => ValidationError::new("invalid_number"),
        AmountParseError::TooManyDecimals(places) => {
            let mut error = ValidationError::new("too_many_decimals");
            error.add_param(Cow::from("decimals"), &places);
            error
        }
    }
}

fn parse_non_negative(input: &AmountInput) -> Result<Amount, ValidationError> {
    let amount = input.parse().map_err(parse_error)?;

    if amount.value().is_sign_negative() && !amount.value().is_zero() {
        Err(ValidationError::new("negative"))
    } else {
        Ok(amount)
    }
}

/// Require the amount to be no larger than `max`.
pub fn validate_amount_in_range(amount: Amount, max: Decimal) -> Result<(), ValidationError> {
    if amount.value() > max {
        let mut error = ValidationError::new("too_large");
        error.add_param(Cow::from("max"), &max.to_string());

        return Err(error);
    }

    Ok(())
}

/// Require the amount to be a valid, strictly positive amount that fits in a
/// money column.
pub fn validate_positive_amount(input: &AmountInput) -> Result<(), ValidationError> {
    let amount = input.parse().map_err(parse_error)?;

    if !amount.is_positive() {
        return Err(ValidationError::new("not_positive"));
    }

    validate_amount_in_range(amount, max_money())
}

/// Require the amount to be a valid amount that is zero or greater and fits in
/// a money column.
pub fn validate_non_negative_amount(input: &AmountInput) -> Result<(), ValidationError> {
    let amount = parse_non_negative(input)?;

    validate_amount_in_range(amount, max_money())
}

/// Require an interest rate percentage between zero and [`max_rate`].
pub fn validate_interest_rate(input: &AmountInput) -> Result<(), ValidationError> {
    let rate = parse_non_negative(input)?;

    validate_amount_in_range(rate, max_rate())
}
