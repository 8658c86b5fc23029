use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// The number of decimal places used for every monetary amount.
pub const MINOR_UNITS: u32 = 2;

/// A monetary amount with exactly two decimal places.
///
/// Amounts are backed by a [`Decimal`] so arithmetic on balances never
/// drifts the way floating point values would.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Amount(Decimal);

#[derive(Debug, Eq, Error, PartialEq)]
pub enum AmountParseError {
    /// The provided amount could not be parsed as a number.
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),

    /// The provided amount included more precision than the two decimal places
    /// allowed. The parameter is the number of decimal places provided.
    #[error("too many decimal places: {0}")]
    TooManyDecimals(u32),
}

impl Amount {
    pub fn zero() -> Self {
        Self(Decimal::new(0, MINOR_UNITS))
    }

    /// Create an amount from a decimal value.
    ///
    /// Trailing zeroes beyond the second decimal place are accepted, so
    /// `1.500` is a valid amount but `1.505` is not.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountParseError> {
        let normalized = value.normalize();
        if normalized.scale() > MINOR_UNITS {
            return Err(AmountParseError::TooManyDecimals(normalized.scale()));
        }

        let mut rescaled = normalized;
        rescaled.rescale(MINOR_UNITS);

        Ok(Self(rescaled))
    }

    /// Parse an amount from a string representation.
    ///
    /// # Arguments
    /// * `raw_amount` - A string containing a numeric amount. This can include
    ///   whitespace and `,` separators.
    pub fn parse(raw_amount: &str) -> Result<Self, AmountParseError> {
        let cleaned_amount = raw_amount.replace(',', "").replace(' ', "");

        let value = Decimal::from_str(&cleaned_amount)
            .map_err(|_| AmountParseError::InvalidNumber(raw_amount.to_owned()))?;

        Self::from_decimal(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    #[cfg(test)]
    pub(crate) fn checked_sub(&self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self)
    }

    #[cfg(test)]
    pub(crate) fn checked_add(&self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn format_value(&self) -> String {
        format!("{:.2}", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_value())
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format_value())
    }
}

/// An amount as provided by a client. Clients may send either a JSON string
/// or a JSON number.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn parse(&self) -> Result<Amount, AmountParseError> {
        match self {
            Self::Text(raw) => Amount::parse(raw),
            Self::Number(number) => Amount::parse(&number.to_string()),
        }
    }
}

impl From<&str> for AmountInput {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn amount(raw: &str) -> Amount {
        Amount::parse(raw).expect("valid amount")
    }

    #[test]
    fn format_value_whole_number() {
        assert_eq!("150000.00", amount("150000").format_value());
    }

    #[test]
    fn format_value_with_only_tens_place() {
        assert_eq!("0.70", amount("0.7").format_value());
    }

    #[test]
    fn format_value_with_only_hundreds_place() {
        assert_eq!("0.07", amount(".07").format_value());
    }

    #[test]
    fn parse_amount_invalid_number() {
        let raw_amount = "squirrel";

        let error = Amount::parse(raw_amount).expect_err("invalid number should return error");

        assert_eq!(AmountParseError::InvalidNumber(raw_amount.to_owned()), error);
    }

    #[test]
    fn parse_amount_too_many_decimals() {
        let error = Amount::parse("3.141").expect_err("three decimals should return error");

        assert_eq!(AmountParseError::TooManyDecimals(3), error);
    }

    #[test]
    fn parse_amount_trailing_zeroes_beyond_minor_units() {
        assert_eq!(amount("1.5"), amount("1.500"));
    }

    #[test]
    fn parse_amount_separator_char() {
        assert_eq!("8675309.00", amount("8,675,309").format_value());
    }

    #[test]
    fn parse_amount_separator_whitespace() {
        assert_eq!("8675309.00", amount("8 675 309").format_value());
    }

    #[test]
    fn parse_amount_negative_decimal() {
        let parsed = amount("-3.14");

        assert!(!parsed.is_positive());
        assert_eq!("-3.14", parsed.format_value());
    }

    #[test]
    fn zero_is_not_positive() {
        assert!(!Amount::zero().is_positive());
        assert!(!amount("0.00").is_positive());
        assert!(amount("0.01").is_positive());
    }

    #[test]
    fn subtraction_is_exact_to_the_cent() {
        let balance = amount("150000.00");

        for (paid, want) in [
            ("5000.50", "144999.50"),
            ("1234.99", "148765.01"),
            ("0.50", "149999.50"),
        ] {
            let remaining = balance.checked_sub(amount(paid)).expect("no overflow");

            assert_eq!(want, remaining.format_value());
        }
    }

    #[test]
    fn input_accepts_numbers_and_strings() {
        let from_number: AmountInput = serde_json::from_str("5000.5").unwrap();
        let from_string: AmountInput = serde_json::from_str("\"5000.50\"").unwrap();

        assert_eq!(amount("5000.50"), from_number.parse().unwrap());
        assert_eq!(amount("5000.50"), from_string.parse().unwrap());
    }

    #[test]
    fn input_serializes_as_it_was_received() {
        let from_number: AmountInput = serde_json::from_str("5000.5").unwrap();
        let from_string = AmountInput::from("5,000.50");

        assert_eq!("5000.5", serde_json::to_string(&from_number).unwrap());
        assert_eq!("\"5,000.50\"", serde_json::to_string(&from_string).unwrap());
    }

    #[test]
    fn serializes_as_string_with_two_decimals() {
        let serialized = serde_json::to_string(&amount("145000")).unwrap();

        assert_eq!("\"145000.00\"", serialized);
    }
}
