//! Amount type for handling monetary values entered by the user.
//!
//! This module provides the `Amount` type which wraps `Decimal`, the validation that turns user
//! input into an `Amount`, and `MoneyFormat` which controls how amounts are shown.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The message shown to the user when an amount cannot be parsed.
pub const INVALID_AMOUNT_MESSAGE: &str = "Invalid amount format, e.g. 152.56";

/// Represents a monetary amount.
///
/// Any sign is allowed: zero and negative amounts are recorded as entered. The value is always
/// finite since `Decimal` has no representation for `NaN` or infinities.
///
/// # Examples
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("152.56").unwrap();
/// assert_eq!(amount.to_string(), "152.56");
/// assert!(Amount::from_str("12abc").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
}

impl Amount {
    pub const ZERO: Amount = Amount::new(Decimal::ZERO);

    /// Creates a new Amount from a Decimal value.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Renders the amount rounded to two decimal places using `style`, e.g. `1,152.56 ₽`.
    ///
    /// Rounding happens here and only here; the stored value keeps its full precision.
    pub fn format(&self, style: &MoneyFormat) -> String {
        let rounded = self
            .value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let sign = if !rounded.is_zero() && rounded.is_sign_negative() {
            "-"
        } else {
            ""
        };
        let abs = rounded.abs();
        let num = if style.grouping {
            format_num::format_num!(",.2", abs.to_f64().unwrap_or_default())
        } else {
            format!("{abs:.2}")
        };
        match style.position {
            SymbolPosition::Prefix => format!("{sign}{}{num}", style.symbol),
            SymbolPosition::Suffix => format!("{sign}{num} {}", style.symbol),
        }
    }
}

/// Parses and validates user input as an `Amount`.
///
/// Accepted: optional surrounding whitespace, an optional leading `+` or `-`, and digits with at
/// most one decimal point, e.g. `152.56`, `-3`, `.5`. Everything else is rejected, including empty
/// input, thousands separators, exponents and values too large for `Decimal`.
pub fn parse_amount(input: &str) -> Result<Amount, InvalidAmountFormat> {
    let invalid = || InvalidAmountFormat {
        input: input.to_string(),
    };
    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return Err(invalid());
    }

    // Rebuild a canonical numeral so that ".5" and "7." reach `Decimal` as "0.5" and "7".
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let sign = if negative { "-" } else { "" };
    let numeral = if frac_part.is_empty() {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    };
    let mut value = Decimal::from_str(&numeral).map_err(|_| invalid())?;
    if value.is_zero() {
        value.set_sign_positive(true);
    }
    Ok(Amount { value })
}

/// The error returned when user input is not a valid amount.
#[derive(Clone, PartialEq, Eq)]
pub struct InvalidAmountFormat {
    input: String,
}

impl InvalidAmountFormat {
    /// The rejected input, so that the caller can hand it back to the user for correction.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl Debug for InvalidAmountFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "InvalidAmountFormat({:?})", self.input)
    }
}

impl Display for InvalidAmountFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(INVALID_AMOUNT_MESSAGE)
    }
}

impl std::error::Error for InvalidAmountFormat {}

impl FromStr for Amount {
    type Err = InvalidAmountFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_amount(s)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.value, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // A JSON number carrying the exact decimal digits.
        rust_decimal::serde::arbitrary_precision::serialize(&self.value, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        rust_decimal::serde::arbitrary_precision::deserialize(deserializer).map(Amount::new)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

/// Where the currency symbol goes relative to the number.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolPosition {
    /// `$12.00`
    Prefix,
    /// `12.00 ₽`
    #[default]
    Suffix,
}

serde_plain::derive_display_from_serialize!(SymbolPosition);
serde_plain::derive_fromstr_from_deserialize!(SymbolPosition);

/// Controls how amounts are displayed.
///
/// # Examples
///  - `MoneyFormat{ symbol: "₽", position: Suffix, grouping: true }` -> `-60,000.00 ₽`
///  - `MoneyFormat{ symbol: "$", position: Prefix, grouping: false }` -> `-$60000.00`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoneyFormat {
    /// The currency symbol.
    symbol: String,
    /// Whether the symbol is written before or after the number.
    #[serde(default)]
    position: SymbolPosition,
    /// Whether commas are used as thousands separators.
    #[serde(default = "grouping_default")]
    grouping: bool,
}

fn grouping_default() -> bool {
    true
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: String::from("₽"),
            position: SymbolPosition::Suffix,
            grouping: true,
        }
    }
}

impl MoneyFormat {
    pub fn new(symbol: impl Into<String>, position: SymbolPosition, grouping: bool) -> Self {
        Self {
            symbol: symbol.into(),
            position,
            grouping,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn position(&self) -> SymbolPosition {
        self.position
    }

    pub fn grouping(&self) -> bool {
        self.grouping
    }
}
