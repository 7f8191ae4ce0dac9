use crate::types::errors::MonetaryError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DECIMAL_PLACES: u32 = 2;

/// A currency amount with at most two decimal places.
///
/// Backed by `rust_decimal::Decimal` so every comparison is exact. Arithmetic is
/// only exposed through checked operations; the caller decides what an overflow means.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Monetary(Decimal);

impl Monetary {
    pub const ZERO: Monetary = Monetary(Decimal::ZERO);

    /// Wraps a decimal, rejecting values that carry more than two significant decimal places.
    pub fn new(value: Decimal) -> Result<Self, MonetaryError> {
        if value.normalize().scale() > DECIMAL_PLACES {
            return Err(MonetaryError::TooPrecise(value.to_string()));
        }

        Ok(Monetary(value))
    }

    /// Builds an amount from a whole number of hundredths.
    pub fn from_cents(cents: i64) -> Monetary {
        Monetary(Decimal::new(cents, DECIMAL_PLACES))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_add(rhs.0).map(Monetary)
    }

    pub fn checked_sub(self, rhs: Monetary) -> Option<Monetary> {
        self.0.checked_sub(rhs.0).map(Monetary)
    }

    /// Sums a sequence of amounts, returning `None` on overflow.
    pub fn checked_sum<I>(values: I) -> Option<Monetary>
    where
        I: IntoIterator<Item = Monetary>,
    {
        values.into_iter().try_fold(Monetary::ZERO, Monetary::checked_add)
    }

    /// Half-up rounding to two places. Only used when presenting aggregated figures.
    pub fn rounded(self) -> Monetary {
        Monetary(self.0.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Divides and rounds half-up to two places, `None` when dividing by zero.
    pub fn checked_average(self, count: usize) -> Option<Monetary> {
        if count == 0 {
            return None;
        }

        self.0.checked_div(Decimal::from(count as u64)).map(|value| Monetary(value).rounded())
    }
}

impl Display for Monetary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:.prec$}", self.0, prec = DECIMAL_PLACES as usize)
    }
}

impl FromStr for Monetary {
    type Err = MonetaryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(MonetaryError::InvalidFormat("Value is an empty string".to_string()));
        }

        if value.starts_with('.') || value.ends_with('.') {
            return Err(MonetaryError::InvalidFormat(format!("Value [{value}] has a dangling decimal point")));
        }

        let decimal = Decimal::from_str(value)?;

        Monetary::new(decimal)
    }
}

impl TryFrom<Decimal> for Monetary {
    type Error = MonetaryError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Monetary::new(value)
    }
}

impl From<Monetary> for Decimal {
    fn from(value: Monetary) -> Self {
        value.0
    }
}

impl Serialize for Monetary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Monetary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Monetary::from_str(&value).map_err(de::Error::custom)
    }
}
