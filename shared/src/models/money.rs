//! Cents <-> decimal serde adapter for monetary fields

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserializer, Serializer};

pub fn serialize<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    rust_decimal::serde::float::serialize(&to_decimal(*cents), serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value: Decimal = rust_decimal::serde::float::deserialize(deserializer)?;
    from_decimal(value).ok_or_else(|| serde::de::Error::custom("amount out of range"))
}

pub fn to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Rounds to the nearest cent
pub fn from_decimal(value: Decimal) -> Option<i64> {
    (value * Decimal::ONE_HUNDRED).round().to_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cents_conversion() {
        assert_eq!(to_decimal(99999).to_string(), "999.99");
        assert_eq!(from_decimal(Decimal::new(2999, 2)), Some(2999));
        assert_eq!(from_decimal(Decimal::new(1005, 3)), Some(100));
    }
}
