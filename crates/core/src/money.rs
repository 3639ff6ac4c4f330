//! Exact currency amounts.
//!
//! Amounts are held in minor units (paisa) so totals never drift. The currency label itself
//! (`Rs.` by default) is configuration and is applied at render time by
//! [`crate::config::CoreConfig::format_amount`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

const MINOR_PER_MAJOR: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money {
    minor: u64,
}

impl Money {
    pub const ZERO: Money = Money { minor: 0 };

    pub fn from_minor(minor: u64) -> Self {
        Self { minor }
    }

    pub fn from_major(major: u64) -> Self {
        Self {
            minor: major.saturating_mul(MINOR_PER_MAJOR),
        }
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    /// Parses a non-negative amount such as `1500`, `1,500` or `1500.5`.
    ///
    /// At most two fractional digits are accepted.
    pub fn parse(input: &str) -> Result<Self, String> {
        let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
        if cleaned.is_empty() {
            return Err("amount cannot be empty".into());
        }

        let (whole, frac) = match cleaned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(frac) || frac.len() > 2 {
            return Err(format!("'{}' is not a valid amount", input.trim()));
        }

        let major = whole
            .parse::<u64>()
            .map_err(|_| format!("'{}' is too large", input.trim()))?;
        let minor_part = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };

        major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor_part))
            .map(Self::from_minor)
            .ok_or_else(|| format!("'{}' is too large", input.trim()))
    }

    fn from_float(value: f64) -> Result<Self, String> {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{value} is not a valid amount"));
        }
        let minor = (value * MINOR_PER_MAJOR as f64).round();
        if minor > u64::MAX as f64 {
            return Err(format!("{value} is too large"));
        }
        Ok(Self::from_minor(minor as u64))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_minor(self.minor.saturating_add(rhs.minor))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Renders with thousands separators; the fraction is shown only when non-zero.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let major = (self.minor / MINOR_PER_MAJOR).to_string();
        let mut grouped = String::with_capacity(major.len() + major.len() / 3);
        for (i, ch) in major.chars().enumerate() {
            if i > 0 && (major.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        match self.minor % MINOR_PER_MAJOR {
            0 => write!(f, "{grouped}"),
            frac => write!(f, "{grouped}.{frac:02}"),
        }
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.minor as f64 / MINOR_PER_MAJOR as f64)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawAmount {
            Whole(u64),
            Decimal(f64),
            Text(String),
        }

        match RawAmount::deserialize(deserializer)? {
            RawAmount::Whole(major) => Ok(Money::from_major(major)),
            RawAmount::Decimal(value) => Money::from_float(value).map_err(serde::de::Error::custom),
            RawAmount::Text(text) => Money::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(Money::parse("1500").unwrap(), Money::from_major(1500));
        assert_eq!(Money::parse("1,500.5").unwrap().minor(), 150_050);
        assert_eq!(Money::parse(" 0.05 ").unwrap().minor(), 5);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for input in ["", "-5", "12.345", "1e3", ".5", "abc", "1.2.3"] {
            assert!(Money::parse(input).is_err(), "{input:?} should be rejected");
        }
    }

    #[test]
    fn displays_with_grouping() {
        assert_eq!(Money::from_major(1500).to_string(), "1,500");
        assert_eq!(Money::from_major(1_234_567).to_string(), "1,234,567");
        assert_eq!(Money::from_minor(150_050).to_string(), "1,500.50");
        assert_eq!(Money::ZERO.to_string(), "0");
    }

    #[test]
    fn sums_exactly() {
        let total: Money = [1500, 2000, 1800].map(Money::from_major).iter().sum();
        assert_eq!(total, Money::from_major(5300));

        let empty: Money = std::iter::empty::<Money>().sum();
        assert_eq!(empty, Money::ZERO);
    }

    #[test]
    fn deserializes_numbers_and_text() {
        let amounts: Vec<Money> = serde_yaml::from_str("[1500, 2000.00, '1,800.25']").unwrap();
        assert_eq!(
            amounts,
            vec![
                Money::from_major(1500),
                Money::from_major(2000),
                Money::from_minor(180_025)
            ]
        );
        assert!(serde_yaml::from_str::<Money>("-3.5").is_err());
    }
}
