//! Money type for representing rupee amounts.
//!
//! Amounts are held as an integer count of paise so that totals never pick up
//! floating-point error. On the wire the storefront API speaks plain rupee
//! numbers (`499`, `349.5`) and occasionally numeric strings (`"499"`); both
//! are accepted when deserializing.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Sub};

const PAISE_PER_RUPEE: i64 = 100;

/// A rupee amount stored in paise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    /// Amount in paise.
    pub paise: i64,
}

impl Money {
    /// Zero rupees.
    pub const ZERO: Money = Money { paise: 0 };

    /// Create a Money value from paise.
    pub fn from_paise(paise: i64) -> Self {
        Self { paise }
    }

    /// Create a Money value from whole rupees.
    pub fn from_rupees(rupees: i64) -> Self {
        Self::from_paise(rupees.saturating_mul(PAISE_PER_RUPEE))
    }

    /// Create a Money value from a decimal rupee amount.
    ///
    /// ```
    /// use doorstep_commerce::money::Money;
    /// let price = Money::from_decimal(349.5);
    /// assert_eq!(price.paise, 34950);
    /// ```
    pub fn from_decimal(rupees: f64) -> Self {
        Self::from_paise((rupees * PAISE_PER_RUPEE as f64).round() as i64)
    }

    /// Parse a loosely-typed JSON amount: a number or a numeric string such
    /// as `"₹1,299"`. Returns `None` for anything else.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(whole) = n.as_i64() {
                    Some(Self::from_rupees(whole))
                } else {
                    n.as_f64().filter(|f| f.is_finite()).map(Self::from_decimal)
                }
            }
            serde_json::Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Parse a rupee amount from text, ignoring a leading `₹` and commas.
    pub fn parse(text: &str) -> Option<Self> {
        let cleaned: String = text
            .trim()
            .trim_start_matches('\u{20b9}')
            .chars()
            .filter(|c| *c != ',')
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return None;
        }
        if let Ok(whole) = cleaned.parse::<i64>() {
            return Some(Self::from_rupees(whole));
        }
        cleaned
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Self::from_decimal)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.paise == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.paise < 0
    }

    /// Whether the amount is a whole number of rupees.
    pub fn is_whole_rupees(&self) -> bool {
        self.paise % PAISE_PER_RUPEE == 0
    }

    /// Convert to a decimal rupee value.
    pub fn to_decimal(&self) -> f64 {
        self.paise as f64 / PAISE_PER_RUPEE as f64
    }

    /// Format for display: `₹948` for whole rupees, `₹948.50` otherwise.
    pub fn display(&self) -> String {
        if self.is_whole_rupees() {
            format!("\u{20b9}{}", self.paise / PAISE_PER_RUPEE)
        } else {
            format!("\u{20b9}{:.2}", self.to_decimal())
        }
    }

    /// Add, saturating at the numeric bounds.
    pub fn saturating_add(self, other: Money) -> Money {
        Money::from_paise(self.paise.saturating_add(other.paise))
    }

    /// Subtract, saturating at the numeric bounds.
    pub fn saturating_sub(self, other: Money) -> Money {
        Money::from_paise(self.paise.saturating_sub(other.paise))
    }

    /// Multiply by a quantity, saturating at the numeric bounds.
    pub fn saturating_mul(self, factor: i64) -> Money {
        Money::from_paise(self.paise.saturating_mul(factor))
    }

    /// Percentage of `reference` that this amount represents, rounded down.
    pub fn percent_of(&self, reference: Money) -> u8 {
        if reference.paise <= 0 || self.paise <= 0 {
            return 0;
        }
        let pct = (self.paise as i128 * 100) / reference.paise as i128;
        pct.clamp(0, 100) as u8
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        self.saturating_add(other)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        self.saturating_sub(other)
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        self.saturating_mul(factor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Money::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole_rupees() {
            serializer.serialize_i64(self.paise / PAISE_PER_RUPEE)
        } else {
            serializer.serialize_f64(self.to_decimal())
        }
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Money::from_json(&value)
            .ok_or_else(|| D::Error::custom(format!("invalid rupee amount: {}", value)))
    }
}
