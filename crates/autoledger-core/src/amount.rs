//! Amount type representing a decimal number with a currency.
//!
//! An [`Amount`] pairs a decimal quantity with a currency code. Balance
//! checking is tolerance-based: each currency has a number of minor units
//! (cents, fils, ...) and a journal is considered balanced when its residual
//! stays within one minor unit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Number of minor units (decimal places) conventionally used by a currency.
///
/// Covers the ISO 4217 zero- and three-decimal currencies; everything else
/// defaults to two.
///
/// # Examples
///
/// ```
/// use autoledger_core::amount::minor_units;
///
/// assert_eq!(minor_units("USD"), 2);
/// assert_eq!(minor_units("JPY"), 0);
/// assert_eq!(minor_units("BHD"), 3);
/// ```
#[must_use]
pub fn minor_units(currency: &str) -> u32 {
    match currency {
        "BIF" | "CLP" | "DJF" | "GNF" | "ISK" | "JPY" | "KMF" | "KRW" | "PYG" | "RWF" | "UGX"
        | "VND" | "VUV" | "XAF" | "XOF" | "XPF" => 0,
        "BHD" | "IQD" | "JOD" | "KWD" | "LYD" | "OMR" | "TND" => 3,
        _ => 2,
    }
}

/// The balance tolerance for a currency: exactly one minor unit.
///
/// ```
/// use autoledger_core::amount::unit_tolerance;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(unit_tolerance("USD"), dec!(0.01));
/// assert_eq!(unit_tolerance("JPY"), dec!(1));
/// ```
#[must_use]
pub fn unit_tolerance(currency: &str) -> Decimal {
    Decimal::new(1, minor_units(currency))
}

/// Rescale a decimal to a currency's minor units, padding with zeros.
///
/// This is the canonical rendering scale: `50` in USD becomes `50.00`.
#[must_use]
pub fn rescaled(number: Decimal, currency: &str) -> Decimal {
    let mut out = number;
    out.rescale(minor_units(currency));
    out
}

/// A quantity paired with a currency.
///
/// # Examples
///
/// ```
/// use autoledger_core::Amount;
/// use rust_decimal_macros::dec;
///
/// let amount = Amount::new(dec!(100.00), "USD");
/// assert_eq!(amount.number, dec!(100.00));
/// assert_eq!(amount.currency, "USD");
///
/// let other = Amount::new(dec!(50.00), "USD");
/// let sum = &amount + &other;
/// assert_eq!(sum.number, dec!(150.00));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    /// The decimal quantity
    pub number: Decimal,
    /// The currency code (e.g., "USD", "EUR")
    pub currency: String,
}

impl Amount {
    /// Create a new amount.
    #[must_use]
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    /// Create a zero amount with the given currency.
    #[must_use]
    pub fn zero(currency: impl Into<String>) -> Self {
        Self {
            number: Decimal::ZERO,
            currency: currency.into(),
        }
    }

    /// Check if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.number.is_zero()
    }

    /// Check if the amount is positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.number.is_sign_positive() && !self.number.is_zero()
    }

    /// Check if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.number.is_sign_negative()
    }

    /// Get the absolute value of this amount.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self {
            number: self.number.abs(),
            currency: self.currency.clone(),
        }
    }

    /// The tolerance for this amount's currency (one minor unit).
    #[must_use]
    pub fn tolerance(&self) -> Decimal {
        unit_tolerance(&self.currency)
    }

    /// Check if this amount is within its currency tolerance of zero.
    #[must_use]
    pub fn is_near_zero(&self) -> bool {
        self.number.abs() <= self.tolerance()
    }

    /// Render the quantity at the currency's canonical scale.
    #[must_use]
    pub fn canonical_number(&self) -> Decimal {
        rescaled(self.number, &self.currency)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.canonical_number(), self.currency)
    }
}

impl Add for &Amount {
    type Output = Amount;

    fn add(self, other: &Amount) -> Amount {
        debug_assert_eq!(
            self.currency, other.currency,
            "Cannot add amounts with different currencies"
        );
        Amount {
            number: self.number + other.number,
            currency: self.currency.clone(),
        }
    }
}

impl Sub for &Amount {
    type Output = Amount;

    fn sub(self, other: &Amount) -> Amount {
        debug_assert_eq!(
            self.currency, other.currency,
            "Cannot subtract amounts with different currencies"
        );
        Amount {
            number: self.number - other.number,
            currency: self.currency.clone(),
        }
    }
}

impl Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount {
            number: -self.number,
            currency: self.currency.clone(),
        }
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        &self + &other
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        &self - &other
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}

impl AddAssign<&Self> for Amount {
    fn add_assign(&mut self, other: &Self) {
        debug_assert_eq!(
            self.currency, other.currency,
            "Cannot add amounts with different currencies"
        );
        self.number += other.number;
    }
}

impl SubAssign<&Self> for Amount {
    fn sub_assign(&mut self, other: &Self) {
        debug_assert_eq!(
            self.currency, other.currency,
            "Cannot subtract amounts with different currencies"
        );
        self.number -= other.number;
    }
}
