use std::fmt;
use std::ops::Neg;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;

/// Number of minor units per major currency unit (cents per unit).
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Decimal scale corresponding to [`MINOR_UNITS_PER_MAJOR`].
const MINOR_UNITS_SCALE: u32 = 2;

/// Errors that can happen while converting a decimal value into an [`Amount`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AmountError {
  #[error("amount has more precision than minor units can represent")]
  LosesPrecision,

  #[error("amount out of range")]
  OutOfRange,
}

/// A monetary amount as a fixed-point count of minor currency units.
///
/// Balances and transfer amounts are integers end to end so that no rounding
/// drift can accumulate; decimal values only exist at the IO boundary.
/// The value is signed so that it can also express balance deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
  pub const ZERO: Amount = Amount(0);

  pub fn from_minor_units(minor_units: i64) -> Self {
    Self(minor_units)
  }

  pub fn minor_units(&self) -> i64 {
    self.0
  }

  pub fn is_positive(&self) -> bool {
    self.0 > 0
  }

  pub fn is_negative(&self) -> bool {
    self.0 < 0
  }

  pub fn is_zero(&self) -> bool {
    self.0 == 0
  }

  pub fn checked_add(self, other: Amount) -> Option<Amount> {
    self.0.checked_add(other.0).map(Amount)
  }

  pub fn checked_sub(self, other: Amount) -> Option<Amount> {
    self.0.checked_sub(other.0).map(Amount)
  }

  /// Conversion from a decimal value at the IO boundary.
  /// Values with more than two fractional digits are rejected instead of
  /// silently rounded.
  pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
    let scaled = value
      .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
      .ok_or(AmountError::OutOfRange)?;

    if !scaled.fract().is_zero() {
      return Err(AmountError::LosesPrecision);
    }

    scaled.to_i64().map(Amount).ok_or(AmountError::OutOfRange)
  }

  /// Decimal representation used for display and reports.
  pub fn to_decimal(&self) -> Decimal {
    Decimal::new(self.0, MINOR_UNITS_SCALE)
  }
}

impl Neg for Amount {
  type Output = Amount;

  fn neg(self) -> Amount {
    Amount(-self.0)
  }
}

impl fmt::Display for Amount {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.to_decimal())
  }
}

#[cfg(test)]
mod tests {

  use rust_decimal_macros::dec;

  use super::*;

  #[test]
  fn from_decimal_success() {
    let cases = vec![
      (dec!(0), 0),
      (dec!(0.01), 1),
      (dec!(10.5), 1050),
      (dec!(500), 50000),
      (dec!(-2.34), -234),
    ];

    for (input, expected) in cases {
      assert_eq!(
        Amount::from_decimal(input),
        Ok(Amount::from_minor_units(expected))
      );
    }
  }

  #[test]
  fn from_decimal_rejects_sub_cent_precision() {
    assert_eq!(
      Amount::from_decimal(dec!(0.001)),
      Err(AmountError::LosesPrecision)
    );
    assert_eq!(
      Amount::from_decimal(dec!(10.505)),
      Err(AmountError::LosesPrecision)
    );
  }

  #[test]
  fn decimal_round_trip() {
    let amount = Amount::from_minor_units(123456);
    assert_eq!(amount.to_decimal(), dec!(1234.56));
    assert_eq!(Amount::from_decimal(amount.to_decimal()), Ok(amount));
  }

  #[test]
  fn checked_arithmetic() {
    let a = Amount::from_minor_units(100);
    let b = Amount::from_minor_units(40);

    assert_eq!(a.checked_add(b), Some(Amount::from_minor_units(140)));
    assert_eq!(a.checked_sub(b), Some(Amount::from_minor_units(60)));
    assert_eq!(Amount::from_minor_units(i64::MAX).checked_add(a), None);
  }

  #[test]
  fn sign_predicates() {
    assert!(Amount::from_minor_units(1).is_positive());
    assert!(Amount::from_minor_units(-1).is_negative());
    assert!(Amount::ZERO.is_zero());
    assert_eq!(-Amount::from_minor_units(25), Amount::from_minor_units(-25));
  }

  #[test]
  fn display_uses_two_decimals() {
    assert_eq!(format!("{}", Amount::from_minor_units(30000)), "300.00");
    assert_eq!(format!("{}", Amount::from_minor_units(-1)), "-0.01");
  }
}
