//! Field checks shared by the `New*` input types.
//!
//! The limits mirror the column definitions of the ledger: names are short
//! labels, and every decimal fits ten significant digits with a fixed number
//! of fractional places.

use rust_decimal::Decimal;

use crate::{Error, Result};

/// Maximum length, in characters, of unit, nomenclature and counterparty names.
pub const NAME_MAX_CHARS: usize = 50;

/// Maximum length, in characters, of a production run description.
pub const DESCRIPTION_MAX_CHARS: usize = 200;

/// Total significant digits allowed in any stored decimal.
pub const MAX_DIGITS: u32 = 10;

/// Fractional digits for quantities and prices.
pub const AMOUNT_PLACES: u32 = 3;

/// Fractional digits for conversion rates.
pub const RATE_PLACES: u32 = 4;

/// A non-blank label of at most `max` characters.
pub fn label(field: &'static str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::Validation {
      field,
      reason: "must not be blank".into(),
    });
  }
  let len = value.chars().count();
  if len > max {
    return Err(Error::Validation {
      field,
      reason: format!("{len} characters exceeds the limit of {max}"),
    });
  }
  Ok(())
}

/// A decimal with at most `places` fractional digits and [`MAX_DIGITS`] in
/// total.
pub fn fits(field: &'static str, value: Decimal, places: u32) -> Result<()> {
  let normalized = value.normalize();
  if normalized.scale() > places {
    return Err(Error::Validation {
      field,
      reason: format!("{value} has more than {places} decimal places"),
    });
  }
  let limit = Decimal::from(10_i64.pow(MAX_DIGITS - places));
  if normalized.abs() >= limit {
    return Err(Error::Validation {
      field,
      reason: format!("{value} exceeds {MAX_DIGITS} significant digits"),
    });
  }
  Ok(())
}

/// A strictly positive amount.
pub fn positive(field: &'static str, value: Decimal, places: u32) -> Result<()> {
  fits(field, value, places)?;
  if value <= Decimal::ZERO {
    return Err(Error::Validation {
      field,
      reason: format!("{value} must be greater than zero"),
    });
  }
  Ok(())
}

/// An amount that is zero or more.
pub fn non_negative(
  field: &'static str,
  value: Decimal,
  places: u32,
) -> Result<()> {
  fits(field, value, places)?;
  if value < Decimal::ZERO {
    return Err(Error::Validation {
      field,
      reason: format!("{value} must not be negative"),
    });
  }
  Ok(())
}
