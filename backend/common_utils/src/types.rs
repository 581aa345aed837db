//! Types that can be used in other crates

use std::{fmt::Display, ops::Add};

use crate::errors::ParsingError;

/// Number of rials in one toman
pub const RIALS_PER_TOMAN: i64 = 10;

/// Amount convertor trait for gateway integrations
pub trait AmountConvertor: Send {
    /// Output type required by the gateway
    type Output;

    /// helps in conversion of the stored amount into the gateway required amount type
    fn convert(&self, amount: MinorUnit) -> Result<Self::Output, error_stack::Report<ParsingError>>;

    /// helps in converting back the gateway required amount type to the stored minor unit
    fn convert_back(
        &self,
        amount: Self::Output,
    ) -> Result<MinorUnit, error_stack::Report<ParsingError>>;
}

/// Gateway required amount type, rial denominated
#[derive(Default, Debug, serde::Deserialize, serde::Serialize, Clone, Copy, PartialEq)]
pub struct RialMinorUnitForConnector;

impl AmountConvertor for RialMinorUnitForConnector {
    type Output = MinorUnit;
    fn convert(&self, amount: MinorUnit) -> Result<Self::Output, error_stack::Report<ParsingError>> {
        amount.to_rial_minor_unit()
    }

    fn convert_back(
        &self,
        amount: Self::Output,
    ) -> Result<MinorUnit, error_stack::Report<ParsingError>> {
        amount.from_rial_minor_unit()
    }
}

/// This Unit struct represents MinorUnit in which core amount works, toman denominated
#[derive(
    Default,
    Debug,
    serde::Deserialize,
    serde::Serialize,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
)]
pub struct MinorUnit(pub i64);

impl MinorUnit {
    /// gets amount as i64 value
    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    /// forms a new minor default unit i.e zero
    pub fn zero() -> Self {
        Self(0)
    }

    /// forms a new minor unit from amount
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Convert the toman denominated amount to rials
    fn to_rial_minor_unit(self) -> Result<Self, error_stack::Report<ParsingError>> {
        let amount = self
            .0
            .checked_mul(RIALS_PER_TOMAN)
            .ok_or(ParsingError::IntegerOverflow)?;
        Ok(Self(amount))
    }

    /// Convert a rial denominated amount back to tomans
    fn from_rial_minor_unit(self) -> Result<Self, error_stack::Report<ParsingError>> {
        Ok(Self(self.0 / RIALS_PER_TOMAN))
    }
}

impl Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for MinorUnit {
    type Output = Self;
    fn add(self, a2: Self) -> Self {
        Self(self.0 + a2.0)
    }
}

#[cfg(test)]
mod amount_conversion_tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const CONVERTER: RialMinorUnitForConnector = RialMinorUnitForConnector;

    #[test]
    fn toman_amount_is_scaled_to_rials() {
        let amount = MinorUnit::new(50_000);
        let converted = CONVERTER.convert(amount).unwrap();
        assert_eq!(converted, MinorUnit::new(500_000));
    }

    #[test]
    fn rial_amount_is_scaled_back_to_tomans() {
        let amount = MinorUnit::new(500_000);
        let converted = CONVERTER.convert_back(amount).unwrap();
        assert_eq!(converted, MinorUnit::new(50_000));
    }

    #[test]
    fn conversion_overflow_is_reported() {
        let amount = MinorUnit::new(i64::MAX);
        let result = CONVERTER.convert(amount);
        assert!(result.is_err());
    }

    #[test]
    fn amounts_can_be_added() {
        assert_eq!(
            MinorUnit::new(100_000) + MinorUnit::zero(),
            MinorUnit::new(100_000)
        );
    }
}
