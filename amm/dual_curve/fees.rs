use amm_helpers::{
    constants::dual_curve::{MAX_PROTOCOL_FEE_PERCENTAGE, MAX_SWAP_FEE_PERCENTAGE},
    ensure,
    math::{complement, div_up, mul_up, MathError},
};

use crate::DualCurveError;

/// Fee percentages as 18-decimal fixed point fractions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Fees {
    pub swap_fee_percentage: u128,
    pub protocol_swap_fee_percentage: u128,
}

impl Fees {
    pub fn new(
        swap_fee_percentage: u128,
        protocol_swap_fee_percentage: u128,
    ) -> Result<Self, DualCurveError> {
        ensure!(
            swap_fee_percentage <= MAX_SWAP_FEE_PERCENTAGE,
            DualCurveError::FeeTooHigh
        );
        ensure!(
            protocol_swap_fee_percentage <= MAX_PROTOCOL_FEE_PERCENTAGE,
            DualCurveError::FeeTooHigh
        );
        Ok(Self {
            swap_fee_percentage,
            protocol_swap_fee_percentage,
        })
    }

    pub fn zero() -> Self {
        Self {
            swap_fee_percentage: 0,
            protocol_swap_fee_percentage: 0,
        }
    }

    /// Splits a gross `amount_in` into the part entering the curve and the swap fee.
    /// Returns (net_amount, fee)
    pub fn subtract_swap_fee(&self, amount_in: u128) -> Result<(u128, u128), MathError> {
        let fee = mul_up(amount_in, self.swap_fee_percentage)?;
        let net = amount_in
            .checked_sub(fee)
            .ok_or(MathError::SubUnderflow(41))?;
        Ok((net, fee))
    }

    /// Grosses up a net `amount_in` so that the fee charged on the result leaves it intact.
    /// Returns (gross_amount, fee)
    pub fn add_swap_fee(&self, amount_in: u128) -> Result<(u128, u128), MathError> {
        let gross = div_up(amount_in, complement(self.swap_fee_percentage))?;
        let fee = gross
            .checked_sub(amount_in)
            .ok_or(MathError::SubUnderflow(42))?;
        Ok((gross, fee))
    }
}

#[cfg(test)]
mod tests {
    use super::Fees;
    use crate::DualCurveError;
    use amm_helpers::constants::dual_curve::ONE;

    #[test]
    fn test_net_gross_fee_roundtrip() {
        let fees = Fees::new(3 * ONE / 1000, 0).unwrap();
        for i in 1..100 {
            let net = 880265296841066047 * i;
            let (gross, fee1) = fees.add_swap_fee(net).unwrap();
            let (net_back, fee2) = fees.subtract_swap_fee(gross).unwrap();
            // fees round up in both directions
            assert!(net_back <= net, "Net amount should never grow");
            assert!(net - net_back <= 1);
            assert!(fee2.abs_diff(fee1) <= 1);
        }
    }

    #[test]
    fn zero_fees_are_identity() {
        let fees = Fees::zero();
        assert_eq!(fees.subtract_swap_fee(12345), Ok((12345, 0)));
        assert_eq!(fees.add_swap_fee(12345), Ok((12345, 0)));
    }

    #[test]
    fn fee_caps_are_enforced() {
        assert_eq!(Fees::new(ONE / 10 + 1, 0), Err(DualCurveError::FeeTooHigh));
        assert_eq!(Fees::new(0, ONE / 2 + 1), Err(DualCurveError::FeeTooHigh));
        assert!(Fees::new(ONE / 10, ONE / 2).is_ok());
    }
}
