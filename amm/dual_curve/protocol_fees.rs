use amm_helpers::math::{complement, div_down, mul_down, MathError, Rounding};

use crate::{
    curve::{active_curve, Curve},
    math::compute_invariant,
    Balances, DualCurveError, Fees,
};

/// BPT to mint so that the holder owns `percentage` of the pool after minting.
/// Rounded down.
pub fn bpt_for_pool_ownership(bpt_supply: u128, percentage: u128) -> Result<u128, MathError> {
    if percentage == 0 {
        return Ok(0);
    }
    div_down(mul_down(bpt_supply, percentage)?, complement(percentage))
}

/// BPT owed to the protocol for swap fees accrued since `curve` was recorded.
///
/// Growth is measured on the curve `balances` sit on, with the amplification
/// recorded for it, so an amplification ramp is not mistaken for fee income.
/// Yield is not charged.
pub fn protocol_fee_bpt(
    curve: &Curve,
    balances: &Balances,
    bpt_supply: u128,
    fees: &Fees,
) -> Result<u128, DualCurveError> {
    let active = active_curve(balances);
    let growth_invariant = compute_invariant(curve.amp(active), balances, Rounding::Down)?;
    let last_invariant = curve.invariant(active);
    if growth_invariant <= last_invariant {
        return Ok(0);
    }
    let swap_fee_growth = div_down(growth_invariant - last_invariant, growth_invariant)?;
    let protocol_percentage = mul_down(swap_fee_growth, fees.protocol_swap_fee_percentage)?;
    Ok(bpt_for_pool_ownership(bpt_supply, protocol_percentage)?)
}
