use amm_helpers::math::{MathError, Rounding};

use crate::{
    curve::{active_curve, amp_of, CurveId},
    math::{compute_invariant, project_to_boundary},
    Balances,
};

/// Carries invariant `d_from` of one curve over to the other curve through
/// their shared boundary point.
pub fn invariant_across_boundary(
    amp_from: u128,
    d_from: u128,
    amp_to: u128,
    rounding: Rounding,
) -> Result<u128, MathError> {
    let boundary = project_to_boundary(amp_from, d_from)?;
    compute_invariant(amp_to, &boundary, rounding)
}

/// Invariant of `target` curve at `balances`.
///
/// When `balances` sit on the other curve, the invariant is computed there
/// first and carried over the boundary.
pub fn calculate_invariant(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    target: CurveId,
    rounding: Rounding,
) -> Result<u128, MathError> {
    let current = active_curve(balances);
    let d_current = compute_invariant(amp_of(current, amp1, amp2), balances, rounding)?;
    if current == target {
        return Ok(d_current);
    }
    invariant_across_boundary(
        amp_of(current, amp1, amp2),
        d_current,
        amp_of(target, amp1, amp2),
        rounding,
    )
}

/// Returns `(D1, D2)` at `balances`.
pub fn calculate_invariants(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    rounding: Rounding,
) -> Result<(u128, u128), MathError> {
    let current = active_curve(balances);
    let amp_current = amp_of(current, amp1, amp2);
    let d_current = compute_invariant(amp_current, balances, rounding)?;
    let d_other = invariant_across_boundary(
        amp_current,
        d_current,
        amp_of(current.other(), amp1, amp2),
        rounding,
    )?;
    Ok(match current {
        CurveId::Curve1 => (d_current, d_other),
        CurveId::Curve2 => (d_other, d_current),
    })
}
