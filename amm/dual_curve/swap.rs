use amm_helpers::{
    ensure,
    math::{MathError, Rounding},
};
use tracing::debug;

use crate::{
    curve::{active_curve, amp_of, CurveId},
    invariant::invariant_across_boundary,
    math::{compute_balance, compute_invariant},
    Balances, DualCurveError, Fees,
};

fn check_token_indices(token_in: usize, token_out: usize) -> Result<(), DualCurveError> {
    ensure!(token_in < 2 && token_out < 2, DualCurveError::InvalidTokenIndex);
    ensure!(token_in != token_out, DualCurveError::IdenticalTokenIndex);
    Ok(())
}

/// Solves `token_index` of `new_balances` on the curve the trade started on.
/// If the solution lands past the boundary, solves once more on the other
/// curve, starting from the boundary point of `invariant`.
///
/// Returns (curve_after, new_balance)
fn settle_balance(
    amp1: u128,
    amp2: u128,
    curve_in: CurveId,
    invariant: u128,
    mut new_balances: Balances,
    token_index: usize,
) -> Result<(CurveId, u128), MathError> {
    let amp_in = amp_of(curve_in, amp1, amp2);
    new_balances[token_index] =
        compute_balance(amp_in, &new_balances, invariant, token_index, Rounding::Up)?;
    if active_curve(&new_balances) == curve_in {
        return Ok((curve_in, new_balances[token_index]));
    }
    // At most one crossing: a single-direction trade moves the balances
    // monotonically, so the second solution is final.
    let curve_out = curve_in.other();
    let amp_out = amp_of(curve_out, amp1, amp2);
    let invariant_out = invariant_across_boundary(amp_in, invariant, amp_out, Rounding::Up)?;
    debug!(
        from = curve_in.tag(),
        to = curve_out.tag(),
        token_index,
        "trade crosses the curve boundary"
    );
    let balance =
        compute_balance(amp_out, &new_balances, invariant_out, token_index, Rounding::Up)?;
    Ok((curve_out, balance))
}

/// Amount of `token_out` paid for `amount_in` of `token_in`.
/// Rounded down, minus 1 in case there are any rounding errors.
///
/// Returns (curve_after, amount_out)
pub fn swap_out_given_in(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    token_in: usize,
    token_out: usize,
    amount_in: u128,
) -> Result<(CurveId, u128), DualCurveError> {
    check_token_indices(token_in, token_out)?;
    let curve_in = active_curve(balances);
    let invariant = compute_invariant(amp_of(curve_in, amp1, amp2), balances, Rounding::Up)?;
    let mut new_balances = *balances;
    new_balances[token_in] = balances[token_in]
        .checked_add(amount_in)
        .ok_or(MathError::AddOverflow(31))?;
    let (curve_after, balance_out) =
        settle_balance(amp1, amp2, curve_in, invariant, new_balances, token_out)?;
    let amount_out = balances[token_out]
        .checked_sub(balance_out)
        .ok_or(MathError::SubUnderflow(31))?
        .checked_sub(1)
        .ok_or(MathError::SubUnderflow(32))?;
    Ok((curve_after, amount_out))
}

/// Amount of `token_in` required to receive `amount_out` of `token_out`.
/// Rounded up, plus 1 in case there are any rounding errors.
///
/// Returns (curve_after, amount_in)
pub fn swap_in_given_out(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    token_in: usize,
    token_out: usize,
    amount_out: u128,
) -> Result<(CurveId, u128), DualCurveError> {
    check_token_indices(token_in, token_out)?;
    let curve_in = active_curve(balances);
    let invariant = compute_invariant(amp_of(curve_in, amp1, amp2), balances, Rounding::Up)?;
    let mut new_balances = *balances;
    new_balances[token_out] = balances[token_out]
        .checked_sub(amount_out)
        .ok_or(MathError::SubUnderflow(33))?;
    let (curve_after, balance_in) =
        settle_balance(amp1, amp2, curve_in, invariant, new_balances, token_in)?;
    let amount_in = balance_in
        .checked_sub(balances[token_in])
        .ok_or(MathError::SubUnderflow(34))?
        .checked_add(1)
        .ok_or(MathError::AddOverflow(32))?;
    Ok((curve_after, amount_in))
}

/// [`swap_out_given_in`] with the swap fee charged on `amount_in`.
///
/// Returns (curve_after, amount_out, fee)
pub fn swap_out_given_in_with_fee(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    token_in: usize,
    token_out: usize,
    amount_in: u128,
    fees: &Fees,
) -> Result<(CurveId, u128, u128), DualCurveError> {
    let (net_amount_in, fee) = fees.subtract_swap_fee(amount_in)?;
    let (curve_after, amount_out) =
        swap_out_given_in(amp1, amp2, balances, token_in, token_out, net_amount_in)?;
    Ok((curve_after, amount_out, fee))
}

/// [`swap_in_given_out`] with the swap fee added on top of the required input.
///
/// Returns (curve_after, amount_in, fee)
pub fn swap_in_given_out_with_fee(
    amp1: u128,
    amp2: u128,
    balances: &Balances,
    token_in: usize,
    token_out: usize,
    amount_out: u128,
    fees: &Fees,
) -> Result<(CurveId, u128, u128), DualCurveError> {
    let (curve_after, net_amount_in) =
        swap_in_given_out(amp1, amp2, balances, token_in, token_out, amount_out)?;
    let (amount_in, fee) = fees.add_swap_fee(net_amount_in)?;
    Ok((curve_after, amount_in, fee))
}
