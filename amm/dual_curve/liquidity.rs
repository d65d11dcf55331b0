use amm_helpers::{
    constants::dual_curve::ONE,
    ensure,
    math::{add, complement, div_down, div_up, mul_down, mul_up, sub, MathError, Rounding},
};
use tracing::debug;

use crate::{
    curve::{active_curve, Curve},
    math::{compute_balance, compute_invariant},
    Balances, DualCurveError,
};

fn sum_balances(balances: &Balances) -> Result<u128, MathError> {
    add(balances[0], balances[1])
}

/// Invariant of `new_balances` on the curve they land on, and the invariant
/// previously recorded for that curve.
///
/// Returns (new_invariant, old_invariant)
fn landing_invariants(curve: &Curve, new_balances: &Balances) -> Result<(u128, u128), MathError> {
    let landing = active_curve(new_balances);
    let new_invariant = compute_invariant(curve.amp(landing), new_balances, Rounding::Down)?;
    Ok((new_invariant, curve.invariant(landing)))
}

/// Solves the balance of `token_index` for the recorded invariant scaled by
/// `invariant_ratio`. Starts on the curve of `balances` and re-solves once on
/// the other curve when the result lands past the boundary.
fn solve_scaled_balance(
    curve: &Curve,
    balances: &Balances,
    token_index: usize,
    invariant_ratio: u128,
) -> Result<u128, MathError> {
    let start = active_curve(balances);
    let target = mul_up(curve.invariant(start), invariant_ratio)?;
    let mut new_balances = *balances;
    new_balances[token_index] =
        compute_balance(curve.amp(start), balances, target, token_index, Rounding::Up)?;
    if active_curve(&new_balances) == start {
        return Ok(new_balances[token_index]);
    }
    let landing = start.other();
    debug!(
        from = start.tag(),
        to = landing.tag(),
        token_index,
        "single token liquidity change crosses the curve boundary"
    );
    let target = mul_up(curve.invariant(landing), invariant_ratio)?;
    compute_balance(curve.amp(landing), balances, target, token_index, Rounding::Up)
}

/// BPT minted for depositing `amounts_in`. The part of each deposit above the
/// proportional share is charged the swap fee.
/// Rounded down. Returns 0 when the invariant does not grow.
pub fn bpt_out_given_tokens_in(
    curve: &Curve,
    balances: &Balances,
    amounts_in: &Balances,
    bpt_supply: u128,
    swap_fee_percentage: u128,
) -> Result<u128, DualCurveError> {
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    let sum = sum_balances(balances)?;
    let mut ratios_with_fee = [0u128; 2];
    let mut invariant_ratio_with_fees = 0;
    for i in 0..2 {
        let weight = div_down(balances[i], sum)?;
        ratios_with_fee[i] = div_down(add(balances[i], amounts_in[i])?, balances[i])?;
        invariant_ratio_with_fees = add(
            invariant_ratio_with_fees,
            mul_down(ratios_with_fee[i], weight)?,
        )?;
    }

    let mut new_balances = [0u128; 2];
    for i in 0..2 {
        let amount_in_without_fee = if ratios_with_fee[i] > invariant_ratio_with_fees {
            let non_taxable =
                mul_down(balances[i], invariant_ratio_with_fees.saturating_sub(ONE))?;
            let taxable = sub(amounts_in[i], non_taxable)?;
            add(
                non_taxable,
                mul_down(taxable, complement(swap_fee_percentage))?,
            )?
        } else {
            amounts_in[i]
        };
        new_balances[i] = add(balances[i], amount_in_without_fee)?;
    }

    let (new_invariant, old_invariant) = landing_invariants(curve, &new_balances)?;
    let invariant_ratio = div_down(new_invariant, old_invariant)?;
    if invariant_ratio > ONE {
        Ok(mul_down(bpt_supply, invariant_ratio - ONE)?)
    } else {
        Ok(0)
    }
}

/// Amount of `token_index` to deposit for exactly `bpt_out`. Rounded up.
pub fn token_in_given_bpt_out(
    curve: &Curve,
    balances: &Balances,
    token_index: usize,
    bpt_out: u128,
    bpt_supply: u128,
    swap_fee_percentage: u128,
) -> Result<u128, DualCurveError> {
    ensure!(token_index < 2, DualCurveError::InvalidTokenIndex);
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    let invariant_ratio = div_up(add(bpt_supply, bpt_out)?, bpt_supply)?;
    let new_balance = solve_scaled_balance(curve, balances, token_index, invariant_ratio)?;
    let amount_in_without_fee = sub(new_balance, balances[token_index])?;

    let weight = div_down(balances[token_index], sum_balances(balances)?)?;
    let taxable = mul_up(amount_in_without_fee, complement(weight))?;
    let non_taxable = sub(amount_in_without_fee, taxable)?;
    Ok(add(
        non_taxable,
        div_up(taxable, complement(swap_fee_percentage))?,
    )?)
}

/// BPT burned for withdrawing exactly `amounts_out`. The part of each
/// withdrawal above the proportional share is charged the swap fee.
/// Rounded up.
pub fn bpt_in_given_tokens_out(
    curve: &Curve,
    balances: &Balances,
    amounts_out: &Balances,
    bpt_supply: u128,
    swap_fee_percentage: u128,
) -> Result<u128, DualCurveError> {
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    let sum = sum_balances(balances)?;
    let mut ratios_without_fee = [0u128; 2];
    let mut invariant_ratio_without_fees = 0;
    for i in 0..2 {
        let weight = div_up(balances[i], sum)?;
        ratios_without_fee[i] = div_up(sub(balances[i], amounts_out[i])?, balances[i])?;
        invariant_ratio_without_fees = add(
            invariant_ratio_without_fees,
            mul_up(ratios_without_fee[i], weight)?,
        )?;
    }

    let mut new_balances = [0u128; 2];
    for i in 0..2 {
        let amount_out_with_fee = if invariant_ratio_without_fees > ratios_without_fee[i] {
            let non_taxable = mul_down(balances[i], complement(invariant_ratio_without_fees))?;
            let taxable = sub(amounts_out[i], non_taxable)?;
            add(
                non_taxable,
                div_up(taxable, complement(swap_fee_percentage))?,
            )?
        } else {
            amounts_out[i]
        };
        new_balances[i] = sub(balances[i], amount_out_with_fee)?;
    }

    let (new_invariant, old_invariant) = landing_invariants(curve, &new_balances)?;
    let invariant_ratio = div_down(new_invariant, old_invariant)?;
    Ok(mul_up(bpt_supply, complement(invariant_ratio))?)
}

/// Amount of `token_index` paid out for burning exactly `bpt_in`. Rounded down.
pub fn token_out_given_bpt_in(
    curve: &Curve,
    balances: &Balances,
    token_index: usize,
    bpt_in: u128,
    bpt_supply: u128,
    swap_fee_percentage: u128,
) -> Result<u128, DualCurveError> {
    ensure!(token_index < 2, DualCurveError::InvalidTokenIndex);
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    let invariant_ratio = div_up(sub(bpt_supply, bpt_in)?, bpt_supply)?;
    let new_balance = solve_scaled_balance(curve, balances, token_index, invariant_ratio)?;
    let amount_out_without_fee = sub(balances[token_index], new_balance)?;

    let weight = div_down(balances[token_index], sum_balances(balances)?)?;
    let taxable = mul_up(amount_out_without_fee, complement(weight))?;
    let non_taxable = sub(amount_out_without_fee, taxable)?;
    Ok(add(
        non_taxable,
        mul_down(taxable, complement(swap_fee_percentage))?,
    )?)
}

/// Token amounts to deposit for exactly `bpt_out`, in pool proportions.
/// Rounded up.
pub fn amounts_in_for_exact_bpt_out(
    balances: &Balances,
    bpt_out: u128,
    bpt_supply: u128,
) -> Result<Balances, DualCurveError> {
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    let ratio = div_up(bpt_out, bpt_supply)?;
    Ok([mul_up(balances[0], ratio)?, mul_up(balances[1], ratio)?])
}

/// Token amounts paid out for burning exactly `bpt_in`, in pool proportions.
/// Rounded down.
pub fn amounts_out_for_exact_bpt_in(
    balances: &Balances,
    bpt_in: u128,
    bpt_supply: u128,
) -> Result<Balances, DualCurveError> {
    ensure!(bpt_supply != 0, DualCurveError::ZeroBptSupply);
    ensure!(bpt_in <= bpt_supply, MathError::SubUnderflow(61));
    let ratio = div_down(bpt_in, bpt_supply)?;
    Ok([mul_down(balances[0], ratio)?, mul_down(balances[1], ratio)?])
}

/// First deposit into an empty pool. BPT minted equals the invariant of the
/// deposit on its active curve.
///
/// Returns (bpt_out, curve) where `curve` is the state to record.
pub fn bpt_for_initial_join(
    amp1: u128,
    amp2: u128,
    amounts_in: &Balances,
) -> Result<(u128, Curve), DualCurveError> {
    ensure!(
        amounts_in[0] != 0 && amounts_in[1] != 0,
        MathError::DivByZero(61)
    );
    let curve = Curve::from_balances(amp1, amp2, amounts_in)?;
    let bpt_out = curve.invariant(active_curve(amounts_in));
    debug!(bpt_out, curve = active_curve(amounts_in).tag(), "initial join");
    Ok((bpt_out, curve))
}
