use amm_helpers::{
    constants::dual_curve::{AMP_PRECISION, MAX_ITERATIONS},
    ensure,
    math::{casted_mul, div_rounded, to_u128, MathError, Rounding},
};
use primitive_types::U256;
use tracing::trace;

use crate::Balances;

/// n^n for a two-token curve
const N_POW_N: u128 = 4;

/// Returns true when two successive Newton estimates differ by at most 1.
fn converged(next: U256, prev: U256) -> bool {
    if next > prev {
        next - prev <= U256::one()
    } else {
        prev - next <= U256::one()
    }
}

/// A * n^n, scaled by `AMP_PRECISION`
fn ann(amp: u128) -> U256 {
    casted_mul(amp, N_POW_N)
}

/// Computes the stable swap invariant (D) of a single two-token curve.
///
/// `amp` is scaled by `AMP_PRECISION`. The final division of each Newton
/// step is rounded in the `rounding` direction.
pub fn compute_invariant(
    amp: u128,
    balances: &Balances,
    rounding: Rounding,
) -> Result<u128, MathError> {
    // SUM{x_i}
    let sum = U256::from(balances[0]) + U256::from(balances[1]);
    if sum.is_zero() {
        return Ok(0);
    }
    ensure!(
        balances[0] != 0 && balances[1] != 0,
        MathError::DivByZero(11)
    );
    let ann = ann(amp);
    // A * n^n * SUM{x_i}
    let ann_sum = ann.checked_mul(sum).ok_or(MathError::MulOverflow(11))?;
    // (A * n^n - 1), scaled by AMP_PRECISION
    let ann_sub_one = ann
        .checked_sub(AMP_PRECISION.into())
        .ok_or(MathError::SubUnderflow(11))?;
    let (low, high) = if balances[0] <= balances[1] {
        (balances[0], balances[1])
    } else {
        (balances[1], balances[0])
    };
    let mut d = sum;
    for _ in 0..MAX_ITERATIONS {
        let d_next = compute_d_next(d, low, high, ann_sum, ann_sub_one, rounding)?;
        if converged(d_next, d) {
            return to_u128(d_next, 11);
        }
        d = d_next;
    }
    trace!(
        amp,
        ?balances,
        last = %d,
        "invariant did not converge"
    );
    Err(MathError::DidNotConverge(1))
}

/// D' = (Ann * S + n * D_P) * D / ((Ann - 1) * D + (n + 1) * D_P)
/// where D_P = D^(n+1) / (n^n * PROD{x_i})
///
/// `low <= high` are the balances. Dividing by the smaller one first keeps
/// the truncation error of D_P within a few units.
fn compute_d_next(
    d_prev: U256,
    low: u128,
    high: u128,
    ann_sum: U256,
    ann_sub_one: U256,
    rounding: Rounding,
) -> Result<U256, MathError> {
    // D' falls as D_P grows, so D_P is rounded the other way
    let mut d_prod = d_prev;
    for amount in [low, high] {
        d_prod = div_rounded(
            d_prod
                .checked_mul(d_prev)
                .ok_or(MathError::MulOverflow(12))?,
            casted_mul(amount, 2),
            rounding.flip(),
        )?;
    }
    let numerator = d_prod
        .checked_mul(casted_mul(AMP_PRECISION, 2))
        .ok_or(MathError::MulOverflow(13))?
        .checked_add(ann_sum)
        .ok_or(MathError::AddOverflow(11))?
        .checked_mul(d_prev)
        .ok_or(MathError::MulOverflow(14))?;
    let denominator = ann_sub_one
        .checked_mul(d_prev)
        .ok_or(MathError::MulOverflow(15))?
        .checked_add(
            d_prod
                .checked_mul(casted_mul(AMP_PRECISION, 3))
                .ok_or(MathError::MulOverflow(16))?,
        )
        .ok_or(MathError::AddOverflow(12))?;
    div_rounded(numerator, denominator, rounding)
}

/// Returns the balance of `token_index` that puts the pool on invariant `d`
/// while the other balance stays as given.
///
/// The current value at `token_index` is ignored. With `Rounding::Up` the
/// result is never below the exact solution.
pub fn compute_balance(
    amp: u128,
    balances: &Balances,
    d: u128,
    token_index: usize,
    rounding: Rounding,
) -> Result<u128, MathError> {
    let other_index = 1usize
        .checked_sub(token_index)
        .ok_or(MathError::SubUnderflow(14))?;
    let other = balances[other_index];
    ensure!(other != 0, MathError::DivByZero(12));
    let ann = ann(amp);
    let d: U256 = d.into();
    // c = D^(n+1) / (n^n * x_other * Ann)
    let c = div_rounded(
        div_rounded(
            d.checked_mul(d).ok_or(MathError::MulOverflow(17))?,
            casted_mul(other, N_POW_N),
            rounding,
        )?
        .checked_mul(d)
        .and_then(|v| v.checked_mul(AMP_PRECISION.into()))
        .ok_or(MathError::MulOverflow(18))?,
        ann,
        rounding,
    )?;
    // b = x_other + D / Ann, D is subtracted in every step
    let b = div_rounded(
        d.checked_mul(AMP_PRECISION.into())
            .ok_or(MathError::MulOverflow(19))?,
        ann,
        rounding.flip(),
    )?
    .checked_add(other.into())
    .ok_or(MathError::AddOverflow(13))?;

    let mut y = d;
    for _ in 0..MAX_ITERATIONS {
        let y_next = compute_y_next(y, b, c, d, rounding)?;
        if converged(y_next, y) {
            return to_u128(y_next, 12);
        }
        y = y_next;
    }
    trace!(amp, ?balances, token_index, last = %y, "balance did not converge");
    Err(MathError::DidNotConverge(2))
}

/// y' = (y^2 + c) / (2y + b - D)
fn compute_y_next(
    y_prev: U256,
    b: U256,
    c: U256,
    d: U256,
    rounding: Rounding,
) -> Result<U256, MathError> {
    let numerator = y_prev
        .checked_mul(y_prev)
        .ok_or(MathError::MulOverflow(20))?
        .checked_add(c)
        .ok_or(MathError::AddOverflow(14))?;
    let denominator = y_prev
        .checked_mul(2.into())
        .ok_or(MathError::MulOverflow(21))?
        .checked_add(b)
        .ok_or(MathError::AddOverflow(15))?
        .checked_sub(d)
        .ok_or(MathError::SubUnderflow(12))?;
    div_rounded(numerator, denominator, rounding)
}

/// Finds the point `(z, z)` on the boundary between the two curves that lies
/// on invariant `d` of the curve with amplification `amp`.
pub fn project_to_boundary(amp: u128, d: u128) -> Result<Balances, MathError> {
    if d == 0 {
        return Ok([0, 0]);
    }
    let ann = ann(amp);
    let d: U256 = d.into();
    // (Ann - 1) * D, scaled back by AMP_PRECISION
    let ann_sub_one_d = ann
        .checked_sub(AMP_PRECISION.into())
        .ok_or(MathError::SubUnderflow(13))?
        .checked_mul(d)
        .ok_or(MathError::MulOverflow(22))?
        / U256::from(AMP_PRECISION);
    let mut z = d;
    for _ in 0..MAX_ITERATIONS {
        let z_next = compute_z_next(z, ann, ann_sub_one_d, d)?;
        if converged(z_next, z) {
            let z = to_u128(z_next, 13)?;
            return Ok([z, z]);
        }
        z = z_next;
    }
    trace!(amp, last = %z, "boundary projection did not converge");
    Err(MathError::DidNotConverge(3))
}

/// Newton step for f(z) = Ann * 2z + D - Ann * D - D^3 / (4z^2):
/// z' = ((Ann - 1) * D + 3q) * z / (2 * Ann * z + 2q), where q = D^3 / (4z^2)
fn compute_z_next(
    z_prev: U256,
    ann: U256,
    ann_sub_one_d: U256,
    d: U256,
) -> Result<U256, MathError> {
    let two_z = z_prev
        .checked_mul(2.into())
        .ok_or(MathError::MulOverflow(23))?;
    let q = div_rounded(
        div_rounded(
            d.checked_mul(d).ok_or(MathError::MulOverflow(24))?,
            two_z,
            Rounding::Down,
        )?
        .checked_mul(d)
        .ok_or(MathError::MulOverflow(25))?,
        two_z,
        Rounding::Down,
    )?;
    let numerator = q
        .checked_mul(3.into())
        .and_then(|q3| q3.checked_add(ann_sub_one_d))
        .and_then(|v| v.checked_mul(z_prev))
        .ok_or(MathError::MulOverflow(26))?;
    let denominator = (ann
        .checked_mul(two_z)
        .ok_or(MathError::MulOverflow(27))?
        / U256::from(AMP_PRECISION))
    .checked_add(q.checked_mul(2.into()).ok_or(MathError::MulOverflow(28))?)
    .ok_or(MathError::AddOverflow(16))?;
    div_rounded(numerator, denominator, Rounding::Down)
}
