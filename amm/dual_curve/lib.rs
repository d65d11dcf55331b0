#![cfg_attr(not(feature = "std"), no_std)]

mod amp_coef;
mod curve;
mod errors;
pub mod fees;
mod invariant;
pub mod liquidity;
pub mod math;
pub mod protocol_fees;
pub mod swap;

/// Token balances of a two-token pool, 18-decimal fixed point, already rate-adjusted.
pub type Balances = [u128; 2];

/// Seconds.
pub type Timestamp = u64;

pub use amm_helpers::math::{MathError, Rounding};
pub use amp_coef::{AmpRamp, AmpRamps};
pub use curve::{active_curve, Curve, CurveId};
pub use errors::DualCurveError;
pub use fees::Fees;
pub use invariant::{calculate_invariant, calculate_invariants, invariant_across_boundary};
