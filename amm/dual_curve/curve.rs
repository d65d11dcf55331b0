use amm_helpers::math::{MathError, Rounding};

use crate::{invariant::calculate_invariants, Balances};

/// Sub-curve selected by the ordering of the two balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
#[repr(u8)]
pub enum CurveId {
    /// `balances[0] <= balances[1]`
    Curve1 = 1,
    /// `balances[0] > balances[1]`
    Curve2 = 2,
}

impl CurveId {
    pub fn other(self) -> Self {
        match self {
            CurveId::Curve1 => CurveId::Curve2,
            CurveId::Curve2 => CurveId::Curve1,
        }
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Returns the curve that prices the pool at `balances`. Ties go to curve 1.
pub fn active_curve(balances: &Balances) -> CurveId {
    if balances[0] <= balances[1] {
        CurveId::Curve1
    } else {
        CurveId::Curve2
    }
}

pub(crate) fn amp_of(curve: CurveId, amp1: u128, amp2: u128) -> u128 {
    match curve {
        CurveId::Curve1 => amp1,
        CurveId::Curve2 => amp2,
    }
}

/// Amplification and last computed invariant of both sub-curves.
///
/// Each invariant is only comparable against one computed with the
/// amplification stored next to it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct Curve {
    pub amp1: u128,
    pub d1: u128,
    pub amp2: u128,
    pub d2: u128,
}

impl Curve {
    pub fn new(amp1: u128, d1: u128, amp2: u128, d2: u128) -> Self {
        Self { amp1, d1, amp2, d2 }
    }

    /// Snapshot of both invariants at `balances`, as stored after a join or exit.
    pub fn from_balances(amp1: u128, amp2: u128, balances: &Balances) -> Result<Self, MathError> {
        let (d1, d2) = calculate_invariants(amp1, amp2, balances, Rounding::Down)?;
        Ok(Self::new(amp1, d1, amp2, d2))
    }

    pub fn amp(&self, curve: CurveId) -> u128 {
        amp_of(curve, self.amp1, self.amp2)
    }

    pub fn invariant(&self, curve: CurveId) -> u128 {
        match curve {
            CurveId::Curve1 => self.d1,
            CurveId::Curve2 => self.d2,
        }
    }
}
