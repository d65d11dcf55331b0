use amm_helpers::{
    constants::dual_curve::{
        AMP_PRECISION, MAX_AMP, MAX_AMP_UPDATE_DAILY_RATE, MIN_AMP, MIN_UPDATE_TIME,
    },
    ensure,
    math::{casted_mul, div_rounded, MathError, Rounding},
};
use primitive_types::U256;
use tracing::debug;

use crate::{CurveId, DualCurveError, Timestamp};

/// Linear amplification schedule of a single sub-curve.
/// Values are scaled by `AMP_PRECISION`.
#[derive(Debug, scale::Encode, scale::Decode, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct AmpRamp {
    /// Amplification when the ramp started.
    start_value: u128,
    /// Amplification reached at `end_time`.
    end_value: u128,
    start_time: Timestamp,
    end_time: Timestamp,
}

impl AmpRamp {
    /// Static ramp at `raw_amp` (not scaled).
    pub fn new(raw_amp: u128) -> Result<Self, DualCurveError> {
        ensure!(
            (MIN_AMP..=MAX_AMP).contains(&raw_amp),
            DualCurveError::AmpOutOfBounds
        );
        let value = raw_amp * AMP_PRECISION;
        Ok(Self {
            start_value: value,
            end_value: value,
            start_time: 0,
            end_time: 0,
        })
    }

    /// Returns (amp, is_ramping) at `now`.
    pub fn current(&self, now: Timestamp) -> Result<(u128, bool), MathError> {
        if now >= self.end_time {
            return Ok((self.end_value, false));
        }
        let duration = self
            .end_time
            .checked_sub(self.start_time)
            .ok_or(MathError::SubUnderflow(51))?;
        let elapsed = now.saturating_sub(self.start_time);
        let value = if self.end_value >= self.start_value {
            let delta = (self.end_value - self.start_value)
                .checked_mul(elapsed as u128)
                .ok_or(MathError::MulOverflow(51))?
                .checked_div(duration as u128)
                .ok_or(MathError::DivByZero(51))?;
            self.start_value
                .checked_add(delta)
                .ok_or(MathError::AddOverflow(51))?
        } else {
            let delta = (self.start_value - self.end_value)
                .checked_mul(elapsed as u128)
                .ok_or(MathError::MulOverflow(52))?
                .checked_div(duration as u128)
                .ok_or(MathError::DivByZero(52))?;
            self.start_value
                .checked_sub(delta)
                .ok_or(MathError::SubUnderflow(52))?
        };
        Ok((value, true))
    }

    /// Starts ramping from the current value to `raw_end_value` (not scaled),
    /// reached at `end_time`.
    pub fn start(
        &mut self,
        raw_end_value: u128,
        end_time: Timestamp,
        now: Timestamp,
    ) -> Result<(), DualCurveError> {
        ensure!(
            (MIN_AMP..=MAX_AMP).contains(&raw_end_value),
            DualCurveError::AmpOutOfBounds
        );
        let duration = end_time
            .checked_sub(now)
            .ok_or(DualCurveError::RampDurationTooShort)?;
        ensure!(
            duration >= MIN_UPDATE_TIME,
            DualCurveError::RampDurationTooShort
        );
        let (current_value, is_ramping) = self.current(now)?;
        ensure!(!is_ramping, DualCurveError::AmpAlreadyRamping);

        let end_value = raw_end_value * AMP_PRECISION;
        // change per day, relative to the current value
        let (to, from) = if end_value > current_value {
            (end_value, current_value)
        } else {
            (current_value, end_value)
        };
        let daily_rate = div_rounded(
            casted_mul(to, MIN_UPDATE_TIME as u128),
            casted_mul(from, duration as u128),
            Rounding::Up,
        )?;
        ensure!(
            daily_rate <= U256::from(MAX_AMP_UPDATE_DAILY_RATE),
            DualCurveError::AmpRateTooHigh
        );

        *self = Self {
            start_value: current_value,
            end_value,
            start_time: now,
            end_time,
        };
        Ok(())
    }

    /// Freezes the amplification at its value at `now`. Returns the frozen value.
    pub fn stop(&mut self, now: Timestamp) -> Result<u128, DualCurveError> {
        let (current_value, is_ramping) = self.current(now)?;
        ensure!(is_ramping, DualCurveError::NoActiveAmpRamp);
        *self = Self {
            start_value: current_value,
            end_value: current_value,
            start_time: now,
            end_time: now,
        };
        Ok(current_value)
    }
}

/// Amplification schedules of both sub-curves.
#[derive(Debug, scale::Encode, scale::Decode, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "std",
    derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
)]
pub struct AmpRamps {
    curve1: AmpRamp,
    curve2: AmpRamp,
}

impl AmpRamps {
    pub fn new(raw_amp1: u128, raw_amp2: u128) -> Result<Self, DualCurveError> {
        Ok(Self {
            curve1: AmpRamp::new(raw_amp1)?,
            curve2: AmpRamp::new(raw_amp2)?,
        })
    }

    fn ramp_mut(&mut self, curve: CurveId) -> &mut AmpRamp {
        match curve {
            CurveId::Curve1 => &mut self.curve1,
            CurveId::Curve2 => &mut self.curve2,
        }
    }

    pub fn ramp(&self, curve: CurveId) -> &AmpRamp {
        match curve {
            CurveId::Curve1 => &self.curve1,
            CurveId::Curve2 => &self.curve2,
        }
    }

    pub fn start(
        &mut self,
        curve: CurveId,
        raw_end_value: u128,
        end_time: Timestamp,
        now: Timestamp,
    ) -> Result<(), DualCurveError> {
        self.ramp_mut(curve).start(raw_end_value, end_time, now)?;
        debug!(
            curve = curve.tag(),
            end_value = raw_end_value * AMP_PRECISION,
            end_time,
            "amplification ramp started"
        );
        Ok(())
    }

    pub fn stop(&mut self, curve: CurveId, now: Timestamp) -> Result<u128, DualCurveError> {
        let value = self.ramp_mut(curve).stop(now)?;
        debug!(curve = curve.tag(), value, "amplification ramp stopped");
        Ok(value)
    }

    /// Returns (amp, is_ramping) of `curve` at `now`.
    pub fn current(&self, curve: CurveId, now: Timestamp) -> Result<(u128, bool), MathError> {
        self.ramp(curve).current(now)
    }

    /// Returns (amp1, amp2) at `now`.
    pub fn current_amps(&self, now: Timestamp) -> Result<(u128, u128), MathError> {
        Ok((self.curve1.current(now)?.0, self.curve2.current(now)?.0))
    }
}
