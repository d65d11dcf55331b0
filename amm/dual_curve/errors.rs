use crate::MathError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub enum DualCurveError {
    MathError(MathError),
    /// Amplification outside of `[MIN_AMP, MAX_AMP]`.
    AmpOutOfBounds,
    RampDurationTooShort,
    /// Amplification would change by more than `MAX_AMP_UPDATE_DAILY_RATE` per day.
    AmpRateTooHigh,
    AmpAlreadyRamping,
    NoActiveAmpRamp,
    InvalidTokenIndex,
    IdenticalTokenIndex,
    ZeroBptSupply,
    FeeTooHigh,
}

impl From<MathError> for DualCurveError {
    fn from(error: MathError) -> Self {
        DualCurveError::MathError(error)
    }
}
