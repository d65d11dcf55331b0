use dual_curve::{
    liquidity, protocol_fees::protocol_fee_bpt, swap, AmpRamps, Balances, Curve, CurveId,
    DualCurveError, Fees, Timestamp,
};

pub use amm_helpers::constants::dual_curve::{AMP_PRECISION, ONE};

pub const DAY: Timestamp = 86_400;

/// Minimal settlement ledger around the pricing core: it holds the balances,
/// the BPT supply and the recorded curve, and applies the returned deltas.
#[derive(Debug, Clone)]
pub struct SimPool {
    pub balances: Balances,
    pub bpt_supply: u128,
    pub protocol_bpt: u128,
    pub curve: Curve,
    pub ramps: AmpRamps,
    pub fees: Fees,
    pub now: Timestamp,
}

impl SimPool {
    pub fn new(
        raw_amp1: u128,
        raw_amp2: u128,
        fees: Fees,
        amounts_in: Balances,
    ) -> Result<Self, DualCurveError> {
        let ramps = AmpRamps::new(raw_amp1, raw_amp2)?;
        let (amp1, amp2) = ramps.current_amps(0)?;
        let (bpt_out, curve) = liquidity::bpt_for_initial_join(amp1, amp2, &amounts_in)?;
        Ok(Self {
            balances: amounts_in,
            bpt_supply: bpt_out,
            protocol_bpt: 0,
            curve,
            ramps,
            fees,
            now: 0,
        })
    }

    pub fn warp(&mut self, seconds: Timestamp) {
        self.now += seconds;
    }

    pub fn swap_exact_in(
        &mut self,
        token_in: usize,
        token_out: usize,
        amount_in: u128,
    ) -> Result<(CurveId, u128), DualCurveError> {
        let (amp1, amp2) = self.ramps.current_amps(self.now)?;
        let (curve_after, amount_out, _) = swap::swap_out_given_in_with_fee(
            amp1,
            amp2,
            &self.balances,
            token_in,
            token_out,
            amount_in,
            &self.fees,
        )?;
        self.balances[token_in] += amount_in;
        self.balances[token_out] -= amount_out;
        Ok((curve_after, amount_out))
    }

    pub fn swap_exact_out(
        &mut self,
        token_in: usize,
        token_out: usize,
        amount_out: u128,
    ) -> Result<(CurveId, u128), DualCurveError> {
        let (amp1, amp2) = self.ramps.current_amps(self.now)?;
        let (curve_after, amount_in, _) = swap::swap_in_given_out_with_fee(
            amp1,
            amp2,
            &self.balances,
            token_in,
            token_out,
            amount_out,
            &self.fees,
        )?;
        self.balances[token_in] += amount_in;
        self.balances[token_out] -= amount_out;
        Ok((curve_after, amount_in))
    }

    /// Settles protocol fees against the recorded curve, then records the
    /// curve again with the current amplification.
    fn before_join_exit(&mut self) -> Result<(), DualCurveError> {
        let fee_bpt = protocol_fee_bpt(&self.curve, &self.balances, self.bpt_supply, &self.fees)?;
        self.protocol_bpt += fee_bpt;
        self.bpt_supply += fee_bpt;
        let (amp1, amp2) = self.ramps.current_amps(self.now)?;
        self.curve = Curve::from_balances(amp1, amp2, &self.balances)?;
        Ok(())
    }

    fn after_join_exit(&mut self) -> Result<(), DualCurveError> {
        self.curve = Curve::from_balances(self.curve.amp1, self.curve.amp2, &self.balances)?;
        Ok(())
    }

    pub fn join_exact_tokens_in(&mut self, amounts_in: Balances) -> Result<u128, DualCurveError> {
        self.before_join_exit()?;
        let bpt_out = liquidity::bpt_out_given_tokens_in(
            &self.curve,
            &self.balances,
            &amounts_in,
            self.bpt_supply,
            self.fees.swap_fee_percentage,
        )?;
        for (balance, amount) in self.balances.iter_mut().zip(amounts_in) {
            *balance += amount;
        }
        self.bpt_supply += bpt_out;
        self.after_join_exit()?;
        Ok(bpt_out)
    }

    pub fn join_exact_bpt_out(
        &mut self,
        token_index: usize,
        bpt_out: u128,
    ) -> Result<u128, DualCurveError> {
        self.before_join_exit()?;
        let amount_in = liquidity::token_in_given_bpt_out(
            &self.curve,
            &self.balances,
            token_index,
            bpt_out,
            self.bpt_supply,
            self.fees.swap_fee_percentage,
        )?;
        self.balances[token_index] += amount_in;
        self.bpt_supply += bpt_out;
        self.after_join_exit()?;
        Ok(amount_in)
    }

    pub fn join_proportional(&mut self, bpt_out: u128) -> Result<Balances, DualCurveError> {
        self.before_join_exit()?;
        let amounts_in =
            liquidity::amounts_in_for_exact_bpt_out(&self.balances, bpt_out, self.bpt_supply)?;
        for (balance, amount) in self.balances.iter_mut().zip(amounts_in) {
            *balance += amount;
        }
        self.bpt_supply += bpt_out;
        self.after_join_exit()?;
        Ok(amounts_in)
    }

    pub fn exit_exact_tokens_out(&mut self, amounts_out: Balances) -> Result<u128, DualCurveError> {
        self.before_join_exit()?;
        let bpt_in = liquidity::bpt_in_given_tokens_out(
            &self.curve,
            &self.balances,
            &amounts_out,
            self.bpt_supply,
            self.fees.swap_fee_percentage,
        )?;
        for (balance, amount) in self.balances.iter_mut().zip(amounts_out) {
            *balance -= amount;
        }
        self.bpt_supply -= bpt_in;
        self.after_join_exit()?;
        Ok(bpt_in)
    }

    pub fn exit_exact_bpt_in(
        &mut self,
        token_index: usize,
        bpt_in: u128,
    ) -> Result<u128, DualCurveError> {
        self.before_join_exit()?;
        let amount_out = liquidity::token_out_given_bpt_in(
            &self.curve,
            &self.balances,
            token_index,
            bpt_in,
            self.bpt_supply,
            self.fees.swap_fee_percentage,
        )?;
        self.balances[token_index] -= amount_out;
        self.bpt_supply -= bpt_in;
        self.after_join_exit()?;
        Ok(amount_out)
    }

    pub fn exit_proportional(&mut self, bpt_in: u128) -> Result<Balances, DualCurveError> {
        self.before_join_exit()?;
        let amounts_out =
            liquidity::amounts_out_for_exact_bpt_in(&self.balances, bpt_in, self.bpt_supply)?;
        for (balance, amount) in self.balances.iter_mut().zip(amounts_out) {
            *balance -= amount;
        }
        self.bpt_supply -= bpt_in;
        self.after_join_exit()?;
        Ok(amounts_out)
    }
}

pub fn fees(swap_fee_percentage: u128, protocol_swap_fee_percentage: u128) -> Fees {
    Fees::new(swap_fee_percentage, protocol_swap_fee_percentage)
        .unwrap_or_else(|err| panic!("Should create fees: {err:?}"))
}

/// Balanced pool with 1000 of each token.
pub fn setup_pool(raw_amp1: u128, raw_amp2: u128, fees: Fees) -> SimPool {
    SimPool::new(raw_amp1, raw_amp2, fees, [1_000 * ONE, 1_000 * ONE])
        .unwrap_or_else(|err| panic!("Should create pool: {err:?}"))
}
