//! Battery parameters of a single plan request.
//!
//! The energy model is linear: driving `d` km at a consumption rate of
//! `c` %/km drains `d·c` percentage points of charge.  All SOC values are
//! percentages in `[0, 100]`.

use crate::error::{CoreError, CoreResult};

/// The SOC triple carried by every plan request.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryParams {
    /// Charge at departure, percent.
    pub initial_soc: f64,
    /// Minimum charge the vehicle must retain at arrival, percent.
    pub threshold_soc: f64,
    /// Linear drain, percent per kilometre driven.
    pub consumption_pct_per_km: f64,
}

impl BatteryParams {
    pub fn new(initial_soc: f64, threshold_soc: f64, consumption_pct_per_km: f64) -> Self {
        Self { initial_soc, threshold_soc, consumption_pct_per_km }
    }

    /// Reject out-of-range SOC values and non-positive consumption.
    ///
    /// `threshold_soc == initial_soc` is accepted: the search then reports
    /// every path of nonzero length as infeasible, which is the correct
    /// outcome rather than a malformed request.
    pub fn validate(&self) -> CoreResult<()> {
        let err = |msg: String| Err(CoreError::Battery(msg));

        if !self.initial_soc.is_finite() || !(0.0..=100.0).contains(&self.initial_soc) {
            return err(format!("initial_soc {} outside [0, 100]", self.initial_soc));
        }
        if !self.threshold_soc.is_finite()
            || self.threshold_soc < 0.0
            || self.threshold_soc > self.initial_soc
        {
            return err(format!(
                "threshold_soc {} outside [0, initial_soc {}]",
                self.threshold_soc, self.initial_soc
            ));
        }
        if !self.consumption_pct_per_km.is_finite() || self.consumption_pct_per_km <= 0.0 {
            return err(format!(
                "consumption {} %/km must be positive",
                self.consumption_pct_per_km
            ));
        }
        Ok(())
    }

    /// Theoretical range before the threshold is hit, in kilometres.
    #[inline]
    pub fn range_km(&self) -> f64 {
        (self.initial_soc - self.threshold_soc) / self.consumption_pct_per_km
    }

    /// The same parameters after a full recharge to `target_soc`.
    ///
    /// Used for the second leg of a two-segment plan.
    pub fn recharged_to(&self, target_soc: f64) -> Self {
        Self { initial_soc: target_soc, ..*self }
    }
}
