//! Planner configuration.
//!
//! One `PlannerConfig` is shared by every search a planner instance runs.
//! The defaults reproduce the tuning the system ships with; applications
//! typically load overrides from a TOML/JSON file and pass the struct down.

use crate::error::{CoreError, CoreResult};

/// What to do when the snapped endpoints fall into different weakly-connected
/// components of the road graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ComponentPolicy {
    /// Re-snap both endpoints to the nearest nodes of the largest component
    /// and plan there.
    #[default]
    ResnapLargest,
    /// Treat disjoint endpoints as an invalid address.
    Strict,
}

/// Tuning knobs of the Pareto search and the two-segment planner.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Cap `K` on the accepted Pareto set of a direct search, applied before
    /// similarity filtering.  Default: 10.
    pub max_paths: usize,

    /// Per-leg cap for the two-segment planner.  Default: 5.
    pub leg_max_paths: usize,

    /// Relative tolerance ε of the goal-level dominance test.  A candidate is
    /// rejected when an accepted route beats it on both objectives by this
    /// margin.  State-level dominance stays strict.  Default: 0.05.
    pub dominance_tolerance: f64,

    /// Minimum relative travel-time gap between kept routes.  Default: 0.02.
    pub similarity_threshold: f64,

    /// Margin applied to the usable SOC window when computing the detour
    /// budget of an infeasible path.  Default: 0.85.
    pub safety_factor: f64,

    /// Charging speed at a stop, percent per minute.  Default: 3.0.
    pub charging_rate_pct_per_min: f64,

    /// SOC a charging stop fills the battery to.  Default: 100.0.
    pub charge_target_soc: f64,

    /// Upper bound on frontier entries.  Pushes past the cap are dropped,
    /// so overflow degrades into frontier exhaustion.  Default: 1_000_000.
    pub frontier_cap: usize,

    /// Per-node cap `M` on retained dominance-frontier entries.  Default: 64.
    pub dominance_cap: usize,

    /// Disconnected-endpoint handling.  Default: re-snap to the largest
    /// component.
    pub component_policy: ComponentPolicy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_paths: 10,
            leg_max_paths: 5,
            dominance_tolerance: 0.05,
            similarity_threshold: 0.02,
            safety_factor: 0.85,
            charging_rate_pct_per_min: 3.0,
            charge_target_soc: 100.0,
            frontier_cap: 1_000_000,
            dominance_cap: 64,
            component_policy: ComponentPolicy::ResnapLargest,
        }
    }
}

impl PlannerConfig {
    /// Reject configurations that would stall or never accept a route.
    pub fn validate(&self) -> CoreResult<()> {
        let err = |msg: &str| Err(CoreError::Config(msg.to_string()));

        if self.max_paths == 0 || self.leg_max_paths == 0 {
            return err("path caps must be at least 1");
        }
        if self.frontier_cap == 0 || self.dominance_cap == 0 {
            return err("frontier and dominance caps must be at least 1");
        }
        if !self.dominance_tolerance.is_finite() || self.dominance_tolerance < 0.0 {
            return err("dominance tolerance must be finite and non-negative");
        }
        if !self.similarity_threshold.is_finite() || self.similarity_threshold < 0.0 {
            return err("similarity threshold must be finite and non-negative");
        }
        if !self.safety_factor.is_finite() || self.safety_factor <= 0.0 || self.safety_factor > 1.0 {
            return err("safety factor must be in (0, 1]");
        }
        if !self.charging_rate_pct_per_min.is_finite() || self.charging_rate_pct_per_min <= 0.0 {
            return err("charging rate must be positive");
        }
        if !self.charge_target_soc.is_finite()
            || self.charge_target_soc <= 0.0
            || self.charge_target_soc > 100.0
        {
            return err("charge target SOC must be in (0, 100]");
        }
        Ok(())
    }
}
