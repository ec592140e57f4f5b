use crate::domain::{DomainError, EnergyReading};

pub const DEFAULT_BASE_RATE: f64 = 0.15;

/// Hours in the fixed 30-day billing month used for projections.
pub const HOURS_PER_MONTH: f64 = 24.0 * 30.0;

const WATTS_PER_KILOWATT: f64 = 1000.0;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("base rate must be a positive finite number, got {0}")]
    InvalidBaseRate(f64),
    #[error("reading {index} is outside the analytics domain: {source}")]
    Domain {
        index: usize,
        #[source]
        source: DomainError,
    },
}

/// Result of comparing a projected monthly cost against a budget.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BudgetCheck {
    pub exceeded: bool,
    pub projected_cost: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergySummary {
    pub total_readings: usize,
    pub efficiency_score: f64,
    pub projected_cost: f64,
    pub budget: f64,
    pub exceeded: bool,
}

/// Cost and efficiency figures over a batch of readings.
///
/// All operations are pure over their input slice. Every reading must pass
/// [`EnergyReading::check_domain`]; the first one that does not fails the
/// whole call, so a NaN never leaks out as a result. An empty slice yields
/// `0.0` for both the score and the cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyAnalytics {
    base_rate: f64,
}

impl Default for EnergyAnalytics {
    fn default() -> Self {
        Self {
            base_rate: DEFAULT_BASE_RATE,
        }
    }
}

impl EnergyAnalytics {
    /// `base_rate` is the price of one kWh.
    pub fn new(base_rate: f64) -> Result<Self, AnalyticsError> {
        if !base_rate.is_finite() || base_rate <= 0.0 {
            return Err(AnalyticsError::InvalidBaseRate(base_rate));
        }
        Ok(Self { base_rate })
    }

    pub fn base_rate(&self) -> f64 {
        self.base_rate
    }

    /// Mean of a heuristic per-reading efficiency that penalises phase shift
    /// through a synthetic harmonic-loss term and damps high currents.
    pub fn efficiency_score(&self, readings: &[EnergyReading]) -> Result<f64, AnalyticsError> {
        check_all(readings)?;
        if readings.is_empty() {
            return Ok(0.0);
        }

        let total: f64 = readings.iter().map(reading_efficiency).sum();
        Ok(total / readings.len() as f64)
    }

    /// Projects a month of cost from the average real power of `readings`,
    /// assuming that draw holds around the clock for `HOURS_PER_MONTH`.
    ///
    /// This is one blended average over every reading. It is not weighted by
    /// the time between samples and has no per-device breakdown.
    pub fn project_monthly_cost(&self, readings: &[EnergyReading]) -> Result<f64, AnalyticsError> {
        check_all(readings)?;
        if readings.is_empty() {
            return Ok(0.0);
        }

        let total_power_watts: f64 = readings.iter().map(EnergyReading::power_watts).sum();
        let avg_power_kw = (total_power_watts / readings.len() as f64) / WATTS_PER_KILOWATT;
        let monthly_energy_kwh = avg_power_kw * HOURS_PER_MONTH;

        Ok(monthly_energy_kwh * self.base_rate)
    }

    /// A cost exactly equal to `budget` is not over budget.
    pub fn check_budget_exceeded(
        &self,
        readings: &[EnergyReading],
        budget: f64,
    ) -> Result<BudgetCheck, AnalyticsError> {
        let projected_cost = self.project_monthly_cost(readings)?;
        Ok(BudgetCheck {
            exceeded: projected_cost > budget,
            projected_cost,
        })
    }

    pub fn summarize(
        &self,
        readings: &[EnergyReading],
        budget: f64,
    ) -> Result<EnergySummary, AnalyticsError> {
        let efficiency_score = self.efficiency_score(readings)?;
        let check = self.check_budget_exceeded(readings, budget)?;

        Ok(EnergySummary {
            total_readings: readings.len(),
            efficiency_score,
            projected_cost: check.projected_cost,
            budget,
            exceeded: check.exceeded,
        })
    }
}

fn check_all(readings: &[EnergyReading]) -> Result<(), AnalyticsError> {
    for (index, r) in readings.iter().enumerate() {
        r.check_domain()
            .map_err(|source| AnalyticsError::Domain { index, source })?;
    }
    Ok(())
}

fn reading_efficiency(r: &EnergyReading) -> f64 {
    let phase_angle = r.power_factor.acos();
    let harmonic_loss_factor = (phase_angle * 2.0).sin().powi(2);

    (r.power_factor * (-harmonic_loss_factor).exp()) / (1.0 + r.current.ln_1p())
}
