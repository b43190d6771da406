//! Financial calculator
//!
//! Deterministic, total projection of annual value from request inputs.
//! Every input is clamped to a hard range before it touches the formulas.

use crate::models::{AssumptionSet, FinancialProjection, RequestInput};

/// A closed range plus the value used when the caller sent nothing usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub min: f64,
    pub max: f64,
    pub fallback: f64,
}

impl Bound {
    const fn new(min: f64, max: f64, fallback: f64) -> Self {
        Self { min, max, fallback }
    }

    /// Parse-or-fallback, then clamp.
    pub fn apply(&self, value: Option<f64>) -> f64 {
        value
            .filter(|v| v.is_finite())
            .unwrap_or(self.fallback)
            .clamp(self.min, self.max)
    }
}

pub const PHYSICIAN_COUNT: Bound = Bound::new(1.0, 200_000.0, 1.0);
pub const TIME_SAVED_HRS_PER_DAY: Bound = Bound::new(0.0, 8.0, 0.0);
pub const PATIENT_INCREASE_PER_DAY: Bound = Bound::new(0.0, 30.0, 0.0);

pub const PHYSICIAN_HOURLY_RATE: Bound = Bound::new(80.0, 600.0, 200.0);
pub const REIMBURSEMENT_PER_VISIT: Bound = Bound::new(40.0, 1000.0, 150.0);
pub const SUKI_COST_PER_PHYSICIAN_PER_MONTH: Bound = Bound::new(50.0, 2000.0, 300.0);
pub const WORK_DAYS_PER_YEAR: Bound = Bound::new(180.0, 365.0, 250.0);

const MONTHS_PER_YEAR: f64 = 12.0;

/// Behavioural inputs after fallback and clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveInputs {
    pub physician_count: f64,
    pub time_saved_hrs_per_day: f64,
    pub patient_increase_per_day: f64,
}

pub fn effective_inputs(input: &RequestInput) -> EffectiveInputs {
    EffectiveInputs {
        physician_count: PHYSICIAN_COUNT.apply(input.physician_count),
        time_saved_hrs_per_day: TIME_SAVED_HRS_PER_DAY.apply(input.time_saved_hrs_per_day),
        patient_increase_per_day: PATIENT_INCREASE_PER_DAY.apply(input.patient_increase_per_day),
    }
}

pub fn effective_assumptions(input: &RequestInput) -> AssumptionSet {
    let overrides = input.assumptions.clone().unwrap_or_default();

    AssumptionSet {
        physician_hourly_rate: PHYSICIAN_HOURLY_RATE.apply(overrides.physician_hourly_rate),
        reimbursement_per_visit: REIMBURSEMENT_PER_VISIT.apply(overrides.reimbursement_per_visit),
        suki_cost_per_physician_per_month: SUKI_COST_PER_PHYSICIAN_PER_MONTH
            .apply(overrides.suki_cost_per_physician_per_month),
        work_days_per_year: WORK_DAYS_PER_YEAR.apply(overrides.work_days_per_year),
    }
}

pub fn compute_financials(input: &RequestInput) -> FinancialProjection {
    let inputs = effective_inputs(input);
    let assumptions = effective_assumptions(input);

    let annual_labor_value = inputs.physician_count
        * inputs.time_saved_hrs_per_day
        * assumptions.physician_hourly_rate
        * assumptions.work_days_per_year;

    let annual_revenue_uplift = inputs.physician_count
        * inputs.patient_increase_per_day
        * assumptions.reimbursement_per_visit
        * assumptions.work_days_per_year;

    let annual_suki_cost =
        inputs.physician_count * assumptions.suki_cost_per_physician_per_month * MONTHS_PER_YEAR;

    let annual_total_value = annual_labor_value + annual_revenue_uplift;

    // Unreachable under the current floors, kept so a zero cost can never divide.
    let roi_x = (annual_suki_cost > 0.0).then(|| annual_total_value / annual_suki_cost);

    FinancialProjection {
        assumptions,
        annual_labor_value,
        annual_revenue_uplift,
        annual_suki_cost,
        annual_total_value,
        roi_x,
    }
}
