//! Core data models for the ROI narrative service

use crate::error::RoiError;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Clinical,
    Operations,
    Financial,
    Executive,
}

impl Audience {
    pub const ALL: [Audience; 4] = [
        Audience::Clinical,
        Audience::Operations,
        Audience::Financial,
        Audience::Executive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Clinical => "clinical",
            Audience::Operations => "operations",
            Audience::Financial => "financial",
            Audience::Executive => "executive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "clinical" => Some(Audience::Clinical),
            "operations" => Some(Audience::Operations),
            "financial" => Some(Audience::Financial),
            "executive" => Some(Audience::Executive),
            _ => None,
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Request =================
//

/// Optional overrides for the four tunable constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionOverrides {
    pub physician_hourly_rate: Option<f64>,
    pub reimbursement_per_visit: Option<f64>,
    pub suki_cost_per_physician_per_month: Option<f64>,
    pub work_days_per_year: Option<f64>,
}

impl AssumptionOverrides {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            physician_hourly_rate: obj.get("physicianHourlyRate").and_then(coerce_number),
            reimbursement_per_visit: obj.get("reimbursementPerVisit").and_then(coerce_number),
            suki_cost_per_physician_per_month: obj
                .get("sukiCostPerPhysicianPerMonth")
                .and_then(coerce_number),
            work_days_per_year: obj.get("workDaysPerYear").and_then(coerce_number),
        })
    }
}

/// One ROI request. Numeric fields are `None` when the caller sent
/// something that is not a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestInput {
    pub customer_name: String,
    pub specialty: String,
    pub physician_count: Option<f64>,
    pub time_saved_hrs_per_day: Option<f64>,
    pub patient_increase_per_day: Option<f64>,
    pub adoption_rate_pct: Option<f64>,
    pub nps_score: Option<f64>,
    pub burnout_improvement: Option<String>,
    pub clinical_context: Option<String>,
    pub audiences: BTreeSet<Audience>,
    pub clinical_validation_mode: bool,
    pub assumptions: Option<AssumptionOverrides>,
    pub telemetry_summary: Option<Value>,
    pub epic_mapping: Option<Value>,
}

impl RequestInput {
    /// Validate and extract a request from an untyped JSON body.
    ///
    /// Only the required fields can fail; everything else is coerced.
    pub fn from_value(body: &Value) -> Result<Self> {
        let customer_name = required_text(body, "customerName")?;
        let specialty = required_text(body, "specialty")?;

        let raw_audiences = match body.get("audiences") {
            Some(Value::Array(items)) if !items.is_empty() => items,
            _ => {
                return Err(RoiError::InvalidInput(
                    "audiences must be a non-empty array".to_string(),
                ))
            }
        };

        let audiences: BTreeSet<Audience> = raw_audiences
            .iter()
            .filter_map(Value::as_str)
            .filter_map(Audience::parse)
            .collect();

        if audiences.is_empty() {
            return Err(RoiError::InvalidInput(
                "audiences must contain at least one of clinical, operations, financial, executive"
                    .to_string(),
            ));
        }

        Ok(Self {
            customer_name,
            specialty,
            physician_count: body.get("physicianCount").and_then(coerce_number),
            time_saved_hrs_per_day: body.get("timeSavedHrsPerDay").and_then(coerce_number),
            patient_increase_per_day: body.get("patientIncreasePerDay").and_then(coerce_number),
            adoption_rate_pct: body.get("adoptionRatePct").and_then(coerce_number),
            nps_score: body.get("npsScore").and_then(coerce_number),
            burnout_improvement: optional_text(body, "burnoutImprovement"),
            clinical_context: optional_text(body, "clinicalContext"),
            audiences,
            clinical_validation_mode: coerce_bool(body.get("clinicalValidationMode")),
            assumptions: body.get("assumptions").and_then(AssumptionOverrides::from_value),
            telemetry_summary: present(body, "telemetrySummary"),
            epic_mapping: present(body, "epicMapping"),
        })
    }

    /// Parse a raw JSON document, then validate it.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(raw)?;
        Self::from_value(&body)
    }

    pub fn wants(&self, audience: Audience) -> bool {
        self.audiences.contains(&audience)
    }
}

/// Parse-or-nothing: finite numbers and numeric strings only.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn coerce_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn required_text(body: &Value, field: &str) -> Result<String> {
    optional_text(body, field)
        .ok_or_else(|| RoiError::InvalidInput(format!("{} is required", field)))
}

fn optional_text(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn present(body: &Value, field: &str) -> Option<Value> {
    body.get(field).filter(|v| !v.is_null()).cloned()
}

//
// ================= Financials =================
//

/// Effective (post-clamp) tunable constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionSet {
    pub physician_hourly_rate: f64,
    pub reimbursement_per_visit: f64,
    pub suki_cost_per_physician_per_month: f64,
    pub work_days_per_year: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialProjection {
    pub assumptions: AssumptionSet,
    pub annual_labor_value: f64,
    pub annual_revenue_uplift: f64,
    pub annual_suki_cost: f64,
    pub annual_total_value: f64,
    /// `None` when annual cost is zero.
    pub roi_x: Option<f64>,
}

//
// ================= Narrative Output =================
//

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narratives {
    pub clinical: String,
    pub operations: String,
    pub financial: String,
    pub executive: String,
}

impl Narratives {
    pub fn get(&self, audience: Audience) -> &str {
        match audience {
            Audience::Clinical => &self.clinical,
            Audience::Operations => &self.operations,
            Audience::Financial => &self.financial,
            Audience::Executive => &self.executive,
        }
    }

    fn slot_mut(&mut self, audience: Audience) -> &mut String {
        match audience {
            Audience::Clinical => &mut self.clinical,
            Audience::Operations => &mut self.operations,
            Audience::Financial => &mut self.financial,
            Audience::Executive => &mut self.executive,
        }
    }

    pub fn set(&mut self, audience: Audience, text: String) {
        *self.slot_mut(audience) = text;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeOutput {
    pub narratives: Narratives,
    pub assumptions_and_caveats: Vec<String>,
    pub clinical_validation_checklist: Vec<String>,
    pub next_best_actions: Vec<String>,
}

impl NarrativeOutput {
    /// Blank every narrative whose audience was not requested.
    pub fn retain_audiences(mut self, audiences: &BTreeSet<Audience>) -> Self {
        for audience in Audience::ALL {
            if !audiences.contains(&audience) {
                self.narratives.slot_mut(audience).clear();
            }
        }
        self
    }
}
