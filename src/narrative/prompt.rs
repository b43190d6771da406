//! Prompt assembly
//!
//! Two blocks: a fixed role + rules block and a per-request data block.
//! Absent optional fields are always rendered with an explicit marker.

use crate::calculator::effective_inputs;
use crate::models::{FinancialProjection, RequestInput};
use serde_json::Value;

const NOT_PROVIDED: &str = "Not provided";
const NONE: &str = "None";

/// Build the role + rules block.
pub fn system_prompt(clinical_validation_mode: bool) -> String {
    let validation_rule = if clinical_validation_mode {
        "- Clinical validation mode is ON: be conservative. Phrase every benefit as a hypothesis to be validated, \
prefer ranges and pilot framing, and make the validation checklist specific and measurable."
    } else {
        "- Clinical validation mode is OFF: stay factual and measured; still never overstate the evidence."
    };

    format!(
        r#"You are a healthcare value analyst writing ROI narratives for an ambient AI clinical documentation assistant.

Guidelines:
- Write in a professional, plain-spoken tone suited to a health system buyer
- Tailor each narrative to its audience: clinical (physician experience, documentation burden), operations (throughput, workflow), financial (labor value, revenue, cost, ROI), executive (strategic summary)
- Use ONLY the figures supplied in the data block; never invent numbers
- Label every financial figure as illustrative unless telemetry evidence is supplied
- Do NOT claim improved medical outcomes, diagnoses, patient safety or mortality effects
{}

Output rules:
- Return ONLY a single JSON object that matches the supplied schema
- No markdown, no code fences, no explanation text
- "narratives": exactly the keys clinical, operations, financial, executive (strings)
- "assumptions_and_caveats": 5-10 short strings
- "clinical_validation_checklist": 5-10 short strings
- "next_best_actions": exactly 3 short strings"#,
        validation_rule
    )
}

/// Build the data block for one request.
pub fn data_prompt(input: &RequestInput, financials: &FinancialProjection) -> String {
    let effective = effective_inputs(input);
    let assumptions = &financials.assumptions;

    let audiences = input
        .audiences
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"CUSTOMER:
{}

SPECIALTY:
{}

INPUTS:
- Physicians: {}
- Time saved per physician per day (hours): {}
- Additional patients per physician per day: {}
- Adoption rate (%): {}
- NPS score: {}
- Burnout improvement: {}
- Clinical context: {}
- Requested audiences: {}
- Clinical validation mode: {}

ASSUMPTIONS:
- Physician hourly rate: {}
- Reimbursement per visit: {}
- Cost per physician per month: {}
- Work days per year: {}

ILLUSTRATIVE FINANCIALS:
- Annual labor value: {}
- Annual revenue uplift: {}
- Annual cost: {}
- Annual total value: {}
- ROI: {}

TELEMETRY SUMMARY:
{}

EPIC FIELD MAPPING:
{}
"#,
        input.customer_name,
        input.specialty,
        format_number(effective.physician_count),
        format_number(effective.time_saved_hrs_per_day),
        format_number(effective.patient_increase_per_day),
        optional_number(input.adoption_rate_pct),
        optional_number(input.nps_score),
        input.burnout_improvement.as_deref().unwrap_or(NOT_PROVIDED),
        input.clinical_context.as_deref().unwrap_or(NOT_PROVIDED),
        audiences,
        if input.clinical_validation_mode { "ON" } else { "OFF" },
        format_usd(assumptions.physician_hourly_rate),
        format_usd(assumptions.reimbursement_per_visit),
        format_usd(assumptions.suki_cost_per_physician_per_month),
        format_number(assumptions.work_days_per_year),
        format_usd(financials.annual_labor_value),
        format_usd(financials.annual_revenue_uplift),
        format_usd(financials.annual_suki_cost),
        format_usd(financials.annual_total_value),
        format_roi(financials.roi_x),
        optional_json(input.telemetry_summary.as_ref()),
        optional_json(input.epic_mapping.as_ref()),
    )
}

/// Whole-dollar amount with thousands separators, e.g. `$1,375,000`.
pub fn format_usd(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(rounded.abs() as u64))
}

pub fn format_roi(roi_x: Option<f64>) -> String {
    match roi_x {
        Some(roi) => format!("{:.1}x", roi),
        None => "N/A".to_string(),
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let chunk = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(chunk.to_string());
            break;
        }
        groups.push(format!("{:03}", chunk));
    }
    groups.reverse();
    groups.join(",")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn optional_number(value: Option<f64>) -> String {
    value.map(format_number).unwrap_or_else(|| NOT_PROVIDED.to_string())
}

fn optional_json(value: Option<&Value>) -> String {
    value
        .and_then(|v| serde_json::to_string_pretty(v).ok())
        .unwrap_or_else(|| NONE.to_string())
}
