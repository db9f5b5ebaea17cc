//! Built-in sample plan, shown before the first generation and used by the
//! `sample` command.

use super::types::MealPlan;

/// The embedded sample plan JSON.
static SAMPLE_PLAN_JSON: &str = include_str!("sample_plan.json");

/// Decode the built-in sample plan.
pub fn sample_plan() -> Result<MealPlan, serde_json::Error> {
    serde_json::from_str(SAMPLE_PLAN_JSON)
}
