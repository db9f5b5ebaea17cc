//! CLI handlers for plan generation outside the HTTP server.
//!
//! Implements:
//! - `mealprep generate [--guidance] [--output] [--format]`  -- generate a fresh plan
//! - `mealprep regenerate --plan --recipe-id --feedback [--output] [--format]`
//!                                                  -- rework one recipe of a saved plan
//! - `mealprep sample [--format]`                 -- print the built-in sample plan
//!
//! Plans are emitted as JSON by default; `--format text` renders the
//! plain-text export instead. Only JSON output can be fed back to
//! `regenerate --plan`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local};
use clap::ValueEnum;
use tracing::info;

use mealprep_core::orchestrator::PlanOrchestrator;
use mealprep_core::plan::{MealPlan, format_plan_text, sample_plan};

/// How a plan is written to stdout or a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "txt",
        }
    }
}

// -----------------------------------------------------------------------
// mealprep generate
// -----------------------------------------------------------------------

pub async fn run_generate(
    orchestrator: &PlanOrchestrator,
    guidance: Option<&str>,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let plan = orchestrator.generate_full_plan(guidance).await?;
    emit_plan(&plan, output, format)
}

// -----------------------------------------------------------------------
// mealprep regenerate
// -----------------------------------------------------------------------

/// Regenerate the recipe `recipe_id` of the plan stored at `plan_path`,
/// refresh its grocery list, and emit the updated plan.
pub async fn run_regenerate(
    orchestrator: &PlanOrchestrator,
    plan_path: &Path,
    recipe_id: &str,
    feedback: &str,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    if feedback.trim().is_empty() {
        bail!("feedback must not be empty");
    }

    let plan = read_plan(plan_path)?;
    let Some((meal_type, original)) = plan.find_recipe(recipe_id) else {
        bail!(
            "no recipe with id {recipe_id} in {}; available: {}",
            plan_path.display(),
            recipe_ids(&plan).join(", ")
        );
    };

    info!(%recipe_id, %meal_type, "regenerating recipe");
    let outcome = orchestrator
        .regenerate_and_merge(&plan.lunches, &plan.dinners, original, feedback, meal_type)
        .await?;

    eprintln!("Replaced {recipe_id} with \"{}\".", outcome.recipe.name);
    emit_plan(&outcome.into_plan(), output, format)
}

// -----------------------------------------------------------------------
// mealprep sample
// -----------------------------------------------------------------------

pub fn run_sample(format: OutputFormat) -> Result<()> {
    let plan = sample_plan().context("built-in sample plan is malformed")?;
    emit_plan(&plan, None, format)
}

// -----------------------------------------------------------------------
// File helpers
// -----------------------------------------------------------------------

pub fn read_plan(path: &Path) -> Result<MealPlan> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan file: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse plan file: {}", path.display()))
}

/// Print the plan in `format`, or write it to `output`.
///
/// When `output` is an existing directory the plan is written there under a
/// timestamped name.
fn emit_plan(plan: &MealPlan, output: Option<&Path>, format: OutputFormat) -> Result<()> {
    let now = Local::now();
    let rendered = render_plan(plan, format, now)?;

    let Some(output) = output else {
        println!("{rendered}");
        return Ok(());
    };

    let path = resolve_output_path(output, now, format);
    std::fs::write(&path, format!("{rendered}\n"))
        .with_context(|| format!("failed to write plan file: {}", path.display()))?;
    eprintln!(
        "Plan written to {} ({} lunches, {} dinners, {} grocery sections)",
        path.display(),
        plan.lunches.len(),
        plan.dinners.len(),
        plan.grocery_list.len()
    );
    Ok(())
}

fn render_plan(plan: &MealPlan, format: OutputFormat, now: DateTime<Local>) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(plan).context("failed to serialize plan")
        }
        OutputFormat::Text => Ok(format_plan_text(plan, &now.format("%Y-%m-%d").to_string())),
    }
}

fn resolve_output_path(output: &Path, now: DateTime<Local>, format: OutputFormat) -> PathBuf {
    if output.is_dir() {
        output.join(default_file_name(now, format))
    } else {
        output.to_path_buf()
    }
}

fn default_file_name(now: DateTime<Local>, format: OutputFormat) -> String {
    format!(
        "mealplan-{}.{}",
        now.format("%Y%m%d-%H%M%S"),
        format.extension()
    )
}

fn recipe_ids(plan: &MealPlan) -> Vec<&str> {
    plan.lunches
        .iter()
        .chain(&plan.dinners)
        .map(|r| r.id.as_str())
        .collect()
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
