//! Plan orchestrator: sequences model calls into meal plan workflows.
//!
//! Full generation is two dependent calls (recipes, then the grocery list
//! built from their ingredients); regeneration is one recipe call followed
//! by a grocery refresh. Calls run strictly in sequence and the first
//! failure ends the workflow. There is no retry and no partial result.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::types::truncate_for_log;
use crate::gateway::{CompletionRequest, GatewayError, ModelGateway};
use crate::plan::{
    GrocerySection, MealPlan, MealType, ParseError, Prompt, Recipe, RecipeSet, ValidationError,
    apply_to_lists, build_grocery_prompt, build_plan_prompt, build_regenerate_prompt,
    contains_recipe, extract_json, flatten_ingredients, normalize_grocery_list,
    parse_grocery_list, parse_recipe, parse_recipe_set, validate_recipe_set,
};

const MAX_PROMPT_LOG_CHARS: usize = 4_000;
const MAX_OUTPUT_LOG_CHARS: usize = 8_000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single step of a workflow failed.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A failed orchestrator operation.
///
/// The variant names the operation; the source says which step failed.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("failed to generate meal plan")]
    Generation(#[source] StepError),

    #[error("failed to regenerate recipe")]
    Regeneration(#[source] StepError),

    #[error("failed to consolidate grocery list")]
    Grocery(#[source] StepError),
}

impl OrchestratorError {
    /// The underlying step failure.
    pub fn step(&self) -> &StepError {
        match self {
            Self::Generation(e) | Self::Regeneration(e) | Self::Grocery(e) => e,
        }
    }

    pub fn is_parse(&self) -> bool {
        matches!(self.step(), StepError::Parse(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.step(), StepError::Validation(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.step(), StepError::Gateway(e) if e.is_timeout())
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Model selection, output budgets and timeout for orchestrated calls.
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub model: String,
    pub plan_max_tokens: u32,
    pub recipe_max_tokens: u32,
    pub grocery_max_tokens: u32,
    /// Upper bound on each individual gateway call.
    pub call_timeout: Duration,
}

impl OrchestratorSettings {
    pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            plan_max_tokens: 4096,
            recipe_max_tokens: 2048,
            grocery_max_tokens: 2048,
            call_timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// The kind of model call, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Plan,
    Recipe,
    Grocery,
}

impl CallKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Recipe => "recipe",
            Self::Grocery => "grocery",
        }
    }
}

/// Result of regenerating one recipe and refreshing the grocery list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerationOutcome {
    /// The new recipe, carrying the original's id.
    pub recipe: Recipe,
    /// Both recipe lists after the replacement.
    pub recipes: RecipeSet,
    /// Grocery list consolidated from `recipes`.
    pub grocery_list: Vec<GrocerySection>,
}

impl RegenerationOutcome {
    /// Assemble the updated plan.
    pub fn into_plan(self) -> MealPlan {
        self.recipes.with_grocery_list(self.grocery_list)
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Runs meal plan workflows against an injected [`ModelGateway`].
///
/// Holds no per-request state, so one instance can serve concurrent
/// requests behind an `Arc`.
#[derive(Clone)]
pub struct PlanOrchestrator {
    gateway: Arc<dyn ModelGateway>,
    settings: OrchestratorSettings,
}

impl std::fmt::Debug for PlanOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanOrchestrator")
            .field("gateway", &self.gateway.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl PlanOrchestrator {
    pub fn new(gateway: Arc<dyn ModelGateway>, settings: OrchestratorSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Generate a fresh plan: recipes first, then the grocery list derived
    /// from their ingredients.
    ///
    /// Any failure, including in the grocery step, fails the whole
    /// operation with [`OrchestratorError::Generation`].
    pub async fn generate_full_plan(
        &self,
        guidance: Option<&str>,
    ) -> Result<MealPlan, OrchestratorError> {
        let recipes = self
            .generate_recipes(guidance)
            .await
            .map_err(OrchestratorError::Generation)?;

        let grocery_list = self
            .consolidate(&recipes.lunches, &recipes.dinners)
            .await
            .map_err(OrchestratorError::Generation)?;

        info!(
            lunches = recipes.lunches.len(),
            dinners = recipes.dinners.len(),
            sections = grocery_list.len(),
            "meal plan generated"
        );
        Ok(recipes.with_grocery_list(grocery_list))
    }

    /// Regenerate one recipe from user feedback.
    ///
    /// The returned recipe always carries `original.id`. A model response
    /// with a different id is corrected, not rejected.
    pub async fn regenerate_recipe(
        &self,
        original: &Recipe,
        feedback: &str,
        meal_type: MealType,
    ) -> Result<Recipe, OrchestratorError> {
        let prompt = build_regenerate_prompt(original, feedback, meal_type);
        let text = self
            .call(CallKind::Recipe, prompt, self.settings.recipe_max_tokens)
            .await
            .map_err(|e| OrchestratorError::Regeneration(e.into()))?;

        let mut recipe = parse_recipe(&extract_json(&text))
            .map_err(|e| OrchestratorError::Regeneration(e.into()))?;

        if recipe.id != original.id {
            warn!(
                expected = %original.id,
                returned = %recipe.id,
                %meal_type,
                "model changed the recipe id; restoring the original"
            );
            recipe.id = original.id.clone();
        }

        info!(recipe_id = %recipe.id, %meal_type, name = %recipe.name, "recipe regenerated");
        Ok(recipe)
    }

    /// Consolidate the ingredients of both lists into a grocery list.
    pub async fn regenerate_grocery_list(
        &self,
        lunches: &[Recipe],
        dinners: &[Recipe],
    ) -> Result<Vec<GrocerySection>, OrchestratorError> {
        self.consolidate(lunches, dinners)
            .await
            .map_err(OrchestratorError::Grocery)
    }

    /// Regenerate a recipe, swap it into the supplied lists, and refresh the
    /// grocery list from the updated lists.
    ///
    /// If no recipe in the `meal_type` list has `original.id`, the lists are
    /// left as they are (logged at `warn`) and the grocery list is rebuilt
    /// from them unchanged.
    pub async fn regenerate_and_merge(
        &self,
        lunches: &[Recipe],
        dinners: &[Recipe],
        original: &Recipe,
        feedback: &str,
        meal_type: MealType,
    ) -> Result<RegenerationOutcome, OrchestratorError> {
        let target = match meal_type {
            MealType::Lunch => lunches,
            MealType::Dinner => dinners,
        };
        if !contains_recipe(target, &original.id) {
            warn!(
                recipe_id = %original.id,
                %meal_type,
                "no recipe with this id in the plan; the new recipe will not be merged"
            );
        }

        let recipe = self.regenerate_recipe(original, feedback, meal_type).await?;
        let recipes = apply_to_lists(lunches, dinners, &recipe, meal_type);
        let grocery_list = self
            .regenerate_grocery_list(&recipes.lunches, &recipes.dinners)
            .await?;

        Ok(RegenerationOutcome {
            recipe,
            recipes,
            grocery_list,
        })
    }

    // -----------------------------------------------------------------------
    // Steps
    // -----------------------------------------------------------------------

    async fn generate_recipes(&self, guidance: Option<&str>) -> Result<RecipeSet, StepError> {
        let prompt = build_plan_prompt(guidance);
        let text = self
            .call(CallKind::Plan, prompt, self.settings.plan_max_tokens)
            .await?;
        let recipes = parse_recipe_set(&extract_json(&text))?;
        validate_recipe_set(&recipes)?;
        Ok(recipes)
    }

    async fn consolidate(
        &self,
        lunches: &[Recipe],
        dinners: &[Recipe],
    ) -> Result<Vec<GrocerySection>, StepError> {
        let ingredients = flatten_ingredients(lunches, dinners);
        let prompt = build_grocery_prompt(&ingredients);
        let text = self
            .call(CallKind::Grocery, prompt, self.settings.grocery_max_tokens)
            .await?;
        let sections = parse_grocery_list(&extract_json(&text))?;
        Ok(normalize_grocery_list(sections)?)
    }

    /// One bounded gateway call. Blank output counts as a gateway failure.
    async fn call(
        &self,
        kind: CallKind,
        prompt: Prompt,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            max_tokens,
            system: prompt.system,
            user: prompt.user,
        };

        info!(
            call = kind.as_str(),
            gateway = self.gateway.name(),
            model = %request.model,
            max_tokens,
            "calling model gateway"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                call = kind.as_str(),
                system_prompt = %truncate_for_log(&request.system, MAX_PROMPT_LOG_CHARS),
                user_prompt = %truncate_for_log(&request.user, MAX_PROMPT_LOG_CHARS),
                "model prompts"
            );
        }

        let started = Instant::now();
        let timeout = self.settings.call_timeout;
        let text = tokio::time::timeout(timeout, self.gateway.complete(&request))
            .await
            .map_err(|_| GatewayError::Timeout(timeout))??;

        if text.trim().is_empty() {
            return Err(GatewayError::EmptyContent);
        }

        info!(
            call = kind.as_str(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "model gateway responded"
        );
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!(
                call = kind.as_str(),
                output = %truncate_for_log(&text, MAX_OUTPUT_LOG_CHARS),
                "model raw output"
            );
        }
        Ok(text)
    }
}
