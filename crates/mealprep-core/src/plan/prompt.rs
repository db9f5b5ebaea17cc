//! Prompt construction for the three model calls.
//!
//! Every builder is a pure function returning a [`Prompt`]: the system
//! instruction plus the user content. The "JSON only, no prose" instruction
//! in each system prompt is best effort; the parser tolerates violations.

use super::types::{MealType, Recipe};

/// A system instruction and user content pair for one model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Grocery store sections the consolidation prompt groups items into.
pub const GROCERY_CATEGORIES: [&str; 6] = [
    "Produce",
    "Meat & Seafood",
    "Dairy",
    "Pantry",
    "Frozen",
    "Other",
];

/// User content for a full-plan call when no guidance is supplied.
pub const DEFAULT_PLAN_REQUEST: &str =
    "Generate a fresh meal plan for the next 3 days. Be creative and inspiring!";

const RECIPE_SHAPE: &str = r#"{
  "id": "lunch-1",
  "name": "Recipe Name",
  "description": "2-3 sentence description including why it batch cooks well",
  "cookTime": "X minutes",
  "servings": "X servings (X days for 2 people)",
  "ingredients": ["ingredient with quantity", ...],
  "steps": ["Step 1 instruction", "Step 2 instruction", ...]
}"#;

const PLAN_CONSTRAINTS: &str = r#"KEY CONSTRAINTS:
- All meals should be healthy and use whole, unprocessed ingredients
- Recipes should be batch-cooking friendly (cook once, eat multiple times)
- Total cook time for all recipes combined should be 1-4 hours
- Lunches should be lighter (lower carb when possible)
- Dinners can be heartier
- No dietary restrictions to worry about

YOUR TASK:
Generate meal plans that cover 3 days of eating. You decide the optimal number of recipes based on complexity:
- For lunches: 1-3 recipes depending on variety and prep simplicity
- For dinners: 2-3 recipes depending on complexity

For example:
- A simple grain bowl that works for 3 days = 1 lunch recipe
- Two different salads that keep well = 2 lunch recipes
- One complex braise + one quick stir-fry = 2 dinner recipes

Prioritize:
1. Flavor and inspiration (these should be meals they're excited to eat)
2. Practical batch cooking (ingredients that keep well, reheat nicely)
3. Variety across the plan (different cuisines, proteins, flavor profiles)
"#;

/// Build the full-plan generation prompt.
///
/// Non-blank `guidance` is appended to the user content as an extra
/// paragraph; blank guidance is ignored.
pub fn build_plan_prompt(guidance: Option<&str>) -> Prompt {
    let mut system = String::with_capacity(3072);
    system.push_str(
        "You are a helpful meal planning assistant. You create healthy, whole-food \
         batch cooking meal plans for a couple in their early 30s living in Brooklyn.\n\n",
    );
    system.push_str(PLAN_CONSTRAINTS);
    system.push('\n');

    system.push_str("OUTPUT FORMAT:\n");
    system.push_str("Always respond with valid JSON matching this exact structure:\n");
    system.push_str("{\n  \"lunches\": [\n");
    system.push_str(&indent(RECIPE_SHAPE, 4));
    system.push_str("\n  ],\n  \"dinners\": [\n");
    system.push_str(&indent(&RECIPE_SHAPE.replace("lunch-1", "dinner-1"), 4));
    system.push_str("\n  ]\n}\n\n");

    system.push_str("Important:\n");
    system.push_str(
        "- IDs should be \"lunch-1\", \"lunch-2\", etc. and \"dinner-1\", \"dinner-2\", etc.\n",
    );
    system.push_str("- Ingredients should include specific quantities\n");
    system.push_str("- Steps should be clear and actionable\n");
    system.push_str("- Only output the JSON, no other text");

    let mut user = DEFAULT_PLAN_REQUEST.to_string();
    if let Some(text) = guidance.map(str::trim).filter(|g| !g.is_empty()) {
        user.push_str("\n\nAdditional guidance from the user:\n");
        user.push_str(text);
    }

    Prompt { system, user }
}

/// Build the single-recipe regeneration prompt.
///
/// The user content carries the original recipe as pretty-printed JSON, the
/// meal type, and the user's feedback.
pub fn build_regenerate_prompt(original: &Recipe, feedback: &str, meal_type: MealType) -> Prompt {
    let mut system = String::with_capacity(1024);
    system.push_str(
        "You are a helpful meal planning assistant. A user wants to regenerate ONE \
         recipe from their meal plan based on their feedback.\n\n",
    );
    system.push_str(
        "Keep the same general format and style as the original recipe, but \
         incorporate their feedback to create something different.\n\n",
    );
    system.push_str("OUTPUT FORMAT:\nRespond with valid JSON for a single recipe:\n");
    system.push_str(&RECIPE_SHAPE.replace("\"lunch-1\"", "\"KEEP_SAME_ID\""));
    system.push_str("\n\nThe \"id\" field must be exactly the id of the original recipe.\n");
    system.push_str("Only output the JSON, no other text.");

    // Recipe only holds strings, so serialization cannot fail.
    let original_json = serde_json::to_string_pretty(original).unwrap_or_default();
    let user = format!(
        "Here's the original {meal_type} recipe:\n{original_json}\n\n\
         User feedback: \"{feedback}\"\n\n\
         Generate a new recipe that addresses their feedback. Keep the same ID ({id}).",
        id = original.id,
    );

    Prompt { system, user }
}

/// Build the grocery consolidation prompt for the given ingredient lines.
///
/// The user content lists the ingredients one per line, in the order given.
pub fn build_grocery_prompt(ingredients: &[&str]) -> Prompt {
    let mut system = String::with_capacity(1024);
    system.push_str("You consolidate recipe ingredients into an organized grocery list.\n\n");
    system.push_str("Given a list of all ingredients from multiple recipes, you should:\n");
    system.push_str(
        "1. Combine duplicate ingredients, adding quantities when the units match \
         (e.g., \"2 cloves garlic\" + \"4 cloves garlic\" = \"6 cloves garlic\")\n",
    );
    system.push_str("2. Organize by grocery store section\n");
    system.push_str("3. Use consistent formatting\n\n");

    system.push_str("OUTPUT FORMAT:\n{\n  \"groceryList\": [\n");
    let sections: Vec<String> = GROCERY_CATEGORIES
        .iter()
        .map(|c| format!("    {{ \"category\": \"{c}\", \"items\": [\"item with quantity\", ...] }}"))
        .collect();
    system.push_str(&sections.join(",\n"));
    system.push_str("\n  ]\n}\n\n");
    system.push_str(&format!(
        "Use only these categories: {}.\n",
        GROCERY_CATEGORIES.join(", ")
    ));
    system.push_str("Only include categories that have items. Only output JSON, no other text.");

    let user = format!(
        "Consolidate these ingredients into an organized grocery list:\n\n{}",
        ingredients.join("\n")
    );

    Prompt { system, user }
}

fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_recipe() -> Recipe {
        Recipe {
            id: "lunch-2".to_string(),
            name: "Farro Salad".to_string(),
            description: "Nutty and bright.".to_string(),
            cook_time: "35 minutes".to_string(),
            servings: "4 servings".to_string(),
            ingredients: vec!["1 cup farro".to_string()],
            steps: vec!["Cook farro.".to_string()],
        }
    }

    // -- build_plan_prompt --

    #[test]
    fn plan_prompt_encodes_constraints() {
        let prompt = build_plan_prompt(None);
        assert!(prompt.system.contains("batch-cooking friendly"));
        assert!(prompt.system.contains("1-4 hours"));
        assert!(prompt.system.contains("Lunches should be lighter"));
        assert!(prompt.system.contains("Dinners can be heartier"));
        assert!(prompt.system.contains("For lunches: 1-3 recipes"));
        assert!(prompt.system.contains("For dinners: 2-3 recipes"));
    }

    #[test]
    fn plan_prompt_describes_output_shape() {
        let prompt = build_plan_prompt(None);
        assert!(prompt.system.contains("\"lunches\": ["));
        assert!(prompt.system.contains("\"dinners\": ["));
        assert!(prompt.system.contains("\"id\": \"dinner-1\""));
        assert!(prompt.system.contains("\"cookTime\""));
        assert!(prompt.system.contains("Only output the JSON"));
    }

    #[test]
    fn plan_prompt_without_guidance_uses_default_request() {
        assert_eq!(build_plan_prompt(None).user, DEFAULT_PLAN_REQUEST);
        assert_eq!(build_plan_prompt(Some("   ")).user, DEFAULT_PLAN_REQUEST);
    }

    #[test]
    fn plan_prompt_appends_guidance() {
        let prompt = build_plan_prompt(Some("  more fish, no cilantro "));
        assert!(prompt.user.starts_with(DEFAULT_PLAN_REQUEST));
        assert!(prompt.user.ends_with("more fish, no cilantro"));
    }

    // -- build_regenerate_prompt --

    #[test]
    fn regenerate_prompt_requires_same_id() {
        let prompt = build_regenerate_prompt(&sample_recipe(), "too bland", MealType::Lunch);
        assert!(prompt.system.contains("KEEP_SAME_ID"));
        assert!(prompt.user.contains("Keep the same ID (lunch-2)"));
    }

    #[test]
    fn regenerate_prompt_includes_recipe_meal_type_and_feedback() {
        let prompt = build_regenerate_prompt(&sample_recipe(), "too bland", MealType::Lunch);
        assert!(prompt.user.contains("original lunch recipe"));
        assert!(prompt.user.contains("\"name\": \"Farro Salad\""));
        assert!(prompt.user.contains("\"cookTime\": \"35 minutes\""));
        assert!(prompt.user.contains("User feedback: \"too bland\""));
    }

    #[test]
    fn regenerate_prompt_keeps_feedback_verbatim() {
        let feedback = "  less salt,\n  more lemon  ";
        let prompt = build_regenerate_prompt(&sample_recipe(), feedback, MealType::Lunch);
        assert!(prompt.user.contains("User feedback: \"  less salt,\n  more lemon  \""));
    }

    // -- build_grocery_prompt --

    #[test]
    fn grocery_prompt_lists_categories_and_merging_rule() {
        let prompt = build_grocery_prompt(&["2 cloves garlic"]);
        for category in GROCERY_CATEGORIES {
            assert!(prompt.system.contains(category), "missing {category}");
        }
        assert!(prompt.system.contains("6 cloves garlic"));
        assert!(prompt.system.contains("Only include categories that have items"));
    }

    #[test]
    fn grocery_prompt_joins_ingredients_with_newlines() {
        let prompt = build_grocery_prompt(&["2 cloves garlic", "1 lb shrimp", "4 cloves garlic"]);
        assert!(
            prompt
                .user
                .ends_with("\n\n2 cloves garlic\n1 lb shrimp\n4 cloves garlic")
        );
    }
}
