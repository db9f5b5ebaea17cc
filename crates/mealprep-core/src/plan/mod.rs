//! Meal plan domain: types, prompts, response extraction, parsing,
//! validation, merging, and plain-text export.

pub mod extract;
pub mod merge;
pub mod parser;
pub mod prompt;
pub mod sample;
pub mod text;
pub mod types;
pub mod validate;

pub use extract::{extract_json, fence_json};
pub use merge::{apply_regeneration, apply_to_lists, contains_recipe, replace_recipe};
pub use parser::{ParseError, parse_grocery_list, parse_recipe, parse_recipe_set};
pub use prompt::{Prompt, build_grocery_prompt, build_plan_prompt, build_regenerate_prompt};
pub use sample::sample_plan;
pub use text::format_plan_text;
pub use types::{GrocerySection, MealPlan, MealType, Recipe, RecipeSet, flatten_ingredients};
pub use validate::{ValidationError, normalize_grocery_list, validate_recipe_set};
