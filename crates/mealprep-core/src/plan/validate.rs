//! Semantic checks on parsed model output.
//!
//! Parsing guarantees shape; these checks catch output that is well formed
//! but unusable, such as a plan with no dinners or two recipes sharing an id.

use std::collections::HashSet;

use thiserror::Error;

use super::types::{GrocerySection, MealType, Recipe, RecipeSet};

/// Most recipes allowed per meal type.
pub const MAX_RECIPES_PER_MEAL: usize = 3;

/// Structurally valid output that violates a plan invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("plan contains no {0} recipes")]
    NoRecipes(MealType),

    #[error("plan contains {count} {meal_type} recipes (at most {max} allowed)", max = MAX_RECIPES_PER_MEAL)]
    TooManyRecipes { meal_type: MealType, count: usize },

    #[error("{meal_type} recipe at position {index} has an empty id")]
    EmptyId { meal_type: MealType, index: usize },

    #[error("duplicate recipe id {id:?} in {meal_type} list")]
    DuplicateId { meal_type: MealType, id: String },

    #[error("grocery section at position {0} has an empty category")]
    EmptyCategory(usize),
}

/// Check recipe counts and identifier uniqueness for a freshly generated plan.
pub fn validate_recipe_set(set: &RecipeSet) -> Result<(), ValidationError> {
    validate_recipes(MealType::Lunch, &set.lunches)?;
    validate_recipes(MealType::Dinner, &set.dinners)?;
    Ok(())
}

fn validate_recipes(meal_type: MealType, recipes: &[Recipe]) -> Result<(), ValidationError> {
    if recipes.is_empty() {
        return Err(ValidationError::NoRecipes(meal_type));
    }
    if recipes.len() > MAX_RECIPES_PER_MEAL {
        return Err(ValidationError::TooManyRecipes {
            meal_type,
            count: recipes.len(),
        });
    }

    let mut seen = HashSet::new();
    for (index, recipe) in recipes.iter().enumerate() {
        if recipe.id.trim().is_empty() {
            return Err(ValidationError::EmptyId { meal_type, index });
        }
        if !seen.insert(recipe.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                meal_type,
                id: recipe.id.clone(),
            });
        }
    }
    Ok(())
}

/// Drop sections without items and reject sections without a category.
pub fn normalize_grocery_list(
    sections: Vec<GrocerySection>,
) -> Result<Vec<GrocerySection>, ValidationError> {
    if let Some(index) = sections.iter().position(|s| s.category.trim().is_empty()) {
        return Err(ValidationError::EmptyCategory(index));
    }
    Ok(sections.into_iter().filter(|s| !s.items.is_empty()).collect())
}
