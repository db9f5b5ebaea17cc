//! Domain types for meal plans.
//!
//! These map directly onto the JSON the presentation layer exchanges with
//! the server, so field names follow its camelCase wire format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A single batch-cooking recipe.
///
/// The `id` is assigned by the generator (`lunch-1`, `dinner-2`, ...) and is
/// never changed afterwards; regeneration replaces the whole recipe but keeps
/// the identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Free text, e.g. "45 minutes".
    pub cook_time: String,
    /// Free text, e.g. "6 servings (3 days for 2 people)".
    pub servings: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

/// One store section of the consolidated grocery list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GrocerySection {
    pub category: String,
    pub items: Vec<String>,
}

/// Recipes produced by the first full-plan call, before the grocery list
/// has been consolidated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeSet {
    pub lunches: Vec<Recipe>,
    pub dinners: Vec<Recipe>,
}

impl RecipeSet {
    /// Every ingredient line across both lists: lunches first, then dinners,
    /// each in list order.
    pub fn all_ingredients(&self) -> Vec<&str> {
        flatten_ingredients(&self.lunches, &self.dinners)
    }

    /// Attach a grocery list, producing the finished plan.
    pub fn with_grocery_list(self, grocery_list: Vec<GrocerySection>) -> MealPlan {
        MealPlan {
            lunches: self.lunches,
            dinners: self.dinners,
            grocery_list,
        }
    }
}

/// A complete meal plan: lunches, dinners, and the grocery list derived from
/// all of their ingredients.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub lunches: Vec<Recipe>,
    pub dinners: Vec<Recipe>,
    pub grocery_list: Vec<GrocerySection>,
}

impl MealPlan {
    /// The recipe list for the given meal type.
    pub fn recipes(&self, meal_type: MealType) -> &[Recipe] {
        match meal_type {
            MealType::Lunch => &self.lunches,
            MealType::Dinner => &self.dinners,
        }
    }

    /// Find a recipe by identifier in either list.
    ///
    /// Returns the recipe together with the meal type of the list it was
    /// found in. Lunches are searched first.
    pub fn find_recipe(&self, id: &str) -> Option<(MealType, &Recipe)> {
        MealType::ALL.into_iter().find_map(|meal_type| {
            self.recipes(meal_type)
                .iter()
                .find(|r| r.id == id)
                .map(|r| (meal_type, r))
        })
    }

    /// The recipe lists without the grocery list.
    pub fn recipe_set(&self) -> RecipeSet {
        RecipeSet {
            lunches: self.lunches.clone(),
            dinners: self.dinners.clone(),
        }
    }
}

/// Flatten ingredient lines: every lunch ingredient in order, then every
/// dinner ingredient in order.
pub fn flatten_ingredients<'a>(lunches: &'a [Recipe], dinners: &'a [Recipe]) -> Vec<&'a str> {
    lunches
        .iter()
        .chain(dinners.iter())
        .flat_map(|r| r.ingredients.iter().map(String::as_str))
        .collect()
}

/// Which list of the plan a recipe belongs to.
///
/// Serialized as `"lunch"` / `"dinner"`; the capitalized forms are accepted
/// on input, matching [`FromStr`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[serde(alias = "Lunch", alias = "LUNCH")]
    Lunch,
    #[serde(alias = "Dinner", alias = "DINNER")]
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 2] = [MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            other => Err(format!("invalid meal type {other:?} (expected lunch or dinner)")),
        }
    }
}
