//! Plan state merging: swap a regenerated recipe into an existing plan.
//!
//! Replacement is keyed by recipe id within the list selected by the meal
//! type. List order and length never change. When no recipe matches, the
//! list comes back unchanged; nothing is inserted. The grocery list is
//! passed through untouched and must be refreshed by the caller.

use super::types::{MealPlan, MealType, Recipe, RecipeSet};

/// Return a copy of `recipes` with the first recipe whose id equals
/// `replacement.id` swapped for `replacement`.
pub fn replace_recipe(recipes: &[Recipe], replacement: &Recipe) -> Vec<Recipe> {
    let mut updated = recipes.to_vec();
    if let Some(slot) = updated.iter_mut().find(|r| r.id == replacement.id) {
        *slot = replacement.clone();
    }
    updated
}

/// Whether any recipe in `recipes` has the given id.
pub fn contains_recipe(recipes: &[Recipe], id: &str) -> bool {
    recipes.iter().any(|r| r.id == id)
}

/// Apply a regenerated recipe to a pair of recipe lists.
///
/// Only the list selected by `meal_type` is searched; the other is cloned
/// as is.
pub fn apply_to_lists(
    lunches: &[Recipe],
    dinners: &[Recipe],
    recipe: &Recipe,
    meal_type: MealType,
) -> RecipeSet {
    match meal_type {
        MealType::Lunch => RecipeSet {
            lunches: replace_recipe(lunches, recipe),
            dinners: dinners.to_vec(),
        },
        MealType::Dinner => RecipeSet {
            lunches: lunches.to_vec(),
            dinners: replace_recipe(dinners, recipe),
        },
    }
}

/// Apply a regenerated recipe to a plan.
///
/// The returned plan keeps the input's grocery list; callers replace it
/// with the result of a fresh consolidation over the updated recipes.
pub fn apply_regeneration(plan: &MealPlan, recipe: &Recipe, meal_type: MealType) -> MealPlan {
    apply_to_lists(&plan.lunches, &plan.dinners, recipe, meal_type)
        .with_grocery_list(plan.grocery_list.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::types::GrocerySection;

    fn recipe(id: &str, name: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            cook_time: "20 minutes".to_string(),
            servings: "2 servings".to_string(),
            ingredients: vec![format!("{name} base")],
            steps: vec![],
        }
    }

    fn plan() -> MealPlan {
        MealPlan {
            lunches: vec![recipe("lunch-1", "A"), recipe("lunch-2", "B")],
            dinners: vec![recipe("dinner-1", "C"), recipe("dinner-2", "D")],
            grocery_list: vec![GrocerySection {
                category: "Produce".to_string(),
                items: vec!["onion".to_string()],
            }],
        }
    }

    #[test]
    fn replaces_lunch_and_leaves_dinners() {
        let original = plan();
        let updated = apply_regeneration(&original, &recipe("lunch-1", "A2"), MealType::Lunch);

        let names: Vec<&str> = updated.lunches.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "B"]);
        assert_eq!(updated.dinners, original.dinners);
    }

    #[test]
    fn replaces_dinner_in_place() {
        let updated = apply_regeneration(&plan(), &recipe("dinner-2", "D2"), MealType::Dinner);
        let names: Vec<&str> = updated.dinners.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["C", "D2"]);
        assert_eq!(updated.lunches, plan().lunches);
    }

    #[test]
    fn unknown_id_is_a_silent_no_op() {
        let original = plan();
        let updated = apply_regeneration(&original, &recipe("lunch-9", "Z"), MealType::Lunch);
        assert_eq!(updated, original);
    }

    #[test]
    fn only_the_selected_list_is_searched() {
        // A lunch id supplied with meal type dinner matches nothing.
        let original = plan();
        let updated = apply_regeneration(&original, &recipe("lunch-1", "X"), MealType::Dinner);
        assert_eq!(updated, original);
    }

    #[test]
    fn grocery_list_is_passed_through() {
        let original = plan();
        let updated = apply_regeneration(&original, &recipe("lunch-2", "B2"), MealType::Lunch);
        assert_eq!(updated.grocery_list, original.grocery_list);
    }

    #[test]
    fn only_first_duplicate_is_replaced() {
        let list = vec![recipe("x", "first"), recipe("x", "second")];
        let updated = replace_recipe(&list, &recipe("x", "new"));
        assert_eq!(updated[0].name, "new");
        assert_eq!(updated[1].name, "second");
    }

    #[test]
    fn contains_recipe_checks_ids() {
        let original = plan();
        assert!(contains_recipe(&original.lunches, "lunch-2"));
        assert!(!contains_recipe(&original.lunches, "dinner-1"));
    }
}
