//! Plain-text rendering of a meal plan, for printing or pasting into notes.

use super::types::{GrocerySection, MealPlan, MealType, Recipe};

/// Render `plan` as plain text.
///
/// `generated_on` is printed verbatim on the header's second line; the
/// caller picks the date format.
pub fn format_plan_text(plan: &MealPlan, generated_on: &str) -> String {
    let mut out = String::new();
    out.push_str("MEAL PLAN (3 Days)\n");
    out.push_str(&format!("Generated {generated_on}\n\n"));
    out.push_str(&format_meal_blocks(MealType::Lunch, &plan.lunches));
    out.push_str("\n\n");
    out.push_str(&format_meal_blocks(MealType::Dinner, &plan.dinners));
    out.push_str("\n\n=== GROCERY LIST ===\n\n");
    out.push_str(&format_grocery_list(&plan.grocery_list));
    out
}

/// Headings are numbered only when the list holds more than one recipe.
fn format_meal_blocks(meal_type: MealType, recipes: &[Recipe]) -> String {
    let label = meal_type.to_string().to_uppercase();
    recipes
        .iter()
        .enumerate()
        .map(|(i, recipe)| {
            let heading = if recipes.len() > 1 {
                format!("=== {label} {} ===", i + 1)
            } else {
                format!("=== {label} ===")
            };
            format!("{heading}\n{}", format_recipe(recipe))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn format_recipe(recipe: &Recipe) -> String {
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n");
    let steps = recipe
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {step}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{}\n\n{}\n\nTime: {}\nServings: {}\n\nINGREDIENTS:\n{ingredients}\n\nSTEPS:\n{steps}",
        recipe.name, recipe.description, recipe.cook_time, recipe.servings,
    )
}

fn format_grocery_list(sections: &[GrocerySection]) -> String {
    sections
        .iter()
        .map(|section| {
            let items = section
                .items
                .iter()
                .map(|item| format!("  • {item}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{}:\n{items}", section.category.to_uppercase())
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
