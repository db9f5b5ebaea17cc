//! End-to-end orchestrator workflows against a scripted gateway.

use std::time::Duration;

use mealprep_core::gateway::GatewayError;
use mealprep_core::orchestrator::{
    OrchestratorError, OrchestratorSettings, PlanOrchestrator, StepError,
};
use mealprep_core::plan::prompt::DEFAULT_PLAN_REQUEST;
use mealprep_core::plan::{MealType, Recipe};
use mealprep_test_utils::{
    StubGateway, fenced, grocery_json, grocery_sections, recipe, recipe_json, recipe_set_json,
    renamed_recipe,
};

fn orchestrator(stub: &std::sync::Arc<StubGateway>) -> PlanOrchestrator {
    PlanOrchestrator::new(stub.clone(), OrchestratorSettings::default())
}

// ---------------------------------------------------------------------------
// generate_full_plan
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_generation_returns_stubbed_data() {
    let lunches = vec![recipe("lunch-1")];
    let dinners = vec![recipe("dinner-1"), recipe("dinner-2")];
    let stub = StubGateway::with_responses([
        fenced(&recipe_set_json(&lunches, &dinners)),
        grocery_json(&grocery_sections()),
    ])
    .shared();

    let plan = orchestrator(&stub).generate_full_plan(None).await.unwrap();

    assert_eq!(plan.lunches, lunches);
    assert_eq!(plan.dinners, dinners);
    assert_eq!(plan.grocery_list, grocery_sections());
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn grocery_call_receives_lunch_then_dinner_ingredients() {
    let lunches = vec![recipe("lunch-1")];
    let dinners = vec![recipe("dinner-1")];
    let stub = StubGateway::with_responses([
        recipe_set_json(&lunches, &dinners),
        grocery_json(&grocery_sections()),
    ])
    .shared();

    orchestrator(&stub).generate_full_plan(None).await.unwrap();

    let requests = stub.requests();
    let expected = "lunch-1 ingredient 1\nlunch-1 ingredient 2\n\
                    dinner-1 ingredient 1\ndinner-1 ingredient 2";
    assert!(
        requests[1].user.ends_with(expected),
        "grocery prompt was: {}",
        requests[1].user
    );
}

#[tokio::test]
async fn guidance_reaches_the_plan_prompt() {
    let stub = StubGateway::with_responses([
        recipe_set_json(&[recipe("lunch-1")], &[recipe("dinner-1")]),
        grocery_json(&grocery_sections()),
    ])
    .shared();

    orchestrator(&stub)
        .generate_full_plan(Some("more seafood please"))
        .await
        .unwrap();

    let user = &stub.requests()[0].user;
    assert!(user.starts_with(DEFAULT_PLAN_REQUEST));
    assert!(user.contains("more seafood please"));
}

#[tokio::test]
async fn prose_response_is_a_parse_error_and_stops() {
    let stub = StubGateway::with_responses(["Sorry, I can't help with meal plans today."]).shared();

    let err = orchestrator(&stub).generate_full_plan(None).await.unwrap_err();

    assert!(matches!(err, OrchestratorError::Generation(StepError::Parse(_))));
    assert!(err.is_parse());
    assert_eq!(stub.call_count(), 1, "no grocery call after a parse failure");
}

#[tokio::test]
async fn grocery_failure_fails_the_whole_generation() {
    let stub = StubGateway::with_responses([recipe_set_json(
        &[recipe("lunch-1")],
        &[recipe("dinner-1")],
    )])
    .shared();
    stub.push_err(GatewayError::Status {
        status: 529,
        body: "overloaded".to_string(),
    });

    let err = orchestrator(&stub).generate_full_plan(None).await.unwrap_err();

    assert!(
        matches!(
            err,
            OrchestratorError::Generation(StepError::Gateway(GatewayError::Status {
                status: 529,
                ..
            }))
        ),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let stub = StubGateway::with_responses(["{}"])
        .with_delay(Duration::from_secs(5))
        .shared();
    let settings = OrchestratorSettings {
        call_timeout: Duration::from_millis(50),
        ..OrchestratorSettings::default()
    };
    let orchestrator = PlanOrchestrator::new(stub.clone(), settings);

    let err = orchestrator.generate_full_plan(None).await.unwrap_err();

    assert!(err.is_timeout(), "got: {err:?}");
}

// ---------------------------------------------------------------------------
// regenerate_recipe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regeneration_keeps_the_original_id() {
    let original = recipe("dinner-2");
    let replacement = renamed_recipe("dinner-2", "Spicy Braise");
    let stub = StubGateway::with_responses([recipe_json(&replacement)]).shared();

    let result = orchestrator(&stub)
        .regenerate_recipe(&original, "spicier", MealType::Dinner)
        .await
        .unwrap();

    assert_eq!(result, replacement);
    let request = &stub.requests()[0];
    assert_eq!(request.max_tokens, 2048);
    assert!(request.user.contains("Keep the same ID (dinner-2)"));
    assert!(request.user.contains("User feedback: \"spicier\""));
}

#[tokio::test]
async fn mismatched_id_is_overwritten() {
    let original = recipe("lunch-1");
    let stub = StubGateway::with_responses([recipe_json(&renamed_recipe("lunch-7", "Soba"))])
        .shared();

    let result = orchestrator(&stub)
        .regenerate_recipe(&original, "noodles", MealType::Lunch)
        .await
        .unwrap();

    assert_eq!(result.id, "lunch-1");
    assert_eq!(result.name, "Soba");
}

#[tokio::test]
async fn regeneration_errors_are_tagged() {
    let stub = StubGateway::with_responses(["{\"name\": \"incomplete\"}"]).shared();

    let err = orchestrator(&stub)
        .regenerate_recipe(&recipe("lunch-1"), "x", MealType::Lunch)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::Regeneration(StepError::Parse(_))));
}

// ---------------------------------------------------------------------------
// regenerate_and_merge
// ---------------------------------------------------------------------------

#[tokio::test]
async fn regenerate_and_merge_refreshes_grocery_from_updated_lists() {
    let lunches = vec![recipe("lunch-1"), recipe("lunch-2")];
    let dinners = vec![recipe("dinner-1")];
    let replacement = renamed_recipe("lunch-1", "Greek Salad");
    let stub = StubGateway::with_responses([
        recipe_json(&replacement),
        grocery_json(&grocery_sections()),
    ])
    .shared();

    let outcome = orchestrator(&stub)
        .regenerate_and_merge(&lunches, &dinners, &lunches[0], "lighter", MealType::Lunch)
        .await
        .unwrap();

    assert_eq!(outcome.recipe, replacement);
    let names: Vec<&str> = outcome.recipes.lunches.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Greek Salad", "Recipe lunch-2"]);
    assert_eq!(outcome.recipes.dinners, dinners);
    assert_eq!(outcome.grocery_list, grocery_sections());

    let grocery_prompt = &stub.requests()[1].user;
    assert!(grocery_prompt.contains("Greek Salad ingredient"));
    assert!(!grocery_prompt.contains("lunch-1 ingredient 1"));
}

#[tokio::test]
async fn regenerate_and_merge_with_unknown_id_leaves_lists_alone() {
    let lunches = vec![recipe("lunch-1")];
    let dinners = vec![recipe("dinner-1")];
    let stray: Recipe = recipe("dinner-9");
    let stub = StubGateway::with_responses([
        recipe_json(&renamed_recipe("dinner-9", "Stray")),
        grocery_json(&grocery_sections()),
    ])
    .shared();

    let outcome = orchestrator(&stub)
        .regenerate_and_merge(&lunches, &dinners, &stray, "x", MealType::Dinner)
        .await
        .unwrap();

    assert_eq!(outcome.recipes.lunches, lunches);
    assert_eq!(outcome.recipes.dinners, dinners);
    assert_eq!(outcome.recipe.name, "Stray");
}

#[tokio::test]
async fn grocery_failure_after_regeneration_is_a_grocery_error() {
    let lunches = vec![recipe("lunch-1")];
    let stub = StubGateway::with_responses([recipe_json(&renamed_recipe("lunch-1", "New"))])
        .shared();
    stub.push_err(GatewayError::EmptyContent);

    let err = orchestrator(&stub)
        .regenerate_and_merge(&lunches, &[], &lunches[0], "x", MealType::Lunch)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::Grocery(StepError::Gateway(_))));
}
