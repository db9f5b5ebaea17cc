//! Shared test utilities for mealprep integration tests.
//!
//! Provides [`StubGateway`], a scripted [`ModelGateway`] that records every
//! request it receives, and fixture builders for recipes and the JSON
//! bodies a model would return.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use mealprep_core::gateway::{CompletionRequest, GatewayError, ModelGateway};
use mealprep_core::plan::{GrocerySection, Recipe, fence_json};

// ---------------------------------------------------------------------------
// StubGateway
// ---------------------------------------------------------------------------

/// A gateway that replays scripted responses in order.
///
/// Each call pops the next response. When the script runs out, calls fail
/// with [`GatewayError::Http`] so a test that makes an unexpected extra
/// call fails loudly.
#[derive(Default)]
pub struct StubGateway {
    script: Mutex<VecDeque<Result<String, GatewayError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A stub that answers each call with the given texts, in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let stub = Self::new();
        for text in responses {
            stub.push_ok(text);
        }
        stub
    }

    /// Delay every call by `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_ok(&self, text: impl Into<String>) {
        self.script.lock().unwrap().push_back(Ok(text.into()));
    }

    pub fn push_err(&self, err: GatewayError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Wrap in an `Arc` ready for `PlanOrchestrator::new`.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl ModelGateway for StubGateway {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Http("stub script exhausted".to_string())))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A recipe whose name and ingredients are derived from `id`.
///
/// Ingredients are `"{id} ingredient 1"` and `"{id} ingredient 2"`, which
/// makes ingredient ordering easy to assert on.
pub fn recipe(id: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: format!("Recipe {id}"),
        description: format!("Batch-friendly {id}."),
        cook_time: "30 minutes".to_string(),
        servings: "4 servings (2 days for 2 people)".to_string(),
        ingredients: vec![format!("{id} ingredient 1"), format!("{id} ingredient 2")],
        steps: vec!["Prep.".to_string(), "Cook.".to_string()],
    }
}

/// A recipe like [`recipe`] but with a different name, as a regeneration
/// would return.
pub fn renamed_recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        name: name.to_string(),
        ingredients: vec![format!("{name} ingredient")],
        ..recipe(id)
    }
}

/// Model output for a full-plan call.
pub fn recipe_set_json(lunches: &[Recipe], dinners: &[Recipe]) -> String {
    json!({ "lunches": lunches, "dinners": dinners }).to_string()
}

/// Model output for a single-recipe call.
pub fn recipe_json(recipe: &Recipe) -> String {
    serde_json::to_value(recipe)
        .unwrap_or(Value::Null)
        .to_string()
}

/// A two-section grocery list.
pub fn grocery_sections() -> Vec<GrocerySection> {
    vec![
        GrocerySection {
            category: "Produce".to_string(),
            items: vec!["3 carrots".to_string(), "1 bunch kale".to_string()],
        },
        GrocerySection {
            category: "Pantry".to_string(),
            items: vec!["2 cups farro".to_string()],
        },
    ]
}

/// Model output for a grocery consolidation call.
pub fn grocery_json(sections: &[GrocerySection]) -> String {
    json!({ "groceryList": sections }).to_string()
}

/// Wrap model output in a Markdown code fence, as models often do.
pub fn fenced(body: &str) -> String {
    fence_json(body, Some("json"))
}
