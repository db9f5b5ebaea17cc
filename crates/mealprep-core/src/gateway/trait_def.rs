//! The `ModelGateway` trait -- the adapter interface for hosted models.

use async_trait::async_trait;

use super::types::{CompletionRequest, GatewayError};

/// A hosted text-generation service.
///
/// Implementations send one request and return the model's text verbatim.
/// The text carries no schema guarantee; callers extract and validate it.
///
/// The trait is object-safe so it can be shared as `Arc<dyn ModelGateway>`.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Short name for logs (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Run one completion and return the text content.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}

// Compile-time assertion: ModelGateway must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn ModelGateway) {}
};
