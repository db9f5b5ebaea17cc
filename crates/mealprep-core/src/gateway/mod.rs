//! Model gateway: the single text-generation call every workflow goes
//! through.
//!
//! # Architecture
//!
//! ```text
//! PlanOrchestrator
//!     |
//!     v
//! Arc<dyn ModelGateway> --complete(request)--> String
//!     |
//!     +-- AnthropicGateway   (HTTPS, Messages API)
//!     +-- test stubs         (scripted responses)
//! ```
//!
//! The gateway is injected into the orchestrator rather than held in a
//! process-wide client, so tests can substitute a stub.

pub mod anthropic;
pub mod trait_def;
pub mod types;

pub use anthropic::{AnthropicConfig, AnthropicGateway};
pub use trait_def::ModelGateway;
pub use types::{CompletionRequest, GatewayError};
