pub mod access;
pub mod gateway;
pub mod orchestrator;
pub mod plan;
