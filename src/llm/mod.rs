pub mod anthropic;
pub mod assist;
pub mod client;

pub use anthropic::AnthropicClient;
pub use assist::{Assistant, Diagnosis};
pub use client::{LLMClient, LLMError};
