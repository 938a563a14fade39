// OpenAI Client Implementation
//
// This crate provides the HTTP client for OpenAI's API. It implements the
// AssistantsApi trait from threadrunner-core, enabling the run monitor and
// conversation driver to talk to the hosted assistants service, and exposes
// streaming chat completions.

mod client;
mod types;


pub use client::{
    parse_stream_data, ChatStream, ClientConfig, OpenAiClient, DEFAULT_BASE_URL,
    DEFAULT_MAX_RETRIES,
};
pub use types::{ChatMessage, ChatRequest, ChatRole, ChatStreamEvent, DEFAULT_CHAT_MODEL};

// Re-export core types for convenience
pub use threadrunner_core::{AssistantsApi, ClientProvider};

/// Provider that builds an `OpenAiClient` from the environment on first use
pub fn env_provider() -> ClientProvider<OpenAiClient> {
    ClientProvider::new(OpenAiClient::from_env)
}

/// Provider for an explicit configuration
pub fn config_provider(config: ClientConfig) -> ClientProvider<OpenAiClient> {
    ClientProvider::new(move || OpenAiClient::new(config.clone()))
}
