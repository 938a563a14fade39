// OpenAI HTTP client
//
// Implements the AssistantsApi trait (assistants, threads, messages, runs)
// and streaming chat completions over reqwest.
//
// Design Decision: Transient failures (connection errors, 408/409/429/5xx) are
// retried up to `max_retries` times with doubling backoff; everything else
// is returned to the caller immediately.

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, warn};

use threadrunner_core::error::{ApiError, Result};
use threadrunner_core::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, DeletionStatus,
    ListOrder, ListResponse, Run, Thread, ThreadMessage, ToolOutput,
};
use threadrunner_core::AssistantsApi;

use crate::types::{ChatRequest, ChatStreamEvent, StreamChunk};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MAX_RETRIES: u32 = 2;

const ASSISTANTS_BETA: (&str, &str) = ("OpenAI-Beta", "assistants=v2");
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);
const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(8);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);
const MESSAGE_PAGE_LIMIT: &str = "100";

/// Stream of chat completion events
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatStreamEvent>> + Send>>;

/// Connection settings for the OpenAI client
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    /// Extra attempts after the first one for transient failures
    pub max_retries: u32,
    /// Delay before the first retry; doubles per attempt
    pub retry_backoff: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Read OPENAI_API_KEY and (optionally) OPENAI_BASE_URL
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ApiError::config("OPENAI_API_KEY environment variable not set"))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Delay before retry number `attempt` (0-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.retry_backoff
            .saturating_mul(factor)
            .min(MAX_RETRY_BACKOFF.max(self.retry_backoff))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

/// OpenAI API client
#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    config: ClientConfig,
}

impl OpenAiClient {
    /// Build a client; fails when the API key is empty
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ApiError::config("API key must not be empty"));
        }
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            config: ClientConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    /// Build a client from OPENAI_API_KEY / OPENAI_BASE_URL
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.config.max_retries
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        self.http.request(method, url).bearer_auth(&self.config.api_key)
    }

    fn assistants_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send_with_retry(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::decode(e.to_string()))
    }

    async fn send_with_retry(&self, request: RequestBuilder) -> Result<Response> {
        let mut attempt = 0;
        loop {
            let request = request
                .try_clone()
                .ok_or_else(|| ApiError::transport("Request body cannot be retried"))?;

            let result = match request.send().await {
                Ok(response) => Self::check_status(response).await,
                Err(e) => Err(ApiError::transport(e.to_string())),
            };

            match result {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying OpenAI request"
                    );
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(message));
        }
        Err(ApiError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // ========================================================================
    // Chat completions
    // ========================================================================

    /// Streaming chat completion; yields content deltas as they arrive
    pub async fn chat_completion_stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let request = ChatRequest {
            stream: true,
            ..request.clone()
        };
        let builder = self
            .request(Method::POST, "/chat/completions")
            .json(&request);
        let response = self.send_with_retry(builder).await?;
        debug!(model = %request.model, "Chat completion stream opened");

        let stream = response
            .bytes_stream()
            .eventsource()
            .flat_map(|result| {
                let events: Vec<Result<ChatStreamEvent>> = match result {
                    Ok(event) => parse_stream_data(&event.data)
                        .into_iter()
                        .map(Ok)
                        .collect(),
                    Err(e) => vec![Err(ApiError::transport(format!("Stream error: {}", e)))],
                };
                futures::stream::iter(events)
            });

        Ok(Box::pin(stream))
    }
}

/// Decode one server-sent event payload.
///
/// A chunk may carry both a content delta and a finish reason, in which case
/// the delta comes first. Chunks with nothing to report yield no events.
pub fn parse_stream_data(data: &str) -> Vec<ChatStreamEvent> {
    if data.trim() == "[DONE]" {
        return vec![ChatStreamEvent::Done {
            finish_reason: None,
        }];
    }

    let chunk: StreamChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            return vec![ChatStreamEvent::Error(format!(
                "Failed to parse OpenAI chunk: {}",
                e
            ))]
        }
    };

    let mut events = Vec::new();
    if let Some(choice) = chunk.choices.into_iter().next() {
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            events.push(ChatStreamEvent::TextDelta(content));
        }
        if let Some(reason) = choice.finish_reason {
            events.push(ChatStreamEvent::Done {
                finish_reason: Some(reason),
            });
        }
    }
    events
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// AssistantsApi Implementation
// ============================================================================

#[async_trait]
impl AssistantsApi for OpenAiClient {
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.execute(
            self.assistants_request(Method::POST, "/assistants")
                .json(request),
        )
        .await
    }

    async fn list_assistants(&self, limit: u32) -> Result<Vec<Assistant>> {
        let page: ListResponse<Assistant> = self
            .execute(
                self.assistants_request(Method::GET, "/assistants")
                    .query(&[("limit", limit.to_string())]),
            )
            .await?;
        Ok(page.data)
    }

    async fn delete_assistant(&self, assistant_id: &str) -> Result<()> {
        let _: DeletionStatus = self
            .execute(
                self.assistants_request(Method::DELETE, &format!("/assistants/{}", assistant_id)),
            )
            .await?;
        Ok(())
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.execute(
            self.assistants_request(Method::POST, "/threads")
                .json(&json!({})),
        )
        .await
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread> {
        self.execute(self.assistants_request(Method::GET, &format!("/threads/{}", thread_id)))
            .await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let _: DeletionStatus = self
            .execute(self.assistants_request(Method::DELETE, &format!("/threads/{}", thread_id)))
            .await?;
        Ok(())
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage> {
        self.execute(
            self.assistants_request(Method::POST, &format!("/threads/{}/messages", thread_id))
                .json(request),
        )
        .await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>> {
        let path = format!("/threads/{}/messages", thread_id);
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut request = self
                .assistants_request(Method::GET, &path)
                .query(&[("order", order.as_str()), ("limit", MESSAGE_PAGE_LIMIT)]);
            if let Some(cursor) = &after {
                request = request.query(&[("after", cursor.as_str())]);
            }

            let page: ListResponse<ThreadMessage> = self.execute(request).await?;
            messages.extend(page.data);

            match page.last_id {
                Some(last_id) if page.has_more => {
                    debug!(thread_id = %thread_id, after = %last_id, "Fetching next message page");
                    after = Some(last_id);
                }
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run> {
        self.execute(
            self.assistants_request(Method::POST, &format!("/threads/{}/runs", thread_id))
                .json(request),
        )
        .await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        self.execute(self.assistants_request(
            Method::GET,
            &format!("/threads/{}/runs/{}", thread_id, run_id),
        ))
        .await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run> {
        self.execute(
            self.assistants_request(
                Method::POST,
                &format!("/threads/{}/runs/{}/submit_tool_outputs", thread_id, run_id),
            )
            .json(&json!({ "tool_outputs": outputs })),
        )
        .await
    }
}
