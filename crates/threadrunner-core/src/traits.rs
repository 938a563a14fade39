// Remote service seam
//
// The run monitor and conversation driver only talk to the service through
// this trait, so the HTTP client can be swapped for a scripted fake in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, ListOrder, Run,
    Thread, ThreadMessage, ToolOutput,
};

/// Assistants API operations consumed by this crate
#[async_trait]
pub trait AssistantsApi: Send + Sync {
    /// Create an assistant
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant>;

    /// List assistants, newest first
    async fn list_assistants(&self, limit: u32) -> Result<Vec<Assistant>>;

    /// Delete an assistant
    async fn delete_assistant(&self, assistant_id: &str) -> Result<()>;

    /// Create an empty thread
    async fn create_thread(&self) -> Result<Thread>;

    /// Retrieve a thread
    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread>;

    /// Delete a thread
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Append a message to a thread
    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage>;

    /// List a thread's messages in the given order
    async fn list_messages(&self, thread_id: &str, order: ListOrder)
        -> Result<Vec<ThreadMessage>>;

    /// Start a run of an assistant against a thread
    async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run>;

    /// Fetch the current state of a run
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    /// Submit a batch of tool outputs for a run waiting on them
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run>;
}
