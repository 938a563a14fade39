// Conversation Driver
//
// The entry sequence of the assistant flow: resolve assistant and thread,
// post the user's message, start a run and block on the run monitor.

use tracing::info;

use crate::error::MonitorError;
use crate::monitor::{MonitorConfig, RunMonitor, RunOutcome};
use crate::tools::ToolRegistry;
use crate::traits::AssistantsApi;
use crate::types::{CreateAssistantRequest, CreateMessageRequest, CreateRunRequest};

/// Default model for newly created assistants
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Which assistant to run
#[derive(Debug, Clone)]
pub enum AssistantSelection {
    /// Reuse an existing assistant by id
    Existing(String),
    /// Create a new assistant declaring every registered tool
    Create {
        model: String,
        name: Option<String>,
        instructions: Option<String>,
    },
}

impl Default for AssistantSelection {
    fn default() -> Self {
        AssistantSelection::Create {
            model: DEFAULT_MODEL.to_string(),
            name: None,
            instructions: None,
        }
    }
}

/// Inputs for one conversation turn
#[derive(Debug, Clone, Default)]
pub struct ConversationConfig {
    pub assistant: AssistantSelection,
    /// Existing thread; a new one is created when absent
    pub thread_id: Option<String>,
    /// User message to post; the thread's existing contents are reused when absent
    pub message: Option<String>,
    pub monitor: MonitorConfig,
}

impl ConversationConfig {
    pub fn new(assistant: AssistantSelection) -> Self {
        Self {
            assistant,
            ..Default::default()
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_monitor(mut self, monitor: MonitorConfig) -> Self {
        self.monitor = monitor;
        self
    }
}

/// Runs the post-message → create-run → monitor sequence
pub struct ConversationDriver<'a> {
    api: &'a dyn AssistantsApi,
    tools: &'a ToolRegistry,
}

impl<'a> ConversationDriver<'a> {
    pub fn new(api: &'a dyn AssistantsApi, tools: &'a ToolRegistry) -> Self {
        Self { api, tools }
    }

    pub async fn run(&self, config: &ConversationConfig) -> Result<RunOutcome, MonitorError> {
        let assistant_id = match &config.assistant {
            AssistantSelection::Existing(id) => id.clone(),
            AssistantSelection::Create {
                model,
                name,
                instructions,
            } => {
                let mut request = CreateAssistantRequest::new(model.clone())
                    .with_tools(self.tools.assistant_tools());
                request.name = name.clone();
                request.instructions = instructions.clone();
                let assistant = self.api.create_assistant(&request).await?;
                info!(assistant_id = %assistant.id, model = %assistant.model, "Created assistant");
                assistant.id
            }
        };

        let thread_id = match &config.thread_id {
            Some(id) => id.clone(),
            None => {
                let thread = self.api.create_thread().await?;
                info!(thread_id = %thread.id, "Created thread");
                thread.id
            }
        };

        if let Some(message) = &config.message {
            let posted = self
                .api
                .create_message(&thread_id, &CreateMessageRequest::user(message.clone()))
                .await?;
            info!(thread_id = %thread_id, message_id = %posted.id, "Posted message");
        }

        let run = self
            .api
            .create_run(&thread_id, &CreateRunRequest::new(assistant_id))
            .await?;
        info!(run_id = %run.id, thread_id = %thread_id, status = %run.status, "Started run");

        RunMonitor::new(self.api, self.tools, config.monitor.clone())
            .wait(&thread_id, &run.id)
            .await
    }
}
