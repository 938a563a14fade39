// Scripted in-memory AssistantsApi for monitor and driver tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use crate::error::{ApiError, Result};
use crate::traits::AssistantsApi;
use crate::types::{
    Assistant, CreateAssistantRequest, CreateMessageRequest, CreateRunRequest, ListOrder,
    MessageContent, MessageRole, RequiredAction, Run, RunStatus, RunToolCall, SubmitToolOutputs,
    TextContent, Thread, ThreadMessage, ToolOutput,
};

pub fn run_with_status(status: RunStatus) -> Run {
    Run {
        id: "run_1".to_string(),
        thread_id: "thread_1".to_string(),
        assistant_id: "asst_1".to_string(),
        status,
        required_action: None,
        last_error: None,
        created_at: 0,
    }
}

pub fn run_with_tool_calls(tool_calls: Vec<RunToolCall>) -> Run {
    Run {
        required_action: Some(RequiredAction::SubmitToolOutputs {
            submit_tool_outputs: SubmitToolOutputs { tool_calls },
        }),
        ..run_with_status(RunStatus::RequiresAction)
    }
}

fn text_message(id: &str, role: MessageRole, text: &str) -> ThreadMessage {
    ThreadMessage {
        id: id.to_string(),
        thread_id: "thread_1".to_string(),
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
            },
        }],
        run_id: None,
        created_at: 0,
    }
}

/// Replays a fixed sequence of run states; the last state repeats when
/// `repeat_last` is set.
pub struct ScriptedApi {
    runs: Mutex<VecDeque<Run>>,
    repeat_last: bool,
    retrieves: AtomicU32,
    submissions: Mutex<Vec<Vec<ToolOutput>>>,
    posted: Mutex<Vec<(String, CreateMessageRequest)>>,
    created_runs: Mutex<Vec<(String, String)>>,
    created_assistants: Mutex<Vec<CreateAssistantRequest>>,
    threads_created: AtomicU32,
}

impl ScriptedApi {
    pub fn new(runs: Vec<Run>) -> Self {
        Self {
            runs: Mutex::new(runs.into()),
            repeat_last: false,
            retrieves: AtomicU32::new(0),
            submissions: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            created_runs: Mutex::new(Vec::new()),
            created_assistants: Mutex::new(Vec::new()),
            threads_created: AtomicU32::new(0),
        }
    }

    pub fn repeating(run: Run) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![run])
        }
    }

    pub fn retrieve_count(&self) -> u32 {
        self.retrieves.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn posted_messages(&self) -> Vec<(String, String)> {
        self.posted
            .lock()
            .unwrap()
            .iter()
            .map(|(thread, req)| (thread.clone(), req.content.clone()))
            .collect()
    }

    pub fn created_runs(&self) -> Vec<(String, String)> {
        self.created_runs.lock().unwrap().clone()
    }

    pub fn created_assistants(&self) -> Vec<CreateAssistantRequest> {
        self.created_assistants.lock().unwrap().clone()
    }

    pub fn threads_created(&self) -> u32 {
        self.threads_created.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssistantsApi for ScriptedApi {
    async fn create_assistant(&self, request: &CreateAssistantRequest) -> Result<Assistant> {
        self.created_assistants.lock().unwrap().push(request.clone());
        Ok(Assistant {
            id: "asst_new".to_string(),
            model: request.model.clone(),
            name: request.name.clone(),
            instructions: request.instructions.clone(),
            tools: request.tools.clone(),
            created_at: 0,
        })
    }

    async fn list_assistants(&self, _limit: u32) -> Result<Vec<Assistant>> {
        Ok(Vec::new())
    }

    async fn delete_assistant(&self, _assistant_id: &str) -> Result<()> {
        Ok(())
    }

    async fn create_thread(&self) -> Result<Thread> {
        self.threads_created.fetch_add(1, Ordering::SeqCst);
        Ok(Thread {
            id: "thread_new".to_string(),
            created_at: 0,
        })
    }

    async fn retrieve_thread(&self, thread_id: &str) -> Result<Thread> {
        Ok(Thread {
            id: thread_id.to_string(),
            created_at: 0,
        })
    }

    async fn delete_thread(&self, _thread_id: &str) -> Result<()> {
        Ok(())
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: &CreateMessageRequest,
    ) -> Result<ThreadMessage> {
        self.posted
            .lock()
            .unwrap()
            .push((thread_id.to_string(), request.clone()));
        Ok(text_message("msg_user", request.role, &request.content))
    }

    async fn list_messages(
        &self,
        _thread_id: &str,
        order: ListOrder,
    ) -> Result<Vec<ThreadMessage>> {
        let mut messages = vec![
            text_message("msg_1", MessageRole::User, "Write a file"),
            text_message("msg_2", MessageRole::Assistant, "Done"),
        ];
        if order == ListOrder::Desc {
            messages.reverse();
        }
        Ok(messages)
    }

    async fn create_run(&self, thread_id: &str, request: &CreateRunRequest) -> Result<Run> {
        self.created_runs
            .lock()
            .unwrap()
            .push((thread_id.to_string(), request.assistant_id.clone()));
        Ok(Run {
            thread_id: thread_id.to_string(),
            assistant_id: request.assistant_id.clone(),
            ..run_with_status(RunStatus::Queued)
        })
    }

    async fn retrieve_run(&self, _thread_id: &str, run_id: &str) -> Result<Run> {
        self.retrieves.fetch_add(1, Ordering::SeqCst);
        let mut runs = self.runs.lock().unwrap();
        let run = if self.repeat_last && runs.len() == 1 {
            runs.front().cloned()
        } else {
            runs.pop_front()
        };
        run.ok_or_else(|| ApiError::NotFound(format!("no scripted state left for {}", run_id)))
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: Vec<ToolOutput>,
    ) -> Result<Run> {
        self.submissions.lock().unwrap().push(outputs);
        Ok(run_with_status(RunStatus::Queued))
    }
}
