// Run Monitor
//
// Polls a remote run at a fixed interval until it reaches a terminal status,
// executing requested tool calls along the way.
//
// Design decisions:
// - One sleep precedes every retrieval, including the first
// - Dispatch is an exhaustive match on RunStatus; unknown statuses are logged
//   and polled again, never silently ignored
// - Failed/cancelled/expired/incomplete runs stop the loop with an error
// - Polling is bounded by a wait budget (and optionally a poll count)

use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::MonitorError;
use crate::tools::ToolRegistry;
use crate::traits::AssistantsApi;
use crate::types::{ListOrder, Run, RunStatus, ThreadMessage, ToolOutput};

/// Default delay between run status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Default total time to wait for a run before giving up
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);

/// What to submit for a tool call whose function is not registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownToolPolicy {
    /// Submit an explicit error output so the run is not left waiting
    #[default]
    Placeholder,
    /// Omit the call from the batch
    Skip,
}

impl std::str::FromStr for UnknownToolPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "placeholder" => Ok(UnknownToolPolicy::Placeholder),
            "skip" => Ok(UnknownToolPolicy::Skip),
            _ => Err(format!(
                "Unknown tool policy: {}. Use 'placeholder' or 'skip'",
                s
            )),
        }
    }
}

/// Configuration for the run monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Delay before each status check
    pub poll_interval: Duration,
    /// Give up once this much time has passed without a terminal status
    pub max_wait: Option<Duration>,
    /// Give up after this many status checks
    pub max_polls: Option<u32>,
    /// Order of the returned transcript
    pub message_order: ListOrder,
    pub unknown_tools: UnknownToolPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: Some(DEFAULT_MAX_WAIT),
            max_polls: None,
            message_order: ListOrder::default(),
            unknown_tools: UnknownToolPolicy::default(),
        }
    }
}

impl MonitorConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Option<Duration>) -> Self {
        self.max_wait = max_wait;
        self
    }

    pub fn with_max_polls(mut self, max_polls: Option<u32>) -> Self {
        self.max_polls = max_polls;
        self
    }

    pub fn with_message_order(mut self, order: ListOrder) -> Self {
        self.message_order = order;
        self
    }

    pub fn with_unknown_tools(mut self, policy: UnknownToolPolicy) -> Self {
        self.unknown_tools = policy;
        self
    }
}

/// Successful end of a monitored run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Final state of the run
    pub run: Run,
    /// Thread transcript fetched after completion
    pub messages: Vec<ThreadMessage>,
    /// Number of status checks performed
    pub polls: u32,
    /// Number of tool-output batches submitted
    pub submissions: u32,
}

/// Watches a single run until it finishes.
pub struct RunMonitor<'a> {
    api: &'a dyn AssistantsApi,
    tools: &'a ToolRegistry,
    config: MonitorConfig,
}

impl<'a> RunMonitor<'a> {
    pub fn new(api: &'a dyn AssistantsApi, tools: &'a ToolRegistry, config: MonitorConfig) -> Self {
        Self { api, tools, config }
    }

    /// Poll the run until it completes, fails, or the wait budget runs out
    pub async fn wait(&self, thread_id: &str, run_id: &str) -> Result<RunOutcome, MonitorError> {
        let started = Instant::now();
        let mut polls: u32 = 0;
        let mut submissions: u32 = 0;

        loop {
            tokio::time::sleep(self.config.poll_interval).await;

            let run = self.api.retrieve_run(thread_id, run_id).await?;
            polls += 1;

            match run.status.clone() {
                RunStatus::Completed => {
                    info!(run_id = %run.id, polls, "Run completed");
                    let messages = self
                        .api
                        .list_messages(thread_id, self.config.message_order)
                        .await?;
                    return Ok(RunOutcome {
                        run,
                        messages,
                        polls,
                        submissions,
                    });
                }
                RunStatus::RequiresAction => {
                    let outputs = self.collect_tool_outputs(&run).await;
                    if outputs.is_empty() {
                        warn!(run_id = %run.id, "Run requires action but no tool outputs were produced");
                    } else {
                        info!(run_id = %run.id, count = outputs.len(), "Submitting tool outputs");
                        self.api
                            .submit_tool_outputs(thread_id, &run.id, outputs)
                            .await?;
                        submissions += 1;
                    }
                }
                RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling => {
                    debug!(run_id = %run.id, status = %run.status, "Run pending");
                }
                RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Expired
                | RunStatus::Incomplete => {
                    error!(run_id = %run.id, status = %run.status, "Run ended without completing");
                    return Err(MonitorError::RunFailed {
                        run_id: run.id,
                        status: run.status,
                        last_error: run.last_error,
                    });
                }
                RunStatus::Unknown(status) => {
                    warn!(run_id = %run.id, status = %status, "Unrecognised run status, continuing to poll");
                }
            }

            let waited = started.elapsed();
            let out_of_time = self.config.max_wait.is_some_and(|max| waited >= max);
            let out_of_polls = self.config.max_polls.is_some_and(|max| polls >= max);
            if out_of_time || out_of_polls {
                return Err(MonitorError::Timeout {
                    run_id: run.id,
                    last_status: run.status,
                    waited,
                });
            }
        }
    }

    /// One output per distinct tool call id, in request order
    async fn collect_tool_outputs(&self, run: &Run) -> Vec<ToolOutput> {
        let mut seen = HashSet::new();
        let mut outputs = Vec::new();

        for call in run.pending_tool_calls() {
            if !seen.insert(call.id.as_str()) {
                warn!(run_id = %run.id, tool_call_id = %call.id, "Duplicate tool call id, ignoring");
                continue;
            }

            match self.tools.execute_call(call).await {
                Some(output) => outputs.push(output),
                None => {
                    error!(
                        run_id = %run.id,
                        tool_call_id = %call.id,
                        tool_name = %call.function.name,
                        "Unknown function requested"
                    );
                    if self.config.unknown_tools == UnknownToolPolicy::Placeholder {
                        outputs.push(ToolOutput {
                            tool_call_id: call.id.clone(),
                            output: format!("error: unknown function '{}'", call.function.name),
                        });
                    }
                }
            }
        }

        outputs
    }
}
