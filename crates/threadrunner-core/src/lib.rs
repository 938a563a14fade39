// Assistant run orchestration
//
// This crate drives a hosted assistant through one conversation turn:
// post a message, start a run, poll it, execute requested local tools and
// return the final transcript.
//
// Key design decisions:
// - The remote service is reached only through the AssistantsApi trait
// - Tools are defined via a Tool trait and looked up by name in a ToolRegistry
// - Run status dispatch is exhaustive; terminal failures and timeouts are errors
// - The client handle is provided lazily by an explicitly owned ClientProvider

pub mod driver;
pub mod error;
pub mod file_tools;
pub mod monitor;
pub mod provider;
pub mod tools;
pub mod traits;
pub mod types;

#[cfg(test)]
mod testing;

pub use driver::{AssistantSelection, ConversationConfig, ConversationDriver, DEFAULT_MODEL};
pub use error::{ApiError, MonitorError, Result};
pub use file_tools::{WriteFileTool, DEFAULT_OUTPUT_DIR};
pub use monitor::{MonitorConfig, RunMonitor, RunOutcome, UnknownToolPolicy};
pub use provider::ClientProvider;
pub use tools::{Tool, ToolExecutionResult, ToolRegistry};
pub use traits::AssistantsApi;
pub use types::{ListOrder, MessageRole, Run, RunStatus, ThreadMessage, ToolOutput};
