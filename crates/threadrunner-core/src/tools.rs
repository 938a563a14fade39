// Local tool execution
//
// Tools are the local functions a run may ask the caller to execute. Each
// tool is registered by name in a `ToolRegistry`; the run monitor dispatches
// the model's tool calls through it.
//
// Design decisions:
// - Tools are defined via a trait so new functions need no monitor changes
// - Tool outputs are plain strings, as the assistants protocol expects
// - Tool errors are shown to the model; internal errors are logged and replaced
//   with a generic message

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

use crate::types::{AssistantTool, FunctionDefinition, RunToolCall, ToolOutput};

const INTERNAL_ERROR_OUTPUT: &str = "An internal error occurred while executing the tool";

// ============================================================================
// Tool Execution Result
// ============================================================================

/// Result of a tool execution.
///
/// - `Success`: the output string is submitted as-is
/// - `ToolError`: expected failure the model should know about (bad arguments,
///   rejected file name, failed write)
/// - `InternalError`: unexpected failure; details are logged, not submitted
#[derive(Debug)]
pub enum ToolExecutionResult {
    Success(String),
    ToolError(String),
    InternalError(String),
}

impl ToolExecutionResult {
    pub fn success(output: impl Into<String>) -> Self {
        ToolExecutionResult::Success(output.into())
    }

    pub fn tool_error(message: impl Into<String>) -> Self {
        ToolExecutionResult::ToolError(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ToolExecutionResult::InternalError(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ToolExecutionResult::Success(_))
    }

    /// Convert to the output submitted back to the run
    pub fn into_tool_output(self, tool_call_id: &str, tool_name: &str) -> ToolOutput {
        let output = match self {
            ToolExecutionResult::Success(output) => output,
            ToolExecutionResult::ToolError(message) => format!("error: {}", message),
            ToolExecutionResult::InternalError(message) => {
                error!(
                    tool_name = %tool_name,
                    tool_call_id = %tool_call_id,
                    error = %message,
                    "Tool internal error (details hidden from model)"
                );
                format!("error: {}", INTERNAL_ERROR_OUTPUT)
            }
        };

        ToolOutput {
            tool_call_id: tool_call_id.to_string(),
            output,
        }
    }
}

// ============================================================================
// Tool Trait
// ============================================================================

/// A local function the model can call during a run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name the model uses; unique within a registry
    fn name(&self) -> &str;

    /// Description shown to the model
    fn description(&self) -> &str;

    /// JSON schema of the arguments object
    fn parameters_schema(&self) -> Value;

    /// Execute with already-parsed arguments
    async fn execute(&self, arguments: Value) -> ToolExecutionResult;

    /// Declaration to attach to an assistant
    fn to_definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            name: self.name().to_string(),
            description: Some(self.description().to_string()),
            parameters: self.parameters_schema(),
        }
    }
}

// ============================================================================
// ToolRegistry
// ============================================================================

/// Name-keyed collection of tools.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Registered tool names, sorted
    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Function declarations for every registered tool, sorted by name
    pub fn assistant_tools(&self) -> Vec<AssistantTool> {
        self.tool_names()
            .into_iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| AssistantTool::Function {
                function: tool.to_definition(),
            })
            .collect()
    }

    /// Execute a tool call requested by a run.
    ///
    /// Returns `None` when no tool with the requested name is registered; the
    /// caller decides what (if anything) to submit for it. Arguments that are
    /// not valid JSON produce a tool error output.
    pub async fn execute_call(&self, call: &RunToolCall) -> Option<ToolOutput> {
        let name = call.function.name.as_str();
        let tool = self.tools.get(name)?;

        let result = match parse_arguments(&call.function.arguments) {
            Ok(arguments) => {
                debug!(tool_name = %name, tool_call_id = %call.id, "Executing tool");
                tool.execute(arguments).await
            }
            Err(e) => ToolExecutionResult::tool_error(format!("invalid arguments: {}", e)),
        };

        Some(result.into_tool_output(&call.id, name))
    }

    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::new()
    }
}

/// Empty argument strings are treated as an empty object
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}

/// Builder for creating a ToolRegistry with a fluent API.
///
/// ```ignore
/// let registry = ToolRegistry::builder()
///     .tool(WriteFileTool::new("output"))
///     .build();
/// ```
pub struct ToolRegistryBuilder {
    registry: ToolRegistry,
}

impl ToolRegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: ToolRegistry::new(),
        }
    }

    pub fn tool(mut self, tool: impl Tool + 'static) -> Self {
        self.registry.register(tool);
        self
    }

    pub fn build(self) -> ToolRegistry {
        self.registry
    }
}

impl Default for ToolRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
