// File artifact tools
//
// `writeFile` writes a named text artifact into a fixed output directory.
// File names arrive from remote-controlled tool arguments, so they are
// validated as bare names before anything touches the file system.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

use crate::tools::{Tool, ToolExecutionResult};

/// Default directory for written artifacts, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Output returned after a successful write
pub const WRITE_SUCCESS: &str = "success";

#[derive(Debug, Deserialize)]
struct WriteFileArgs {
    name: String,
    content: String,
}

/// Creates or overwrites `<output_dir>/<name>` with the given content
#[derive(Debug, Clone)]
pub struct WriteFileTool {
    output_dir: PathBuf,
}

impl WriteFileTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Default for WriteFileTool {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

/// Accept only a single, non-special path component
pub fn validate_file_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("file name must not be empty".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err(format!("file name '{}' must not contain path separators", name));
    }
    if name.contains("..") || name == "." {
        return Err(format!("file name '{}' must not reference parent or current directory", name));
    }
    if name.contains('\0') {
        return Err(format!("file name '{}' must not contain NUL bytes", name.escape_default()));
    }
    Ok(())
}

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "writeFile"
    }

    fn description(&self) -> &str {
        "Write text content to a named file in the output directory, replacing any existing file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "File name without directories, e.g. 'notes.txt'"
                },
                "content": {
                    "type": "string",
                    "description": "Exact text to write"
                }
            },
            "required": ["name", "content"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, arguments: Value) -> ToolExecutionResult {
        let args: WriteFileArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return ToolExecutionResult::tool_error(format!("invalid arguments: {}", e)),
        };

        if let Err(reason) = validate_file_name(&args.name) {
            return ToolExecutionResult::tool_error(reason);
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            return ToolExecutionResult::tool_error(format!(
                "failed to write '{}': {}",
                args.name, e
            ));
        }

        let path = self.output_dir.join(&args.name);
        match tokio::fs::write(&path, args.content.as_bytes()).await {
            Ok(()) => {
                info!(path = %path.display(), bytes = args.content.len(), "Wrote file");
                ToolExecutionResult::success(WRITE_SUCCESS)
            }
            Err(e) => ToolExecutionResult::tool_error(format!(
                "failed to write '{}': {}",
                args.name, e
            )),
        }
    }
}
