// Assistant management commands

use crate::output::{print_field, print_table_header, print_table_row, OutputFormat};
use anyhow::Result;
use clap::Subcommand;
use threadrunner_core::types::{Assistant, AssistantTool, CreateAssistantRequest};
use threadrunner_core::{ApiError, AssistantsApi, ToolRegistry, WriteFileTool, DEFAULT_MODEL};

#[derive(Subcommand)]
pub enum AssistantsCommand {
    /// Create a new assistant
    Create {
        /// Model identifier
        #[arg(long, default_value = DEFAULT_MODEL)]
        model: String,

        /// Assistant name
        #[arg(long)]
        name: Option<String>,

        /// System instructions
        #[arg(long)]
        instructions: Option<String>,

        /// Declare the local tools (writeFile) on the assistant
        #[arg(long)]
        with_tools: bool,
    },

    /// List assistants
    List {
        /// Maximum number of assistants to return
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Delete an assistant
    Delete {
        /// Assistant ID
        assistant_id: String,
    },
}

pub async fn run(
    command: AssistantsCommand,
    api: &dyn AssistantsApi,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        AssistantsCommand::Create {
            model,
            name,
            instructions,
            with_tools,
        } => create(api, output, quiet, model, name, instructions, with_tools).await,
        AssistantsCommand::List { limit } => list(api, output, limit).await,
        AssistantsCommand::Delete { assistant_id } => {
            delete(api, output, quiet, &assistant_id).await
        }
    }
}

async fn create(
    api: &dyn AssistantsApi,
    output: OutputFormat,
    quiet: bool,
    model: String,
    name: Option<String>,
    instructions: Option<String>,
    with_tools: bool,
) -> Result<()> {
    let mut request = CreateAssistantRequest::new(model);
    request.name = name;
    request.instructions = instructions;
    if with_tools {
        let registry = ToolRegistry::builder().tool(WriteFileTool::default()).build();
        request.tools = registry.assistant_tools();
    }

    let assistant = api.create_assistant(&request).await?;

    if output.is_text() {
        if quiet {
            println!("{}", assistant.id);
        } else {
            println!("Created assistant: {}", assistant.id);
            print_assistant_fields(&assistant);
        }
    } else {
        output.print_value(&assistant)?;
    }

    Ok(())
}

async fn list(api: &dyn AssistantsApi, output: OutputFormat, limit: u32) -> Result<()> {
    let assistants = api.list_assistants(limit).await?;

    if output.is_text() {
        if assistants.is_empty() {
            println!("No assistants found");
            return Ok(());
        }

        print_table_header(&[("ID", 32), ("NAME", 25), ("MODEL", 20), ("TOOLS", 20)]);

        for assistant in &assistants {
            let name = assistant.name.as_deref().unwrap_or("-");
            let tools = tool_names(&assistant.tools);
            print_table_row(&[
                (&assistant.id, 32),
                (name, 25),
                (&assistant.model, 20),
                (&tools, 20),
            ]);
        }
    } else {
        output.print_value(&assistants)?;
    }

    Ok(())
}

async fn delete(
    api: &dyn AssistantsApi,
    output: OutputFormat,
    quiet: bool,
    assistant_id: &str,
) -> Result<()> {
    api.delete_assistant(assistant_id)
        .await
        .map_err(|e| match e {
            ApiError::NotFound(_) => anyhow::anyhow!("Assistant not found: {}", assistant_id),
            e => e.into(),
        })?;

    if output.is_text() {
        if !quiet {
            println!("Deleted assistant: {}", assistant_id);
        }
    } else {
        output.print_value(&serde_json::json!({ "id": assistant_id, "deleted": true }))?;
    }

    Ok(())
}

fn print_assistant_fields(assistant: &Assistant) {
    print_field("Model", &assistant.model);
    if let Some(name) = &assistant.name {
        print_field("Name", name);
    }
    if let Some(instructions) = &assistant.instructions {
        print_field("Instructions", instructions);
    }
    if !assistant.tools.is_empty() {
        print_field("Tools", &tool_names(&assistant.tools));
    }
}

fn tool_names(tools: &[AssistantTool]) -> String {
    if tools.is_empty() {
        return "-".to_string();
    }
    tools
        .iter()
        .map(|tool| match tool {
            AssistantTool::Function { function } => function.name.clone(),
            AssistantTool::CodeInterpreter => "code_interpreter".to_string(),
            AssistantTool::FileSearch => "file_search".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadrunner_core::types::FunctionDefinition;

    #[test]
    fn test_tool_names() {
        assert_eq!(tool_names(&[]), "-");
        let tools = vec![
            AssistantTool::Function {
                function: FunctionDefinition {
                    name: "writeFile".to_string(),
                    description: None,
                    parameters: serde_json::json!({}),
                },
            },
            AssistantTool::CodeInterpreter,
        ];
        assert_eq!(tool_names(&tools), "writeFile, code_interpreter");
    }
}
