// Chat command - one-shot streaming completion

use crate::output::OutputFormat;
use anyhow::{Context, Result};
use futures::StreamExt;
use serde::Serialize;
use std::io::Write;
use threadrunner_openai::{ChatRequest, ChatStreamEvent, OpenAiClient};
use tracing::warn;

/// Collected result for json/yaml output
#[derive(Debug, Serialize)]
struct ChatCompletion {
    model: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    finish_reason: Option<String>,
}

pub async fn run(
    client: &OpenAiClient,
    output: OutputFormat,
    prompt: String,
    model: String,
) -> Result<()> {
    let request = ChatRequest::streaming(model.clone(), prompt);
    let mut stream = client
        .chat_completion_stream(&request)
        .await
        .context("Failed to start chat completion")?;

    let mut content = String::new();
    let mut finish_reason = None;
    let mut stdout = std::io::stdout();

    while let Some(event) = stream.next().await {
        match event? {
            ChatStreamEvent::TextDelta(delta) => {
                if output.is_text() {
                    write!(stdout, "{}", delta)?;
                    stdout.flush()?;
                }
                content.push_str(&delta);
            }
            ChatStreamEvent::Done {
                finish_reason: reason,
            } => {
                finish_reason = reason;
                break;
            }
            ChatStreamEvent::Error(err) => warn!(error = %err, "Skipping undecodable chunk"),
        }
    }

    if output.is_text() {
        writeln!(stdout)?;
    } else {
        output.print_value(&ChatCompletion {
            model,
            content,
            finish_reason,
        })?;
    }

    Ok(())
}
