// Thread management commands

use crate::output::{format_transcript, print_field, OutputFormat};
use anyhow::Result;
use clap::Subcommand;
use threadrunner_core::{ApiError, AssistantsApi, ListOrder};

#[derive(Subcommand)]
pub enum ThreadsCommand {
    /// Create an empty thread
    Create,

    /// Get thread by ID
    Get {
        /// Thread ID
        thread_id: String,
    },

    /// Delete a thread
    Delete {
        /// Thread ID
        thread_id: String,
    },

    /// Print a thread's messages
    Messages {
        /// Thread ID
        thread_id: String,

        /// Sort order by creation time
        #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
        order: String,
    },
}

pub async fn run(
    command: ThreadsCommand,
    api: &dyn AssistantsApi,
    output: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        ThreadsCommand::Create => create(api, output, quiet).await,
        ThreadsCommand::Get { thread_id } => get(api, output, &thread_id).await,
        ThreadsCommand::Delete { thread_id } => delete(api, output, quiet, &thread_id).await,
        ThreadsCommand::Messages { thread_id, order } => {
            let order: ListOrder = order.parse().map_err(anyhow::Error::msg)?;
            messages(api, output, &thread_id, order).await
        }
    }
}

fn not_found(thread_id: &str) -> impl FnOnce(ApiError) -> anyhow::Error + '_ {
    move |e| match e {
        ApiError::NotFound(_) => anyhow::anyhow!("Thread not found: {}", thread_id),
        e => e.into(),
    }
}

async fn create(api: &dyn AssistantsApi, output: OutputFormat, quiet: bool) -> Result<()> {
    let thread = api.create_thread().await?;

    if output.is_text() {
        if quiet {
            println!("{}", thread.id);
        } else {
            println!("Created thread: {}", thread.id);
        }
    } else {
        output.print_value(&thread)?;
    }

    Ok(())
}

async fn get(api: &dyn AssistantsApi, output: OutputFormat, thread_id: &str) -> Result<()> {
    let thread = api
        .retrieve_thread(thread_id)
        .await
        .map_err(not_found(thread_id))?;

    if output.is_text() {
        print_field("ID", &thread.id);
        print_field("Created", &thread.created_at.to_string());
    } else {
        output.print_value(&thread)?;
    }

    Ok(())
}

async fn delete(
    api: &dyn AssistantsApi,
    output: OutputFormat,
    quiet: bool,
    thread_id: &str,
) -> Result<()> {
    api.delete_thread(thread_id)
        .await
        .map_err(not_found(thread_id))?;

    if output.is_text() {
        if !quiet {
            println!("Deleted thread: {}", thread_id);
        }
    } else {
        output.print_value(&serde_json::json!({ "id": thread_id, "deleted": true }))?;
    }

    Ok(())
}

async fn messages(
    api: &dyn AssistantsApi,
    output: OutputFormat,
    thread_id: &str,
    order: ListOrder,
) -> Result<()> {
    let messages = api
        .list_messages(thread_id, order)
        .await
        .map_err(not_found(thread_id))?;

    if output.is_text() {
        if messages.is_empty() {
            println!("No messages found");
        } else {
            println!("{}", format_transcript(&messages));
        }
    } else {
        output.print_value(&messages)?;
    }

    Ok(())
}
