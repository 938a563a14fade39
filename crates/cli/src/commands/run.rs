// Run command - post a message, run an assistant and wait for it to finish

use crate::output::{format_transcript, OutputFormat};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use threadrunner_core::{
    AssistantSelection, AssistantsApi, ConversationConfig, ConversationDriver, ListOrder,
    MonitorConfig, ToolRegistry, UnknownToolPolicy, WriteFileTool, DEFAULT_MODEL,
    DEFAULT_OUTPUT_DIR,
};
use tracing::info;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Message to post before starting the run
    pub message: Option<String>,

    /// Existing assistant ID (a new assistant is created if omitted)
    #[arg(short, long)]
    pub assistant: Option<String>,

    /// Existing thread ID (a new thread is created if omitted)
    #[arg(short, long)]
    pub thread: Option<String>,

    /// Model for a newly created assistant
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Name for a newly created assistant
    #[arg(long)]
    pub name: Option<String>,

    /// Instructions for a newly created assistant
    #[arg(long)]
    pub instructions: Option<String>,

    /// Delay between run status checks in milliseconds
    #[arg(long, default_value = "5000")]
    pub poll_interval_ms: u64,

    /// Give up after this many seconds (0 waits indefinitely)
    #[arg(long, default_value = "600")]
    pub max_wait_secs: u64,

    /// Give up after this many status checks
    #[arg(long)]
    pub max_polls: Option<u32>,

    /// Directory the writeFile tool writes into
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// What to submit for calls to unregistered tools
    #[arg(long, default_value = "placeholder", value_parser = ["placeholder", "skip"])]
    pub unknown_tools: String,

    /// Transcript order by creation time
    #[arg(long, default_value = "desc", value_parser = ["asc", "desc"])]
    pub order: String,
}

impl RunArgs {
    fn conversation_config(&self) -> Result<ConversationConfig> {
        let unknown_tools: UnknownToolPolicy =
            self.unknown_tools.parse().map_err(anyhow::Error::msg)?;
        let order: ListOrder = self.order.parse().map_err(anyhow::Error::msg)?;
        let max_wait = match self.max_wait_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        let monitor = MonitorConfig::default()
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_wait(max_wait)
            .with_max_polls(self.max_polls)
            .with_message_order(order)
            .with_unknown_tools(unknown_tools);

        let assistant = match &self.assistant {
            Some(id) => AssistantSelection::Existing(id.clone()),
            None => AssistantSelection::Create {
                model: self.model.clone(),
                name: self.name.clone(),
                instructions: self.instructions.clone(),
            },
        };

        let mut config = ConversationConfig::new(assistant).with_monitor(monitor);
        if let Some(thread) = &self.thread {
            config = config.with_thread(thread.clone());
        }
        if let Some(message) = &self.message {
            config = config.with_message(message.clone());
        }
        Ok(config)
    }
}

pub async fn run(args: RunArgs, api: &dyn AssistantsApi, output: OutputFormat) -> Result<()> {
    let config = args.conversation_config()?;
    let tools = ToolRegistry::builder()
        .tool(WriteFileTool::new(&args.output_dir))
        .build();

    let outcome = ConversationDriver::new(api, &tools).run(&config).await?;
    info!(
        run_id = %outcome.run.id,
        polls = outcome.polls,
        submissions = outcome.submissions,
        "Run completed"
    );

    if output.is_text() {
        println!("{}", format_transcript(&outcome.messages));
    } else {
        output.print_value(&outcome.messages)?;
    }

    Ok(())
}
