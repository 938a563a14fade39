// threadrunner CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Logs go to stderr so stdout stays clean for transcripts.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use threadrunner_core::AssistantsApi;
use threadrunner_openai::{
    config_provider, ClientConfig, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_MAX_RETRIES,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_PROMPT: &str = "Say this is a test";

#[derive(Parser)]
#[command(name = "threadrunner")]
#[command(about = "threadrunner - Stream chat completions and drive assistant runs")]
#[command(version)]
pub struct Cli {
    /// API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Retries for connection errors and retryable HTTP statuses
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stream a one-shot chat completion
    Chat {
        /// Prompt text
        #[arg(default_value = DEFAULT_PROMPT)]
        prompt: String,

        /// Model identifier
        #[arg(long, short, default_value = DEFAULT_CHAT_MODEL)]
        model: String,
    },

    /// Manage assistants
    Assistants {
        #[command(subcommand)]
        command: commands::assistants::AssistantsCommand,
    },

    /// Manage threads
    Threads {
        #[command(subcommand)]
        command: commands::threads::ThreadsCommand,
    },

    /// Post a message, run an assistant and print the transcript
    Run(commands::run::RunArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "threadrunner_cli=info,threadrunner_core=info,threadrunner_openai=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output_format = output::OutputFormat::from_str(&cli.output);

    let config = ClientConfig::new(cli.api_key.unwrap_or_default())
        .with_base_url(cli.base_url)
        .with_max_retries(cli.max_retries);
    let provider = config_provider(config);
    let client = provider
        .provide()
        .await
        .context("Failed to create API client; set OPENAI_API_KEY or pass --api-key")?;
    let api: &dyn AssistantsApi = client.as_ref();

    match cli.command {
        Commands::Chat { prompt, model } => {
            commands::chat::run(client.as_ref(), output_format, prompt, model).await
        }
        Commands::Assistants { command } => {
            commands::assistants::run(command, api, output_format, cli.quiet).await
        }
        Commands::Threads { command } => {
            commands::threads::run(command, api, output_format, cli.quiet).await
        }
        Commands::Run(args) => commands::run::run(args, api, output_format).await,
    }
}
